//! Checks a seeded environment and prints one line per check.
//!
//! Run with: cargo run --bin verify

use anyhow::{bail, Context, Result};
use inventory_seed::config::database;
use inventory_seed::modules::{
    customer::crud::CustomerCrud, customer::fixtures::sample_customer_ids, order::crud::OrderCrud,
};
use inventory_seed::services::verify;
use inventory_seed::SeedConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SeedConfig::from_env().context("Failed to load seed configuration")?;

    println!("Verifying {} on {}...\n", config.database, config.mongodb_uri);
    let report = verify::verify(&config).await.context("Verification aborted")?;

    for check in &report.checks {
        let mark = if check.passed { "✓" } else { "✗" };
        println!("{} {:<14} {}", mark, check.name, check.detail);
    }

    if !report.passed() {
        bail!("{} check(s) failed", report.failures().count());
    }

    println!("\nOrders per customer:");
    let client = database::connect_as_admin(&config).await?;
    let db = client.database(&config.database);
    let customers = CustomerCrud::new(&db);
    let orders = OrderCrud::new(&db);
    for id in sample_customer_ids() {
        let name = customers
            .find_by_id(id)
            .await?
            .map(|c| c.full_name())
            .unwrap_or_default();
        let placed = orders.find_by_customer(id).await?;
        let total: f64 = placed.iter().map(|o| o.total).sum();
        println!("  {} {:<16} {} order(s), {:.2}", id, name, placed.len(), total);
    }

    println!("\n✓ Environment verified");
    Ok(())
}
