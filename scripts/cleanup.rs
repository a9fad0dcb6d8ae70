//! Drops the seeded collections and the admin user.
//!
//! The replica set stays initiated, so a following seed needs
//! SEED_MODE=idempotent.
//!
//! Run with: cargo run --bin cleanup

use anyhow::{Context, Result};
use inventory_seed::config::database;
use inventory_seed::modules::{customer::crud::CustomerCrud, order::crud::OrderCrud};
use inventory_seed::services::admin_user;
use inventory_seed::SeedConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SeedConfig::from_env().context("Failed to load seed configuration")?;

    println!("Connecting to MongoDB as '{}'...", config.admin_username);
    let client = database::connect_as_admin(&config).await?;
    let db = client.database(&config.database);

    println!("Dropping customers collection...");
    CustomerCrud::new(&db).drop().await?;
    println!("✓ customers dropped");

    println!("Dropping orders collection...");
    OrderCrud::new(&db).drop().await?;
    println!("✓ orders dropped");

    println!("\nCollections remaining in {}:", config.database);
    let collections = db.list_collection_names().await?;
    for name in collections {
        println!("  - {}", name);
    }

    // Last, since it invalidates the credential this client is using.
    println!("\nDropping admin user '{}'...", config.admin_username);
    admin_user::drop_user(&client, &config.admin_username)
        .await
        .context("Failed to drop admin user")?;
    println!("✓ admin user dropped");

    println!("\n✓ Cleanup complete!");
    Ok(())
}
