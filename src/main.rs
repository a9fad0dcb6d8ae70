//! Bootstraps the inventory CDC demo environment.
//!
//! Run with: cargo run --bin seed

use anyhow::{Context, Result};
use inventory_seed::{SeedConfig, Seeder};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_seed=info,seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SeedConfig::from_env().context("Failed to load seed configuration")?;
    info!("Loaded configuration: {:?}", config);

    let report = match Seeder::new(config).run().await {
        Ok(report) => report,
        Err(e) => {
            error!(
                step = ?e.failed_step(),
                stage = ?e.reached_stage(),
                kind = %e.kind(),
                "Seeding aborted: {}",
                e
            );
            return Err(e).context("Seeding failed");
        }
    };

    info!(
        "Seed report:\n{}",
        serde_json::to_string_pretty(&report).context("Failed to render seed report")?
    );

    Ok(())
}
