//! Seeds an empty or partially seeded book.
//!
//! Inserts whatever default accounts, mappings and the default warehouse are
//! missing. Existing rows are never touched, so it is safe to run on every
//! deployment.
//!
//! Usage: cargo run --bin seeder

use mizan_db::Engine;
use mizan_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mizan=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let engine = Engine::from_config(&config).await?;
    info!("Connected to database");

    let summary = engine.seed_defaults().await?;
    if summary.is_noop() {
        info!("Nothing to seed");
    } else {
        info!(
            accounts = summary.accounts_created,
            mappings = summary.mappings_created,
            warehouse = summary.warehouse_created,
            "Seeding complete"
        );
    }
    Ok(())
}
