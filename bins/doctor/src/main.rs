//! Maintenance tool for a Mizan book.
//!
//! Usage:
//!   doctor health            - Scan for unbalanced vouchers, negative stock
//!                              and broken references
//!   doctor dump <FILE>       - Write every table to a JSON snapshot
//!   doctor restore <FILE>    - Replace the book with a snapshot that passes
//!                              the same scan
//!
//! `health` exits non-zero when anything is found.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use mizan_db::Engine;
use mizan_db::backup::Snapshot;
use mizan_shared::AppConfig;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "doctor", about = "Health check, dump and restore for a Mizan book")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the invariant scan.
    Health {
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Dumps every table to a file.
    Dump {
        /// Output file.
        output: PathBuf,
    },
    /// Restores a dump, replacing everything in the database.
    Restore {
        /// Snapshot file written by `dump`.
        input: PathBuf,
    },
}

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

    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;
    let engine = Engine::from_config(&config)
        .await
        .context("connecting to database")?;

    match cli.command {
        Command::Health { json } => {
            let report = engine.health_check().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if !report.is_healthy() {
                for voucher in &report.unbalanced_vouchers {
                    warn!(
                        code = %voucher.code,
                        debit = %voucher.debit,
                        credit = %voucher.credit,
                        "unbalanced voucher"
                    );
                }
                for item in &report.negative_stock_items {
                    warn!(sku = %item.sku, qty = %item.qty, "negative stock");
                }
                for violation in &report.integrity_violations {
                    warn!(?violation, "integrity violation");
                }
                bail!("{} findings", report.finding_count());
            }
            info!("book is healthy");
        }
        Command::Dump { output } => {
            let snapshot = engine.dump().await?;
            std::fs::write(&output, snapshot.to_json()?)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(rows = snapshot.row_count(), file = %output.display(), "dump written");
        }
        Command::Restore { input } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let snapshot = Snapshot::from_json(&json)?;
            let rows = snapshot.row_count();
            engine.restore(snapshot).await?;
            info!(rows, file = %input.display(), "restore complete");
        }
    }
    Ok(())
}
