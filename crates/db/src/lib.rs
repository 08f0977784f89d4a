//! Database layer and posting engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions and migrations
//! - Repositories for accounts, vouchers, stock, documents and audit
//! - Document services that post inside one transaction
//! - The [`Engine`] facade, health check, backup and seeding

pub mod backup;
pub mod engine;
pub mod entities;
pub mod error;
pub mod health;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod services;

pub use engine::Engine;
pub use error::{EngineError, EngineResult, ErrorReport};

use std::time::Duration;

use mizan_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(config.sqlx_logging);
    Database::connect(options).await
}
