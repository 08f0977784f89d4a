//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger posting configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Session store configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Event bus configuration.
    #[serde(default)]
    pub events: EventsConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Whether sqlx statement logging is enabled.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger posting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum allowed |debit - credit| for a voucher to count as balanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 5) // 0.00001
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session time-to-live in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Maximum number of live sessions kept in memory.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

fn default_session_ttl() -> u64 {
    28_800 // 8 hours
}

fn default_max_sessions() -> u64 {
    10_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Broadcast channel capacity; slow subscribers lag past this many events.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `MIZAN__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MIZAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        assert_eq!(LedgerConfig::default().balance_tolerance, dec!(0.00001));
        assert_eq!(SessionConfig::default().ttl_secs, 28_800);
        assert_eq!(EventsConfig::default().capacity, 256);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("MIZAN__DATABASE__URL", Some("sqlite::memory:")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.balance_tolerance, dec!(0.00001));
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("MIZAN__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
