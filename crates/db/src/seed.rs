//! Startup seed: default chart of accounts, mappings and warehouse.
//!
//! Only missing rows are inserted, so running it on every start is safe and
//! never overwrites a mapping somebody changed.

use mizan_core::mapping::{DEFAULT_ACCOUNTS, DEFAULT_MAPPINGS, DEFAULT_WAREHOUSE};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::info;

use crate::error::EngineResult;
use crate::repositories::{
    AccountRepository, CreateAccountInput, InventoryRepository, MappingRepository,
};

/// What a seed run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Accounts created.
    pub accounts_created: usize,
    /// Mappings created.
    pub mappings_created: usize,
    /// Whether the default warehouse was created.
    pub warehouse_created: bool,
}

impl SeedSummary {
    /// Whether the run changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.accounts_created == 0 && self.mappings_created == 0 && !self.warehouse_created
    }
}

/// Inserts whatever default rows are missing.
///
/// # Errors
///
/// Returns an error if a query or insert fails.
pub async fn seed_defaults<C: ConnectionTrait>(conn: &C) -> EngineResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let accounts = AccountRepository::new(conn);
    for default in DEFAULT_ACCOUNTS {
        if accounts.find(default.code).await?.is_none() {
            accounts
                .create(CreateAccountInput {
                    code: default.code.to_string(),
                    name: default.name.to_string(),
                    account_type: default.account_type,
                })
                .await?;
            summary.accounts_created += 1;
        }
    }

    let mappings = MappingRepository::new(conn);
    for (key, code) in DEFAULT_MAPPINGS {
        // Deactivated default accounts are left unmapped.
        let postable = accounts.find(code).await?.is_some_and(|a| a.is_active);
        if postable && mappings.get(key).await?.is_none() {
            mappings.set(key, code).await?;
            summary.mappings_created += 1;
        }
    }

    let inventory = InventoryRepository::new(conn);
    let (code, name) = DEFAULT_WAREHOUSE;
    if inventory.warehouse_by_code(code).await?.is_none() {
        inventory.create_warehouse(code, name).await?;
        summary.warehouse_created = true;
    }

    info!(
        accounts = summary.accounts_created,
        mappings = summary.mappings_created,
        warehouse = summary.warehouse_created,
        "defaults seeded"
    );
    Ok(summary)
}
