//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. They are ordered and
//! additive; each one has a `down` that drops exactly what it created.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_ledger;
mod m20260301_000002_inventory;
mod m20260301_000003_documents;
mod m20260301_000004_audit;
mod m20260315_000005_concurrency;
mod m20260315_000006_parties;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_ledger::Migration),
            Box::new(m20260301_000002_inventory::Migration),
            Box::new(m20260301_000003_documents::Migration),
            Box::new(m20260301_000004_audit::Migration),
            Box::new(m20260315_000005_concurrency::Migration),
            Box::new(m20260315_000006_parties::Migration),
        ]
    }
}
