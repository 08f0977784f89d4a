//! Plain structured dump and restore of the whole book.
//!
//! Encryption and transport belong to the caller; this module only turns
//! the tables into a [`Snapshot`] and back. A restore is refused unless the
//! snapshot passes the same invariant scan as the health check.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entities::{
    account_mappings, accounts, audit_events, document_lines, document_sequences, fiscal_periods,
    inventory_items, inventory_movements, journal_lines, journal_vouchers, parties,
    source_documents, warehouses,
};
use crate::error::{EngineError, EngineResult};
use crate::health::scan_snapshot;

/// Snapshot format version written by [`dump`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Rows per insert statement when restoring.
const INSERT_BATCH: usize = 200;

/// Every table, as rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// When the dump was taken.
    pub created_at: DateTime<Utc>,
    /// Chart of accounts.
    pub accounts: Vec<accounts::Model>,
    /// Account mappings.
    pub mappings: Vec<account_mappings::Model>,
    /// Fiscal period locks.
    pub fiscal_periods: Vec<fiscal_periods::Model>,
    /// Voucher headers.
    pub vouchers: Vec<journal_vouchers::Model>,
    /// Voucher lines.
    pub lines: Vec<journal_lines::Model>,
    /// Warehouses.
    pub warehouses: Vec<warehouses::Model>,
    /// Stock items.
    pub items: Vec<inventory_items::Model>,
    /// Stock movements.
    pub movements: Vec<inventory_movements::Model>,
    /// Customers and suppliers.
    #[serde(default)]
    pub parties: Vec<parties::Model>,
    /// Source documents.
    pub documents: Vec<source_documents::Model>,
    /// Source document lines.
    pub document_lines: Vec<document_lines::Model>,
    /// Audit log.
    pub audit_events: Vec<audit_events::Model>,
}

impl Snapshot {
    /// Encodes the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.accounts.len()
            + self.mappings.len()
            + self.fiscal_periods.len()
            + self.vouchers.len()
            + self.lines.len()
            + self.warehouses.len()
            + self.items.len()
            + self.movements.len()
            + self.parties.len()
            + self.documents.len()
            + self.document_lines.len()
            + self.audit_events.len()
    }
}

/// Reads every table.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn dump<C: ConnectionTrait>(conn: &C) -> EngineResult<Snapshot> {
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        created_at: Utc::now(),
        accounts: accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(conn)
            .await?,
        mappings: account_mappings::Entity::find()
            .order_by_asc(account_mappings::Column::Key)
            .all(conn)
            .await?,
        fiscal_periods: fiscal_periods::Entity::find()
            .order_by_asc(fiscal_periods::Column::PeriodKey)
            .all(conn)
            .await?,
        vouchers: journal_vouchers::Entity::find()
            .order_by_asc(journal_vouchers::Column::CreatedAt)
            .order_by_asc(journal_vouchers::Column::Id)
            .all(conn)
            .await?,
        lines: journal_lines::Entity::find()
            .order_by_asc(journal_lines::Column::VoucherId)
            .order_by_asc(journal_lines::Column::LineNo)
            .all(conn)
            .await?,
        warehouses: warehouses::Entity::find()
            .order_by_asc(warehouses::Column::Code)
            .all(conn)
            .await?,
        items: inventory_items::Entity::find()
            .order_by_asc(inventory_items::Column::Sku)
            .all(conn)
            .await?,
        movements: inventory_movements::Entity::find()
            .order_by_asc(inventory_movements::Column::CreatedAt)
            .order_by_asc(inventory_movements::Column::Id)
            .all(conn)
            .await?,
        parties: parties::Entity::find()
            .order_by_asc(parties::Column::Code)
            .all(conn)
            .await?,
        documents: source_documents::Entity::find()
            .order_by_asc(source_documents::Column::CreatedAt)
            .order_by_asc(source_documents::Column::Id)
            .all(conn)
            .await?,
        document_lines: document_lines::Entity::find()
            .order_by_asc(document_lines::Column::DocumentId)
            .order_by_asc(document_lines::Column::LineNo)
            .all(conn)
            .await?,
        audit_events: audit_events::Entity::find()
            .order_by_asc(audit_events::Column::CreatedAt)
            .order_by_asc(audit_events::Column::Id)
            .all(conn)
            .await?,
    })
}

/// Replaces every table with the snapshot's rows.
///
/// The snapshot is scanned first; any finding rejects it before a single
/// row is touched. Run inside a transaction so a failed insert leaves the
/// previous book in place.
///
/// # Errors
///
/// `RestoreRejected` for an unknown version or a failed scan, or a
/// database error.
pub async fn restore<C: ConnectionTrait>(
    conn: &C,
    snapshot: Snapshot,
    tolerance: Decimal,
) -> EngineResult<()> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(EngineError::RestoreRejected {
            reason: format!("unsupported snapshot version {}", snapshot.version),
            report: Box::default(),
        });
    }

    let report = scan_snapshot(&snapshot, tolerance);
    if !report.is_healthy() {
        warn!(findings = report.finding_count(), "restore rejected");
        return Err(EngineError::RestoreRejected {
            reason: format!(
                "{} unbalanced vouchers, {} negative stock items, {} integrity violations",
                report.unbalanced_vouchers.len(),
                report.negative_stock_items.len(),
                report.integrity_violations.len()
            ),
            report: Box::new(report),
        });
    }

    let rows = snapshot.row_count();

    // Children before parents. Code counters restart from the restored
    // codes on first use.
    document_sequences::Entity::delete_many().exec(conn).await?;
    document_lines::Entity::delete_many().exec(conn).await?;
    source_documents::Entity::delete_many().exec(conn).await?;
    parties::Entity::delete_many().exec(conn).await?;
    audit_events::Entity::delete_many().exec(conn).await?;
    inventory_movements::Entity::delete_many().exec(conn).await?;
    inventory_items::Entity::delete_many().exec(conn).await?;
    warehouses::Entity::delete_many().exec(conn).await?;
    journal_lines::Entity::delete_many().exec(conn).await?;
    journal_vouchers::Entity::delete_many().exec(conn).await?;
    fiscal_periods::Entity::delete_many().exec(conn).await?;
    account_mappings::Entity::delete_many().exec(conn).await?;
    accounts::Entity::delete_many().exec(conn).await?;

    insert_all(conn, snapshot.accounts.into_iter().map(accounts::ActiveModel::from)).await?;
    insert_all(conn, snapshot.mappings.into_iter().map(account_mappings::ActiveModel::from)).await?;
    insert_all(
        conn,
        snapshot.fiscal_periods.into_iter().map(fiscal_periods::ActiveModel::from),
    )
    .await?;
    insert_all(conn, snapshot.vouchers.into_iter().map(journal_vouchers::ActiveModel::from)).await?;
    insert_all(conn, snapshot.lines.into_iter().map(journal_lines::ActiveModel::from)).await?;
    insert_all(conn, snapshot.warehouses.into_iter().map(warehouses::ActiveModel::from)).await?;
    insert_all(conn, snapshot.items.into_iter().map(inventory_items::ActiveModel::from)).await?;
    insert_all(
        conn,
        snapshot.movements.into_iter().map(inventory_movements::ActiveModel::from),
    )
    .await?;
    insert_all(conn, snapshot.parties.into_iter().map(parties::ActiveModel::from)).await?;
    insert_all(
        conn,
        snapshot.documents.into_iter().map(source_documents::ActiveModel::from),
    )
    .await?;
    insert_all(
        conn,
        snapshot.document_lines.into_iter().map(document_lines::ActiveModel::from),
    )
    .await?;
    insert_all(conn, snapshot.audit_events.into_iter().map(audit_events::ActiveModel::from)).await?;

    info!(rows, "snapshot restored");
    Ok(())
}

async fn insert_all<C, A, I>(conn: &C, models: I) -> EngineResult<()>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = A>,
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let mut rows = models.into_iter().map(ActiveModelTrait::reset_all).peekable();
    while rows.peek().is_some() {
        let batch: Vec<A> = rows.by_ref().take(INSERT_BATCH).collect();
        <A::Entity as EntityTrait>::insert_many(batch)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}
