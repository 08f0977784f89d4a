//! Read-only invariant scan over the stored books.

use mizan_core::integrity::{self, HealthReport, IntegrityInput, ItemRow, LineRow, MovementRow, VoucherRow};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::backup::{self, Snapshot};
use crate::error::EngineResult;

/// Scans the database: voucher balance, stock quantities against the
/// movement log, and references between tables.
///
/// # Errors
///
/// Returns an error if loading fails.
pub async fn check<C: ConnectionTrait>(conn: &C, tolerance: Decimal) -> EngineResult<HealthReport> {
    let snapshot = backup::dump(conn).await?;
    let report = scan_snapshot(&snapshot, tolerance);
    if report.is_healthy() {
        info!("health check passed");
    } else {
        warn!(findings = report.finding_count(), "health check found problems");
    }
    Ok(report)
}

/// Scans a snapshot without touching the database.
#[must_use]
pub fn scan_snapshot(snapshot: &Snapshot, tolerance: Decimal) -> HealthReport {
    let account_codes: Vec<String> = snapshot.accounts.iter().map(|a| a.code.clone()).collect();
    let mappings: Vec<(String, String)> = snapshot
        .mappings
        .iter()
        .map(|m| (m.key.clone(), m.account_code.clone()))
        .collect();
    let vouchers: Vec<VoucherRow> = snapshot
        .vouchers
        .iter()
        .map(|v| VoucherRow {
            id: v.id,
            code: v.code.clone(),
        })
        .collect();
    let lines: Vec<LineRow> = snapshot
        .lines
        .iter()
        .map(|l| LineRow {
            id: l.id,
            voucher_id: l.voucher_id,
            account_code: l.account_code.clone(),
            dc: l.dc.into(),
            amount: l.amount,
        })
        .collect();
    let items: Vec<ItemRow> = snapshot
        .items
        .iter()
        .map(|i| ItemRow {
            id: i.id,
            sku: i.sku.clone(),
            qty: i.qty,
            avg_cost: i.avg_cost,
        })
        .collect();
    let movements: Vec<MovementRow> = snapshot
        .movements
        .iter()
        .map(|m| MovementRow {
            id: m.id,
            item_id: m.item_id,
            movement_type: m.movement_type.into(),
            qty: m.qty,
        })
        .collect();

    integrity::scan(
        IntegrityInput {
            account_codes: &account_codes,
            mappings: &mappings,
            vouchers: &vouchers,
            lines: &lines,
            items: &items,
            movements: &movements,
        },
        tolerance,
    )
}
