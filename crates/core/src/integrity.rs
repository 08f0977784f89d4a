//! Ledger and stock invariant checks.
//!
//! The same scan backs the read-only health check and the validation a
//! restore runs before it commits: every voucher balances, every item's
//! quantity equals the signed sum of its movements and is non-negative, and
//! every reference points at a row that exists.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::MovementType;
use crate::ledger::{Dc, VoucherTotals};

/// Voucher header as seen by the scan.
#[derive(Debug, Clone)]
pub struct VoucherRow {
    /// Voucher id.
    pub id: Uuid,
    /// Voucher code.
    pub code: String,
}

/// Journal line as seen by the scan.
#[derive(Debug, Clone)]
pub struct LineRow {
    /// Line id.
    pub id: Uuid,
    /// Owning voucher.
    pub voucher_id: Uuid,
    /// Account code.
    pub account_code: String,
    /// Side.
    pub dc: Dc,
    /// Amount.
    pub amount: Decimal,
}

/// Inventory item as seen by the scan.
#[derive(Debug, Clone)]
pub struct ItemRow {
    /// Item id.
    pub id: Uuid,
    /// SKU.
    pub sku: String,
    /// Quantity on hand.
    pub qty: Decimal,
    /// Average cost.
    pub avg_cost: Decimal,
}

/// Inventory movement as seen by the scan.
#[derive(Debug, Clone)]
pub struct MovementRow {
    /// Movement id.
    pub id: Uuid,
    /// Item moved.
    pub item_id: Uuid,
    /// Kind.
    pub movement_type: MovementType,
    /// Quantity, positive.
    pub qty: Decimal,
}

/// Everything the scan looks at.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityInput<'a> {
    /// Known account codes.
    pub account_codes: &'a [String],
    /// `(key, account_code)` mappings.
    pub mappings: &'a [(String, String)],
    /// Voucher headers.
    pub vouchers: &'a [VoucherRow],
    /// Journal lines.
    pub lines: &'a [LineRow],
    /// Items.
    pub items: &'a [ItemRow],
    /// Movements.
    pub movements: &'a [MovementRow],
}

/// A voucher whose sides do not agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbalancedVoucher {
    /// Voucher id.
    pub voucher_id: Uuid,
    /// Voucher code.
    pub code: String,
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

/// An item below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeStockItem {
    /// Item id.
    pub item_id: Uuid,
    /// SKU.
    pub sku: String,
    /// Quantity on hand.
    pub qty: Decimal,
}

/// A broken reference or a quantity that disagrees with its movement log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    /// Line points at a voucher that does not exist.
    OrphanLine {
        /// Line id.
        line_id: Uuid,
        /// Missing voucher id.
        voucher_id: Uuid,
    },
    /// Line posts to an account code that does not exist.
    UnknownLineAccount {
        /// Line id.
        line_id: Uuid,
        /// Missing account code.
        account_code: String,
    },
    /// Voucher carries fewer than two lines.
    ShortVoucher {
        /// Voucher id.
        voucher_id: Uuid,
        /// Line count.
        lines: usize,
    },
    /// Movement points at an item that does not exist.
    OrphanMovement {
        /// Movement id.
        movement_id: Uuid,
        /// Missing item id.
        item_id: Uuid,
    },
    /// Mapping targets an account code that does not exist.
    DanglingMapping {
        /// Mapping key.
        key: String,
        /// Missing account code.
        account_code: String,
    },
    /// Item quantity differs from the signed sum of its movements.
    QuantityMismatch {
        /// Item id.
        item_id: Uuid,
        /// SKU.
        sku: String,
        /// Stored quantity.
        qty: Decimal,
        /// Signed sum of movements.
        movement_sum: Decimal,
    },
    /// Item average cost below zero.
    NegativeAverageCost {
        /// Item id.
        item_id: Uuid,
        /// Average cost.
        avg_cost: Decimal,
    },
}

/// Result of an invariant scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Vouchers whose debits and credits disagree beyond the tolerance.
    pub unbalanced_vouchers: Vec<UnbalancedVoucher>,
    /// Items with negative quantity.
    pub negative_stock_items: Vec<NegativeStockItem>,
    /// Referential and movement-log violations.
    pub integrity_violations: Vec<IntegrityViolation>,
}

impl HealthReport {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.unbalanced_vouchers.is_empty()
            && self.negative_stock_items.is_empty()
            && self.integrity_violations.is_empty()
    }

    /// Total number of findings.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.unbalanced_vouchers.len()
            + self.negative_stock_items.len()
            + self.integrity_violations.len()
    }
}

/// Scans `input` for invariant violations.
#[must_use]
pub fn scan(input: IntegrityInput<'_>, tolerance: Decimal) -> HealthReport {
    let mut report = HealthReport::default();
    let accounts: HashSet<&str> = input.account_codes.iter().map(String::as_str).collect();

    for (key, code) in input.mappings {
        if !accounts.contains(code.as_str()) {
            report.integrity_violations.push(IntegrityViolation::DanglingMapping {
                key: key.clone(),
                account_code: code.clone(),
            });
        }
    }

    let mut per_voucher: HashMap<Uuid, (VoucherTotals, usize)> = input
        .vouchers
        .iter()
        .map(|v| (v.id, (VoucherTotals::default(), 0)))
        .collect();

    for line in input.lines {
        match per_voucher.get_mut(&line.voucher_id) {
            Some((totals, count)) => {
                match line.dc {
                    Dc::Debit => totals.debit += line.amount,
                    Dc::Credit => totals.credit += line.amount,
                }
                *count += 1;
            }
            None => report.integrity_violations.push(IntegrityViolation::OrphanLine {
                line_id: line.id,
                voucher_id: line.voucher_id,
            }),
        }
        if !accounts.contains(line.account_code.as_str()) {
            report
                .integrity_violations
                .push(IntegrityViolation::UnknownLineAccount {
                    line_id: line.id,
                    account_code: line.account_code.clone(),
                });
        }
    }

    for voucher in input.vouchers {
        let Some((totals, count)) = per_voucher.get(&voucher.id) else {
            continue;
        };
        if *count < 2 {
            report.integrity_violations.push(IntegrityViolation::ShortVoucher {
                voucher_id: voucher.id,
                lines: *count,
            });
        }
        if !totals.is_balanced(tolerance) {
            report.unbalanced_vouchers.push(UnbalancedVoucher {
                voucher_id: voucher.id,
                code: voucher.code.clone(),
                debit: totals.debit,
                credit: totals.credit,
            });
        }
    }

    let mut movement_sums: HashMap<Uuid, Decimal> =
        input.items.iter().map(|i| (i.id, Decimal::ZERO)).collect();
    for movement in input.movements {
        match movement_sums.get_mut(&movement.item_id) {
            Some(sum) => *sum += movement.movement_type.signed(movement.qty),
            None => report.integrity_violations.push(IntegrityViolation::OrphanMovement {
                movement_id: movement.id,
                item_id: movement.item_id,
            }),
        }
    }

    for item in input.items {
        if item.qty < Decimal::ZERO {
            report.negative_stock_items.push(NegativeStockItem {
                item_id: item.id,
                sku: item.sku.clone(),
                qty: item.qty,
            });
        }
        if item.avg_cost < Decimal::ZERO {
            report
                .integrity_violations
                .push(IntegrityViolation::NegativeAverageCost {
                    item_id: item.id,
                    avg_cost: item.avg_cost,
                });
        }
        let movement_sum = movement_sums.get(&item.id).copied().unwrap_or_default();
        if movement_sum != item.qty {
            report
                .integrity_violations
                .push(IntegrityViolation::QuantityMismatch {
                    item_id: item.id,
                    sku: item.sku.clone(),
                    qty: item.qty,
                    movement_sum,
                });
        }
    }

    report
}
