//! Source document services.
//!
//! Each service function is one flat unit of work over a connection the
//! caller supplies, normally an open `DatabaseTransaction`. The period lock
//! is checked first; the audit event is written last. Nothing here begins
//! or commits a transaction: that is the [`crate::Engine`]'s job.

pub mod cash;
pub mod orders;
pub mod purchases;
pub mod sales;
pub mod transfers;
pub mod void;

use chrono::{NaiveDate, Utc};
use mizan_core::documents::{LineAmounts, PriceLine};
use mizan_core::ledger::LedgerError;
use mizan_core::mapping::MappingKey;
use mizan_shared::types::{Actor, ItemId};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::entities::{document_lines, journal_vouchers, source_documents};
use crate::error::EngineResult;
use crate::repositories::{AuditRecord, AuditRepository, MappingRepository};

pub use cash::{CashService, CollectionInput, ExpenseInput, PaymentInput};
pub use orders::{InvoiceOrderInput, InvoicedOrder, OrderInput, OrderService};
pub use purchases::{PurchaseInput, PurchaseService};
pub use sales::{SaleInput, SalesService};
pub use transfers::{TransferInput, TransferService};
pub use void::{VoidInput, VoidOutcome, VoidService};

/// One goods line of a sale or purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLineInput {
    /// Stock item.
    pub item_id: ItemId,
    /// Quantity.
    pub qty: Decimal,
    /// Net unit price. For purchases this is also the unit cost.
    pub unit_price: Decimal,
    /// VAT rate as a fraction, e.g. `0.18`.
    pub vat_rate: Decimal,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemLineInput {
    /// A line without description.
    #[must_use]
    pub fn new(item_id: ItemId, qty: Decimal, unit_price: Decimal, vat_rate: Decimal) -> Self {
        Self {
            item_id,
            qty,
            unit_price,
            vat_rate,
            description: None,
        }
    }

    fn price(&self) -> PriceLine {
        PriceLine {
            qty: self.qty,
            unit_price: self.unit_price,
            vat_rate: self.vat_rate,
        }
    }
}

/// A document as it stands after a service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedDocument {
    /// Header.
    pub document: source_documents::Model,
    /// Stored lines, empty for cash documents.
    pub lines: Vec<document_lines::Model>,
    /// Vouchers posted by the call, in posting order.
    pub vouchers: Vec<journal_vouchers::Model>,
}

/// Business date of an operation: the given date or today.
pub(crate) fn business_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// Rejects a blank field, returning it trimmed.
pub(crate) fn require_text(label: &str, value: &str) -> Result<String, LedgerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::Validation(format!("{label} is required")));
    }
    Ok(value.to_string())
}

/// Rejects a non-positive money amount.
pub(crate) fn require_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Validates and prices goods lines. At least one line is required.
pub(crate) fn price_lines(
    lines: &[ItemLineInput],
) -> Result<Vec<LineAmounts>, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::Validation(
            "document needs at least one line".into(),
        ));
    }
    lines
        .iter()
        .map(|line| {
            let price = line.price();
            price.validate()?;
            Ok(price.amounts())
        })
        .collect()
}

/// Resolves a mapping key, falling back to the seeded default account.
pub(crate) async fn account_for<C: ConnectionTrait>(conn: &C, key: &str) -> EngineResult<String> {
    MappingRepository::new(conn)
        .resolve(key, MappingKey::default_code(key))
        .await
}

/// Writes the creation audit event for a document.
pub(crate) async fn audit_created<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    document: &source_documents::Model,
) -> EngineResult<()> {
    let doc_type: mizan_core::documents::DocumentType = document.doc_type.into();
    AuditRepository::new(conn)
        .record(
            actor,
            AuditRecord::new(doc_type.as_str(), document.id, "create")
                .after(serde_json::to_value(document)?),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_lines_requires_a_line() {
        assert!(matches!(price_lines(&[]), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_price_lines() {
        let lines = [
            ItemLineInput::new(ItemId::new(), dec!(5), dec!(10), dec!(0.18)),
            ItemLineInput::new(ItemId::new(), dec!(1), dec!(7.5), dec!(0)),
        ];
        let amounts = price_lines(&lines).unwrap();
        assert_eq!(amounts[0].gross, dec!(59));
        assert_eq!(amounts[1].vat, dec!(0));
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("expense category", "  rent ").unwrap(), "rent");
        assert!(require_text("expense category", "   ").is_err());
    }

    #[test]
    fn test_require_amount() {
        assert!(require_amount(dec!(0.01)).is_ok());
        assert!(require_amount(dec!(0)).is_err());
    }
}
