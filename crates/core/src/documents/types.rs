//! Document kinds and lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::party::PartyType;
use crate::ledger::LedgerError;
use crate::mapping::MappingKey;

/// Kind of source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sale to a customer.
    Sale,
    /// Purchase from a supplier.
    Purchase,
    /// Money collected from a customer.
    Collection,
    /// Money paid to a supplier.
    Payment,
    /// Operating expense.
    Expense,
    /// Stock moved between warehouses.
    Transfer,
    /// Customer order. Moves nothing until invoiced as a sale.
    SalesOrder,
    /// Order placed with a supplier. Moves nothing until invoiced as a
    /// purchase.
    PurchaseOrder,
}

impl DocumentType {
    /// Stored name, also used as movement and voucher source type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Collection => "collection",
            Self::Payment => "payment",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::SalesOrder => "sales_order",
            Self::PurchaseOrder => "purchase_order",
        }
    }

    /// Prefix of generated document codes.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Sale => "SAL",
            Self::Purchase => "PUR",
            Self::Collection => "COL",
            Self::Payment => "PAY",
            Self::Expense => "EXP",
            Self::Transfer => "TRF",
            Self::SalesOrder => "SO",
            Self::PurchaseOrder => "PO",
        }
    }

    /// Voucher source types a document of this kind posts.
    ///
    /// A sale posts its revenue voucher and a separate cost voucher.
    #[must_use]
    pub fn voucher_source_types(self) -> &'static [&'static str] {
        match self {
            Self::Sale => &["sale", "cogs"],
            Self::Purchase => &["purchase"],
            Self::Collection => &["collection"],
            Self::Payment => &["payment"],
            Self::Expense => &["expense"],
            Self::Transfer | Self::SalesOrder | Self::PurchaseOrder => &[],
        }
    }

    /// Whether this is an order, which stays a draft until invoiced.
    #[must_use]
    pub fn is_order(self) -> bool {
        matches!(self, Self::SalesOrder | Self::PurchaseOrder)
    }

    /// Document an order is invoiced as.
    #[must_use]
    pub fn invoice_type(self) -> Option<Self> {
        match self {
            Self::SalesOrder => Some(Self::Sale),
            Self::PurchaseOrder => Some(Self::Purchase),
            _ => None,
        }
    }

    /// Role the document's party must be able to play.
    #[must_use]
    pub fn party_role(self) -> Option<PartyType> {
        match self {
            Self::Sale | Self::SalesOrder | Self::Collection => Some(PartyType::Customer),
            Self::Purchase | Self::PurchaseOrder | Self::Payment => Some(PartyType::Supplier),
            Self::Expense | Self::Transfer => None,
        }
    }

    /// Source type tagged on movements written by a void.
    #[must_use]
    pub fn void_source_type(self) -> String {
        format!("{}_void", self.as_str())
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "purchase" => Ok(Self::Purchase),
            "collection" => Ok(Self::Collection),
            "payment" => Ok(Self::Payment),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            "sales_order" => Ok(Self::SalesOrder),
            "purchase_order" => Ok(Self::PurchaseOrder),
            other => Err(LedgerError::Validation(format!("unknown document type: {other}"))),
        }
    }
}

/// Document lifecycle: `Draft -> Posted -> Void`.
///
/// Orders run `Draft -> Posted` when invoiced, or `Draft -> Void` when
/// cancelled; a posted order stands for the invoice raised from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Saved but not on the books.
    Draft,
    /// Posted to ledger and stock.
    Posted,
    /// Reversed. Terminal.
    Void,
}

impl DocumentStatus {
    /// Checks that a document of `doc_type` in this status may be voided.
    ///
    /// Posted documents are voided by reversal. Orders are voided only
    /// while still drafts; an invoiced order is undone through its invoice.
    ///
    /// # Errors
    ///
    /// `AlreadyVoid` for void documents, a validation error otherwise.
    pub fn ensure_voidable(
        self,
        doc_type: DocumentType,
        document_id: Uuid,
    ) -> Result<(), LedgerError> {
        match (self, doc_type.is_order()) {
            (Self::Void, _) => Err(LedgerError::AlreadyVoid(document_id)),
            (Self::Posted, false) | (Self::Draft, true) => Ok(()),
            (Self::Draft, false) => Err(LedgerError::Validation(format!(
                "document {document_id} is a draft and has nothing to reverse"
            ))),
            (Self::Posted, true) => Err(LedgerError::Validation(format!(
                "order {document_id} has been invoiced; void the invoice instead"
            ))),
        }
    }

    /// Checks that an order in this status may be invoiced.
    ///
    /// # Errors
    ///
    /// `AlreadyVoid` for a cancelled order, a validation error for one
    /// already invoiced.
    pub fn ensure_invoiceable(self, order_id: Uuid) -> Result<(), LedgerError> {
        match self {
            Self::Draft => Ok(()),
            Self::Void => Err(LedgerError::AlreadyVoid(order_id)),
            Self::Posted => Err(LedgerError::Validation(format!(
                "order {order_id} is already invoiced"
            ))),
        }
    }
}

/// How a document is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// On account (receivable or payable).
    Credit,
    /// Cash.
    Cash,
    /// Bank transfer.
    Bank,
}

impl PaymentMethod {
    /// Stored name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Cash => "cash",
            Self::Bank => "bank",
        }
    }

    /// Mapping key of the account that receives or pays the money.
    ///
    /// For `Credit` this is the customer receivable.
    #[must_use]
    pub fn settlement_key(self) -> &'static str {
        match self {
            Self::Credit => MappingKey::SALES_RECEIVABLE,
            Self::Cash => MappingKey::CASH,
            Self::Bank => MappingKey::BANK,
        }
    }

    /// Rejects `Credit` where real money must move.
    ///
    /// # Errors
    ///
    /// Validation error for `Credit`.
    pub fn ensure_settles_in_money(self) -> Result<(), LedgerError> {
        match self {
            Self::Cash | Self::Bank => Ok(()),
            Self::Credit => Err(LedgerError::Validation(
                "payment method must be cash or bank".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_posts_two_vouchers() {
        assert_eq!(DocumentType::Sale.voucher_source_types(), &["sale", "cogs"]);
        assert!(DocumentType::Transfer.voucher_source_types().is_empty());
    }

    #[test]
    fn test_void_source_type() {
        assert_eq!(DocumentType::Purchase.void_source_type(), "purchase_void");
    }

    #[test]
    fn test_parse() {
        assert_eq!("expense".parse::<DocumentType>().unwrap(), DocumentType::Expense);
        assert!("invoice".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_ensure_voidable() {
        let id = Uuid::nil();
        let sale = DocumentType::Sale;
        assert!(DocumentStatus::Posted.ensure_voidable(sale, id).is_ok());
        assert_eq!(
            DocumentStatus::Void.ensure_voidable(sale, id),
            Err(LedgerError::AlreadyVoid(id))
        );
        assert!(matches!(
            DocumentStatus::Draft.ensure_voidable(sale, id),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_orders_void_only_as_drafts() {
        let id = Uuid::nil();
        let order = DocumentType::SalesOrder;
        assert!(DocumentStatus::Draft.ensure_voidable(order, id).is_ok());
        assert!(matches!(
            DocumentStatus::Posted.ensure_voidable(order, id),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(
            DocumentStatus::Void.ensure_voidable(order, id),
            Err(LedgerError::AlreadyVoid(id))
        );
    }

    #[test]
    fn test_ensure_invoiceable() {
        let id = Uuid::nil();
        assert!(DocumentStatus::Draft.ensure_invoiceable(id).is_ok());
        assert!(DocumentStatus::Posted.ensure_invoiceable(id).is_err());
        assert_eq!(
            DocumentStatus::Void.ensure_invoiceable(id),
            Err(LedgerError::AlreadyVoid(id))
        );
    }

    #[test]
    fn test_orders() {
        assert_eq!(DocumentType::SalesOrder.invoice_type(), Some(DocumentType::Sale));
        assert_eq!(DocumentType::PurchaseOrder.invoice_type(), Some(DocumentType::Purchase));
        assert_eq!(DocumentType::Sale.invoice_type(), None);
        assert!(DocumentType::PurchaseOrder.voucher_source_types().is_empty());
        assert_eq!(DocumentType::PurchaseOrder.code_prefix(), "PO");
        assert_eq!(
            "sales_order".parse::<DocumentType>().unwrap(),
            DocumentType::SalesOrder
        );
    }

    #[test]
    fn test_party_roles() {
        assert_eq!(DocumentType::Collection.party_role(), Some(PartyType::Customer));
        assert_eq!(DocumentType::PurchaseOrder.party_role(), Some(PartyType::Supplier));
        assert_eq!(DocumentType::Expense.party_role(), None);
    }

    #[test]
    fn test_settlement_keys() {
        assert_eq!(PaymentMethod::Credit.settlement_key(), "sales.receivable");
        assert_eq!(PaymentMethod::Cash.settlement_key(), "cash.main");
        assert_eq!(PaymentMethod::Bank.settlement_key(), "bank.main");
        assert!(PaymentMethod::Credit.ensure_settles_in_money().is_err());
        assert!(PaymentMethod::Bank.ensure_settles_in_money().is_ok());
    }
}
