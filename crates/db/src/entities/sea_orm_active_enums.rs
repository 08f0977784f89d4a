//! String-backed enums stored in the database.
//!
//! Each mirrors a `mizan-core` domain enum; the `From` impls convert between
//! the two at the repository boundary.

use mizan_core::{documents, inventory, ledger};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// VAT.
    #[sea_orm(string_value = "vat")]
    Vat,
}

/// Journal line side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Dc {
    /// Debit.
    #[sea_orm(string_value = "D")]
    #[serde(rename = "D")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    Credit,
}

/// Voucher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// On the books.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Reversed.
    #[sea_orm(string_value = "void")]
    Void,
}

/// Inventory movement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Receipt.
    #[sea_orm(string_value = "in")]
    In,
    /// Issue.
    #[sea_orm(string_value = "out")]
    Out,
    /// Warehouse transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Adjustment.
    #[sea_orm(string_value = "adjust")]
    Adjust,
    /// Return.
    #[sea_orm(string_value = "return")]
    Return,
}

/// Source document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sale.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Purchase.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Customer collection.
    #[sea_orm(string_value = "collection")]
    Collection,
    /// Supplier payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Stock transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Customer order, invoiced later as a sale.
    #[sea_orm(string_value = "sales_order")]
    SalesOrder,
    /// Supplier order, invoiced later as a purchase.
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
}

/// Source document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Not on the books.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Voided.
    #[sea_orm(string_value = "void")]
    Void,
}

/// Settlement method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// On account.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank.
    #[sea_orm(string_value = "bank")]
    Bank,
}

/// Party role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    /// Buys from us.
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Sells to us.
    #[sea_orm(string_value = "supplier")]
    Supplier,
    /// Both.
    #[sea_orm(string_value = "both")]
    Both,
}

macro_rules! mirror_enum {
    ($db:ident, $module:ident :: $core:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$module::$core> for $db {
            fn from(value: $module::$core) -> Self {
                match value {
                    $($module::$core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $module::$core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType, ledger::AccountType, [Asset, Liability, Equity, Income, Expense, Vat]);
mirror_enum!(Dc, ledger::Dc, [Debit, Credit]);
mirror_enum!(VoucherStatus, ledger::VoucherStatus, [Posted, Void]);
mirror_enum!(MovementType, inventory::MovementType, [In, Out, Transfer, Adjust, Return]);
mirror_enum!(DocumentType, documents::DocumentType, [Sale, Purchase, Collection, Payment, Expense, Transfer, SalesOrder, PurchaseOrder]);
mirror_enum!(DocumentStatus, documents::DocumentStatus, [Draft, Posted, Void]);
mirror_enum!(PaymentMethod, documents::PaymentMethod, [Credit, Cash, Bank]);
mirror_enum!(PartyType, documents::PartyType, [Customer, Supplier, Both]);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_round_trip_through_core() {
        for dc in Dc::iter() {
            assert_eq!(Dc::from(ledger::Dc::from(dc)), dc);
        }
        for ty in MovementType::iter() {
            assert_eq!(MovementType::from(inventory::MovementType::from(ty)), ty);
        }
        for ty in DocumentType::iter() {
            let core = documents::DocumentType::from(ty);
            assert_eq!(DocumentType::from(core), ty);
        }
    }

    #[test]
    fn test_stored_values_match_core_names() {
        assert_eq!(Dc::Debit.to_value(), "D");
        assert_eq!(MovementType::Return.to_value(), inventory::MovementType::Return.as_str());
        assert_eq!(AccountType::Vat.to_value(), ledger::AccountType::Vat.as_str());
        assert_eq!(DocumentType::Sale.to_value(), documents::DocumentType::Sale.as_str());
        assert_eq!(
            DocumentType::SalesOrder.to_value(),
            documents::DocumentType::SalesOrder.as_str()
        );
        assert_eq!(PartyType::Both.to_value(), documents::PartyType::Both.as_str());
    }
}
