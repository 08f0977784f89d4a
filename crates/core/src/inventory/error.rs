//! Inventory error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by stock movements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The movement would take the item below zero.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    NegativeStock {
        /// Item SKU.
        sku: String,
        /// Quantity on hand.
        available: Decimal,
        /// Quantity requested.
        requested: Decimal,
    },

    /// Item does not exist.
    #[error("Inventory item not found: {0}")]
    ItemMissing(String),

    /// Movement quantity must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit cost may not be negative.
    #[error("Unit cost cannot be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Transfer source and destination are the same warehouse.
    #[error("Transfer source and destination warehouse must differ")]
    SameWarehouse,

    /// Warehouse does not exist.
    #[error("Warehouse not found: {0}")]
    WarehouseMissing(String),

    /// SKU already used by another item.
    #[error("SKU already exists: {0}")]
    DuplicateSku(String),
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeStock { .. } => "NEGATIVE_STOCK",
            Self::ItemMissing(_) => "ITEM_MISSING",
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::SameWarehouse => "SAME_WAREHOUSE",
            Self::WarehouseMissing(_) => "WAREHOUSE_MISSING",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeStock { .. } | Self::DuplicateSku(_) => 409,
            Self::ItemMissing(_) | Self::WarehouseMissing(_) => 404,
            Self::NonPositiveQuantity(_) | Self::NegativeUnitCost(_) | Self::SameWarehouse => 400,
        }
    }
}
