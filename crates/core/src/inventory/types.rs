//! Inventory domain types.

use std::fmt;
use std::str::FromStr;

use mizan_shared::types::WarehouseId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept on average cost.
pub const AVG_COST_SCALE: u32 = 6;

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods issued.
    Out,
    /// Goods moved between warehouses.
    Transfer,
    /// Manual or opening adjustment.
    Adjust,
    /// Goods coming back, e.g. a voided sale.
    Return,
}

impl MovementType {
    /// Stored name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Transfer => "transfer",
            Self::Adjust => "adjust",
            Self::Return => "return",
        }
    }

    /// Whether the movement adds to the on-hand balance.
    #[must_use]
    pub fn is_inbound(self) -> bool {
        matches!(self, Self::In | Self::Return | Self::Adjust)
    }

    /// Signed effect of `qty` on the on-hand balance.
    #[must_use]
    pub fn signed(self, qty: Decimal) -> Decimal {
        if self.is_inbound() { qty } else { -qty }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "transfer" => Ok(Self::Transfer),
            "adjust" => Ok(Self::Adjust),
            "return" => Ok(Self::Return),
            other => Err(format!("unknown movement type: {other}")),
        }
    }
}

/// Current stock level of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    /// Item SKU, used in error messages.
    pub sku: String,
    /// Quantity on hand.
    pub qty: Decimal,
    /// Weighted-average unit cost.
    pub avg_cost: Decimal,
}

/// A movement to append to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementDraft {
    /// Movement kind.
    pub movement_type: MovementType,
    /// Quantity moved, always positive.
    pub qty: Decimal,
    /// Unit cost recorded on the movement.
    pub unit_cost: Decimal,
    /// Source warehouse, for transfers.
    pub warehouse_id: Option<WarehouseId>,
    /// Destination warehouse, for transfers.
    pub to_warehouse_id: Option<WarehouseId>,
}

impl MovementDraft {
    pub(crate) fn new(movement_type: MovementType, qty: Decimal, unit_cost: Decimal) -> Self {
        Self {
            movement_type,
            qty,
            unit_cost,
            warehouse_id: None,
            to_warehouse_id: None,
        }
    }

    /// Value of the movement at its unit cost.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.qty * self.unit_cost
    }
}

/// Result of applying a movement: the new level and the movement record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockApplication {
    /// Quantity after the movement.
    pub qty: Decimal,
    /// Average cost after the movement.
    pub avg_cost: Decimal,
    /// Movement to record.
    pub movement: MovementDraft,
}
