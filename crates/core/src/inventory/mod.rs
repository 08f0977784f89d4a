//! Inventory costing.
//!
//! Quantity and weighted-average cost per stock item. Every function here is
//! pure: it takes the current stock level and returns the new level plus the
//! movement to append. Persisting both is the caller's job.

pub mod costing;
pub mod error;
pub mod types;

#[cfg(test)]
mod costing_props;

pub use costing::CostingEngine;
pub use error::InventoryError;
pub use types::{AVG_COST_SCALE, MovementDraft, MovementType, StockApplication, StockItem};
