//! Weighted-average costing.

use mizan_shared::types::WarehouseId;
use rust_decimal::Decimal;

use super::error::InventoryError;
use super::types::{AVG_COST_SCALE, MovementDraft, MovementType, StockApplication, StockItem};

/// Stateless costing engine.
pub struct CostingEngine;

impl CostingEngine {
    /// Issues `qty` at the current average cost.
    ///
    /// # Errors
    ///
    /// `NegativeStock` when on-hand is short; nothing changes.
    pub fn outbound(item: &StockItem, qty: Decimal) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        ensure_available(item, qty)?;

        Ok(StockApplication {
            qty: item.qty - qty,
            avg_cost: item.avg_cost,
            movement: MovementDraft::new(MovementType::Out, qty, item.avg_cost),
        })
    }

    /// Receives `qty` at `unit_cost`, blending it into the average.
    ///
    /// `new_avg = (qty·avg + q·unit_cost) / (qty + q)`, rounded to six places.
    pub fn inbound(
        item: &StockItem,
        qty: Decimal,
        unit_cost: Decimal,
    ) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        ensure_cost(unit_cost)?;

        let new_qty = item.qty + qty;
        let avg_cost = if new_qty > Decimal::ZERO {
            round_avg((item.qty * item.avg_cost + qty * unit_cost) / new_qty)
        } else {
            item.avg_cost
        };

        Ok(StockApplication {
            qty: new_qty,
            avg_cost,
            movement: MovementDraft::new(MovementType::In, qty, unit_cost),
        })
    }

    /// Puts `qty` back on hand without touching the average.
    pub fn restock(
        item: &StockItem,
        qty: Decimal,
        unit_cost: Decimal,
    ) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        ensure_cost(unit_cost)?;

        Ok(StockApplication {
            qty: item.qty + qty,
            avg_cost: item.avg_cost,
            movement: MovementDraft::new(MovementType::Return, qty, unit_cost),
        })
    }

    /// Moves `qty` out of `from` towards `to`.
    ///
    /// Stock is held as a single balance, so the transfer decrements it and
    /// records both warehouses on the movement.
    pub fn transfer(
        item: &StockItem,
        qty: Decimal,
        from: WarehouseId,
        to: WarehouseId,
    ) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        if from == to {
            return Err(InventoryError::SameWarehouse);
        }
        ensure_available(item, qty)?;

        let mut movement = MovementDraft::new(MovementType::Transfer, qty, item.avg_cost);
        movement.warehouse_id = Some(from);
        movement.to_warehouse_id = Some(to);

        Ok(StockApplication {
            qty: item.qty - qty,
            avg_cost: item.avg_cost,
            movement,
        })
    }

    /// Undoes a receipt of `qty` at `unit_cost`.
    ///
    /// The receipt's contribution is taken back out of the average:
    /// `(qty·avg − q·unit_cost) / (qty − q)`, floored at zero. When the item
    /// empties the average is left as is.
    pub fn reverse_inbound(
        item: &StockItem,
        qty: Decimal,
        unit_cost: Decimal,
    ) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        ensure_cost(unit_cost)?;
        ensure_available(item, qty)?;

        let remaining = item.qty - qty;
        let avg_cost = if remaining > Decimal::ZERO {
            round_avg((item.qty * item.avg_cost - qty * unit_cost) / remaining).max(Decimal::ZERO)
        } else {
            item.avg_cost
        };

        Ok(StockApplication {
            qty: remaining,
            avg_cost,
            movement: MovementDraft::new(MovementType::Out, qty, unit_cost),
        })
    }

    /// Opening balance for a new item, recorded as an adjustment.
    pub fn opening(qty: Decimal, unit_cost: Decimal) -> Result<StockApplication, InventoryError> {
        ensure_positive(qty)?;
        ensure_cost(unit_cost)?;

        Ok(StockApplication {
            qty,
            avg_cost: round_avg(unit_cost),
            movement: MovementDraft::new(MovementType::Adjust, qty, unit_cost),
        })
    }
}

fn round_avg(value: Decimal) -> Decimal {
    value.round_dp(AVG_COST_SCALE).normalize()
}

fn ensure_positive(qty: Decimal) -> Result<(), InventoryError> {
    if qty <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(qty));
    }
    Ok(())
}

fn ensure_cost(unit_cost: Decimal) -> Result<(), InventoryError> {
    if unit_cost < Decimal::ZERO {
        return Err(InventoryError::NegativeUnitCost(unit_cost));
    }
    Ok(())
}

fn ensure_available(item: &StockItem, qty: Decimal) -> Result<(), InventoryError> {
    if item.qty < qty {
        return Err(InventoryError::NegativeStock {
            sku: item.sku.clone(),
            available: item.qty,
            requested: qty,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(qty: Decimal, avg_cost: Decimal) -> StockItem {
        StockItem {
            sku: "STK-1".into(),
            qty,
            avg_cost,
        }
    }

    #[test]
    fn test_weighted_average_sequence() {
        let empty = item(dec!(0), dec!(0));
        let first = CostingEngine::inbound(&empty, dec!(10), dec!(100)).unwrap();
        assert_eq!((first.qty, first.avg_cost), (dec!(10), dec!(100)));

        let second =
            CostingEngine::inbound(&item(first.qty, first.avg_cost), dec!(10), dec!(200)).unwrap();
        assert_eq!((second.qty, second.avg_cost), (dec!(20), dec!(150)));
        assert_eq!(second.movement.unit_cost, dec!(200));
        assert_eq!(second.movement.movement_type, MovementType::In);
    }

    #[test]
    fn test_average_rounds_to_six_places() {
        let applied = CostingEngine::inbound(&item(dec!(2), dec!(1)), dec!(1), dec!(0)).unwrap();
        assert_eq!(applied.avg_cost, dec!(0.666667));
    }

    #[test]
    fn test_outbound_uses_average_snapshot() {
        let applied = CostingEngine::outbound(&item(dec!(10), dec!(20)), dec!(5)).unwrap();
        assert_eq!(applied.qty, dec!(5));
        assert_eq!(applied.avg_cost, dec!(20));
        assert_eq!(applied.movement.unit_cost, dec!(20));
        assert_eq!(applied.movement.value(), dec!(100));
    }

    #[test]
    fn test_outbound_shortfall() {
        let err = CostingEngine::outbound(&item(dec!(10), dec!(20)), dec!(15)).unwrap_err();
        assert_eq!(
            err,
            InventoryError::NegativeStock {
                sku: "STK-1".into(),
                available: dec!(10),
                requested: dec!(15),
            }
        );
    }

    #[test]
    fn test_restock_keeps_average() {
        let applied = CostingEngine::restock(&item(dec!(5), dec!(20)), dec!(5), dec!(35)).unwrap();
        assert_eq!((applied.qty, applied.avg_cost), (dec!(10), dec!(20)));
        assert_eq!(applied.movement.movement_type, MovementType::Return);
        assert_eq!(applied.movement.unit_cost, dec!(35));
    }

    #[test]
    fn test_transfer() {
        let from = WarehouseId::new();
        let to = WarehouseId::new();
        let applied = CostingEngine::transfer(&item(dec!(8), dec!(3)), dec!(2), from, to).unwrap();
        assert_eq!(applied.qty, dec!(6));
        assert_eq!(applied.avg_cost, dec!(3));
        assert_eq!(applied.movement.warehouse_id, Some(from));
        assert_eq!(applied.movement.to_warehouse_id, Some(to));
    }

    #[test]
    fn test_transfer_same_warehouse() {
        let wh = WarehouseId::new();
        assert_eq!(
            CostingEngine::transfer(&item(dec!(8), dec!(3)), dec!(2), wh, wh),
            Err(InventoryError::SameWarehouse)
        );
    }

    #[test]
    fn test_transfer_shortfall() {
        let result =
            CostingEngine::transfer(&item(dec!(1), dec!(3)), dec!(2), WarehouseId::new(), WarehouseId::new());
        assert!(matches!(result, Err(InventoryError::NegativeStock { .. })));
    }

    #[test]
    fn test_reverse_inbound_unwinds_average() {
        let applied =
            CostingEngine::reverse_inbound(&item(dec!(20), dec!(150)), dec!(10), dec!(200)).unwrap();
        assert_eq!((applied.qty, applied.avg_cost), (dec!(10), dec!(100)));
        assert_eq!(applied.movement.movement_type, MovementType::Out);
        assert_eq!(applied.movement.unit_cost, dec!(200));
    }

    #[test]
    fn test_reverse_inbound_to_empty_keeps_average() {
        let applied =
            CostingEngine::reverse_inbound(&item(dec!(10), dec!(100)), dec!(10), dec!(100)).unwrap();
        assert_eq!((applied.qty, applied.avg_cost), (dec!(0), dec!(100)));
    }

    #[test]
    fn test_reverse_inbound_floors_at_zero() {
        // Remaining stock was issued cheaper than the receipt being undone.
        let applied =
            CostingEngine::reverse_inbound(&item(dec!(10), dec!(10)), dec!(5), dec!(50)).unwrap();
        assert_eq!(applied.avg_cost, dec!(0));
    }

    #[test]
    fn test_opening() {
        let applied = CostingEngine::opening(dec!(10), dec!(20)).unwrap();
        assert_eq!((applied.qty, applied.avg_cost), (dec!(10), dec!(20)));
        assert_eq!(applied.movement.movement_type, MovementType::Adjust);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let stock = item(dec!(10), dec!(1));
        assert_eq!(
            CostingEngine::outbound(&stock, dec!(0)),
            Err(InventoryError::NonPositiveQuantity(dec!(0)))
        );
        assert_eq!(
            CostingEngine::inbound(&stock, dec!(1), dec!(-1)),
            Err(InventoryError::NegativeUnitCost(dec!(-1)))
        );
    }
}
