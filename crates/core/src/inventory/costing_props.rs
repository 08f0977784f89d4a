//! Property-based tests for weighted-average costing.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::costing::CostingEngine;
use super::error::InventoryError;
use super::types::{MovementType, StockItem};

fn qty() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(Decimal::from)
}

fn cost() -> impl Strategy<Value = Decimal> {
    // 0.00 to 10,000.00
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn item(qty: Decimal, avg_cost: Decimal) -> StockItem {
    StockItem {
        sku: "P".into(),
        qty,
        avg_cost,
    }
}

/// A movement applied to a stock level, for random sequences.
#[derive(Debug, Clone)]
enum Op {
    Receive(Decimal, Decimal),
    Issue(Decimal),
    Restock(Decimal, Decimal),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (qty(), cost()).prop_map(|(q, c)| Op::Receive(q, c)),
        qty().prop_map(Op::Issue),
        (qty(), cost()).prop_map(|(q, c)| Op::Restock(q, c)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The average after receipts lies between the cheapest and dearest receipt.
    #[test]
    fn prop_average_bounded_by_receipt_costs(
        receipts in prop::collection::vec((qty(), cost()), 1..10),
    ) {
        let mut level = item(Decimal::ZERO, Decimal::ZERO);
        for (q, c) in &receipts {
            let applied = CostingEngine::inbound(&level, *q, *c).unwrap();
            level = item(applied.qty, applied.avg_cost);
        }

        let min = receipts.iter().map(|(_, c)| *c).min().unwrap();
        let max = receipts.iter().map(|(_, c)| *c).max().unwrap();
        // Each receipt rounds the average to six places.
        let slack = Decimal::new(1, 5);
        prop_assert!(level.avg_cost >= min - slack);
        prop_assert!(level.avg_cost <= max + slack);
    }

    /// On-hand quantity equals the signed sum of recorded movements and never
    /// goes negative; rejected issues leave the level untouched.
    #[test]
    fn prop_quantity_matches_movement_log(ops in prop::collection::vec(op(), 1..30)) {
        let mut level = item(Decimal::ZERO, Decimal::ZERO);
        let mut signed_sum = Decimal::ZERO;

        for op in ops {
            let result = match op {
                Op::Receive(q, c) => CostingEngine::inbound(&level, q, c),
                Op::Issue(q) => CostingEngine::outbound(&level, q),
                Op::Restock(q, c) => CostingEngine::restock(&level, q, c),
            };
            match result {
                Ok(applied) => {
                    signed_sum += applied.movement.movement_type.signed(applied.movement.qty);
                    level = item(applied.qty, applied.avg_cost);
                }
                Err(InventoryError::NegativeStock { available, .. }) => {
                    prop_assert_eq!(available, level.qty);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
            prop_assert!(level.qty >= Decimal::ZERO);
            prop_assert_eq!(level.qty, signed_sum);
        }
    }

    /// Issuing never changes the average.
    #[test]
    fn prop_outbound_keeps_average(on_hand in qty(), avg in cost(), take in qty()) {
        prop_assume!(take <= on_hand);
        let applied = CostingEngine::outbound(&item(on_hand, avg), take).unwrap();
        prop_assert_eq!(applied.avg_cost, avg);
        prop_assert_eq!(applied.movement.movement_type, MovementType::Out);
        prop_assert_eq!(applied.movement.unit_cost, avg);
    }

    /// Undoing a receipt right after it restores the previous level.
    #[test]
    fn prop_reverse_inbound_restores_level(
        on_hand in qty(),
        avg in (0i64..10_000i64).prop_map(Decimal::from),
        received in qty(),
        unit_cost in (0i64..10_000i64).prop_map(Decimal::from),
    ) {
        let before = item(on_hand, avg);
        let after = CostingEngine::inbound(&before, received, unit_cost).unwrap();
        let undone = CostingEngine::reverse_inbound(
            &item(after.qty, after.avg_cost),
            received,
            unit_cost,
        )
        .unwrap();

        prop_assert_eq!(undone.qty, on_hand);
        // The six-place rounding of the blended average is amplified by the
        // ratio of total to remaining stock when it is taken back out.
        let ratio = after.qty / on_hand;
        let slack = Decimal::new(1, 6) * ratio;
        prop_assert!((undone.avg_cost - avg).abs() <= slack);
    }
}
