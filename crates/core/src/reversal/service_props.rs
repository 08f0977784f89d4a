//! Property-based tests for ReversalService.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::{ReversalInput, ReversalService};
use crate::ledger::{Dc, VoucherLine, VoucherTotals};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_code() -> impl Strategy<Value = String> {
    "[1-7][0-9]{2}"
}

/// Balanced voucher: several debits against one credit.
fn arb_balanced_lines() -> impl Strategy<Value = Vec<VoucherLine>> {
    (
        prop::collection::vec((arb_code(), arb_amount()), 1..5),
        arb_code(),
        prop::option::of("[a-zA-Z ]{0,20}"),
    )
        .prop_map(|(debits, credit_code, memo)| {
            let total: Decimal = debits.iter().map(|(_, a)| *a).sum();
            let mut lines: Vec<VoucherLine> = debits
                .into_iter()
                .map(|(code, amount)| VoucherLine {
                    account_code: code,
                    dc: Dc::Debit,
                    amount,
                    description: memo.clone(),
                })
                .collect();
            lines.push(VoucherLine::credit(credit_code, total));
            lines
        })
}

fn reverse(lines: &[VoucherLine]) -> Vec<VoucherLine> {
    ReversalService::create_reversal(&ReversalInput {
        original_voucher_id: Uuid::new_v4(),
        original_code: "PUR-0001".into(),
        original_source_type: "purchase".into(),
        original_lines: lines.to_vec(),
        void_reason: None,
    })
    .lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every reversal line is the exact swap of its original.
    #[test]
    fn prop_lines_are_exact_swap(lines in arb_balanced_lines()) {
        let reversed = reverse(&lines);
        prop_assert_eq!(reversed.len(), lines.len());

        for (original, swapped) in lines.iter().zip(&reversed) {
            prop_assert_eq!(&original.account_code, &swapped.account_code);
            prop_assert_eq!(original.amount, swapped.amount);
            prop_assert_eq!(original.dc.opposite(), swapped.dc);
        }
    }

    /// A balanced voucher reverses into a balanced voucher with mirrored totals.
    #[test]
    fn prop_reversal_totals_mirror(lines in arb_balanced_lines()) {
        prop_assert!(ReversalService::validate_reversal(&lines));

        let before = VoucherTotals::of(&lines);
        let after = VoucherTotals::of(&reverse(&lines));
        prop_assert_eq!(before.debit, after.credit);
        prop_assert_eq!(before.credit, after.debit);
    }

    /// Reversing twice gives back the original sides.
    #[test]
    fn prop_double_reversal_restores_sides(lines in arb_balanced_lines()) {
        let twice = reverse(&reverse(&lines));
        for (original, back) in lines.iter().zip(&twice) {
            prop_assert_eq!(original.dc, back.dc);
            prop_assert_eq!(original.amount, back.amount);
        }
    }
}
