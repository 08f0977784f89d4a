//! Property-based tests for voucher line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{Dc, VoucherLine, VoucherTotals};
use super::validation::{validate_lines, BALANCE_TOLERANCE};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn dc_strategy() -> impl Strategy<Value = Dc> {
    prop_oneof![Just(Dc::Debit), Just(Dc::Credit)]
}

fn line(dc: Dc, amount: Decimal) -> VoucherLine {
    VoucherLine {
        account_code: "100".to_string(),
        dc,
        amount,
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any voucher that passes validation balances within the tolerance.
    #[test]
    fn prop_accepted_vouchers_balance(
        sides in prop::collection::vec((dc_strategy(), positive_amount()), 2..8),
    ) {
        let lines: Vec<_> = sides.into_iter().map(|(dc, a)| line(dc, a)).collect();
        if let Ok(totals) = validate_lines(&lines, BALANCE_TOLERANCE) {
            prop_assert!(totals.difference() <= BALANCE_TOLERANCE);
            prop_assert_eq!(totals, VoucherTotals::of(&lines));
        }
    }

    /// Splitting one debit against a single credit always balances.
    #[test]
    fn prop_split_debits_accepted(
        debits in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let total: Decimal = debits.iter().copied().sum();
        let mut lines: Vec<_> = debits.into_iter().map(|a| line(Dc::Debit, a)).collect();
        lines.push(line(Dc::Credit, total));

        prop_assert!(validate_lines(&lines, BALANCE_TOLERANCE).is_ok());
    }

    /// A one-cent skew is always rejected.
    #[test]
    fn prop_skew_rejected(amount in positive_amount()) {
        let lines = vec![
            line(Dc::Debit, amount + Decimal::new(1, 2)),
            line(Dc::Credit, amount),
        ];
        let rejected = matches!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::VoucherUnbalanced { .. })
        );
        prop_assert!(rejected);
    }

    /// Non-positive amounts are rejected regardless of balance.
    #[test]
    fn prop_non_positive_rejected(amount in positive_amount(), dc in dc_strategy()) {
        let lines = vec![line(dc, -amount), line(dc.opposite(), -amount)];
        let rejected = matches!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::NonPositiveAmount(_))
        );
        prop_assert!(rejected);
    }

    /// Single-line vouchers are rejected.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount(), dc in dc_strategy()) {
        prop_assert_eq!(
            validate_lines(&[line(dc, amount)], BALANCE_TOLERANCE),
            Err(LedgerError::InsufficientLines)
        );
    }
}
