//! Business rule validation for voucher lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{VoucherLine, VoucherTotals};

/// Default balance tolerance: `|Σ D − Σ C|` may not exceed 0.00001.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 5);

/// Validates the shape and balance of a set of voucher lines.
///
/// Checks, in order: at least two lines, every amount strictly positive,
/// every account code non-blank, debits equal credits within `tolerance`.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_lines(
    lines: &[VoucherLine],
    tolerance: Decimal,
) -> Result<VoucherTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    for line in lines {
        if line.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(line.amount));
        }
        if line.account_code.trim().is_empty() {
            return Err(LedgerError::Validation("line account code is blank".into()));
        }
    }

    let totals = VoucherTotals::of(lines);
    if !totals.is_balanced(tolerance) {
        return Err(LedgerError::VoucherUnbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

/// Drops lines whose amount rounds to zero, e.g. a 0% VAT line.
#[must_use]
pub fn without_zero_lines(lines: Vec<VoucherLine>) -> Vec<VoucherLine> {
    lines.into_iter().filter(|l| !l.amount.is_zero()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.00001));
    }

    #[test]
    fn test_balanced_lines() {
        let lines = vec![
            VoucherLine::debit("100", dec!(100.00)),
            VoucherLine::credit("600", dec!(100.00)),
        ];
        let totals = validate_lines(&lines, BALANCE_TOLERANCE).unwrap();
        assert_eq!(totals.debit, dec!(100.00));
    }

    #[test]
    fn test_unbalanced_lines() {
        let lines = vec![
            VoucherLine::debit("100", dec!(100.00)),
            VoucherLine::credit("600", dec!(50.00)),
        ];
        assert_eq!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::VoucherUnbalanced {
                debit: dec!(100.00),
                credit: dec!(50.00),
            })
        );
    }

    #[test]
    fn test_single_line() {
        let lines = vec![VoucherLine::debit("100", dec!(1))];
        assert_eq!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::InsufficientLines)
        );
    }

    #[test]
    fn test_zero_amount() {
        let lines = vec![
            VoucherLine::debit("100", dec!(0)),
            VoucherLine::credit("600", dec!(0)),
        ];
        assert!(matches!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_blank_account() {
        let lines = vec![
            VoucherLine::debit(" ", dec!(5)),
            VoucherLine::credit("600", dec!(5)),
        ];
        assert!(matches!(
            validate_lines(&lines, BALANCE_TOLERANCE),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_within_tolerance() {
        let lines = vec![
            VoucherLine::debit("100", dec!(10.000004)),
            VoucherLine::credit("600", dec!(10)),
        ];
        assert!(validate_lines(&lines, BALANCE_TOLERANCE).is_ok());
    }

    #[test]
    fn test_without_zero_lines() {
        let lines = vec![
            VoucherLine::debit("120", dec!(50)),
            VoucherLine::credit("600", dec!(50)),
            VoucherLine::credit("391", dec!(0.00)),
        ];
        let kept = without_zero_lines(lines);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|l| l.account_code != "391"));
    }
}
