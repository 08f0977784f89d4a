//! Reversal service for voiding posted vouchers.

use uuid::Uuid;

use crate::ledger::{VoucherLine, VoucherTotals};

/// Input for reversing one posted voucher.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// The voucher being reversed.
    pub original_voucher_id: Uuid,
    /// Its code.
    pub original_code: String,
    /// Its source type, e.g. `sale` or `cogs`.
    pub original_source_type: String,
    /// Its lines.
    pub original_lines: Vec<VoucherLine>,
    /// Why the source document is being voided.
    pub void_reason: Option<String>,
}

/// A ready-to-post reversal voucher.
#[derive(Debug, Clone)]
pub struct ReversalOutput {
    /// Code of the reversal voucher.
    pub code: String,
    /// Source type of the reversal voucher.
    pub source_type: String,
    /// Swapped lines.
    pub lines: Vec<VoucherLine>,
    /// Human-readable description.
    pub description: String,
}

/// Stateless service for creating reversing lines.
pub struct ReversalService;

impl ReversalService {
    /// Creates the reversal of a voucher.
    ///
    /// For each original line the side is swapped; account and amount are
    /// kept and the description is prefixed with `Reversal: `.
    #[must_use]
    pub fn create_reversal(input: &ReversalInput) -> ReversalOutput {
        let lines = input
            .original_lines
            .iter()
            .map(|line| VoucherLine {
                account_code: line.account_code.clone(),
                dc: line.dc.opposite(),
                amount: line.amount,
                description: Some(format!(
                    "Reversal: {}",
                    line.description.as_deref().unwrap_or_default()
                )),
            })
            .collect();

        let mut description = format!("Reversal of voucher {}", input.original_code);
        if let Some(reason) = input.void_reason.as_deref().filter(|r| !r.is_empty()) {
            description.push_str(". Reason: ");
            description.push_str(reason);
        }

        ReversalOutput {
            code: Self::reversal_code(&input.original_code),
            source_type: Self::reversal_source_type(&input.original_source_type),
            lines,
            description,
        }
    }

    /// Code of the voucher reversing `code`.
    #[must_use]
    pub fn reversal_code(code: &str) -> String {
        format!("REV-{code}")
    }

    /// Source type of the voucher reversing one of `source_type`.
    #[must_use]
    pub fn reversal_source_type(source_type: &str) -> String {
        format!("{source_type}_reversal")
    }

    /// Whether the original lines balance exactly.
    ///
    /// Always true for posted vouchers; checked again before a reversal is
    /// posted so a corrupted voucher is not mirrored.
    #[must_use]
    pub fn validate_reversal(original_lines: &[VoucherLine]) -> bool {
        let totals = VoucherTotals::of(original_lines);
        totals.debit == totals.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Dc;
    use rust_decimal_macros::dec;

    fn sale_lines() -> Vec<VoucherLine> {
        vec![
            VoucherLine::debit("120", dec!(59)).with_description("Receivable"),
            VoucherLine::credit("600", dec!(50)),
            VoucherLine::credit("391", dec!(9)),
        ]
    }

    fn input(lines: Vec<VoucherLine>) -> ReversalInput {
        ReversalInput {
            original_voucher_id: Uuid::nil(),
            original_code: "SAL-0001".into(),
            original_source_type: "sale".into(),
            original_lines: lines,
            void_reason: Some("Duplicate entry".into()),
        }
    }

    #[test]
    fn test_create_reversal_swaps_sides() {
        let output = ReversalService::create_reversal(&input(sale_lines()));

        assert_eq!(output.lines.len(), 3);
        assert_eq!(output.lines[0].dc, Dc::Credit);
        assert_eq!(output.lines[1].dc, Dc::Debit);
        assert_eq!(output.lines[2].dc, Dc::Debit);
        assert_eq!(output.lines[0].description.as_deref(), Some("Reversal: Receivable"));
    }

    #[test]
    fn test_create_reversal_preserves_accounts_and_amounts() {
        let original = sale_lines();
        let output = ReversalService::create_reversal(&input(original.clone()));

        for (o, r) in original.iter().zip(&output.lines) {
            assert_eq!(o.account_code, r.account_code);
            assert_eq!(o.amount, r.amount);
        }
    }

    #[test]
    fn test_codes() {
        let output = ReversalService::create_reversal(&input(sale_lines()));
        assert_eq!(output.code, "REV-SAL-0001");
        assert_eq!(output.source_type, "sale_reversal");
        assert_eq!(
            output.description,
            "Reversal of voucher SAL-0001. Reason: Duplicate entry"
        );
    }

    #[test]
    fn test_description_without_reason() {
        let mut reversal = input(sale_lines());
        reversal.void_reason = None;
        let output = ReversalService::create_reversal(&reversal);
        assert_eq!(output.description, "Reversal of voucher SAL-0001");
    }

    #[test]
    fn test_validate_reversal() {
        assert!(ReversalService::validate_reversal(&sale_lines()));
        assert!(!ReversalService::validate_reversal(&[
            VoucherLine::debit("100", dec!(100)),
            VoucherLine::credit("600", dec!(50)),
        ]));
    }
}
