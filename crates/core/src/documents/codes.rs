//! Sequential document codes.

/// Highest numeric suffix among codes of the form `PREFIX-NNNN`, or zero.
///
/// Codes with other prefixes or non-numeric suffixes are ignored. Used to
/// start a code counter on a book that already has documents.
pub fn highest_number<'a, I>(prefix: &str, existing: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .filter_map(|code| code.strip_prefix(prefix)?.strip_prefix('-'))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

/// `PREFIX-NNNN`, zero-padded to four digits.
#[must_use]
pub fn format_code(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number:04}")
}

/// Code of the cost-of-goods voucher belonging to document `code`.
#[must_use]
pub fn cogs_voucher_code(code: &str) -> String {
    format!("COGS-{code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_starts_at_zero() {
        assert_eq!(highest_number("SAL", []), 0);
        assert_eq!(format_code("SAL", 1), "SAL-0001");
    }

    #[test]
    fn test_highest_suffix_wins() {
        let existing = ["SAL-0002", "SAL-0010", "SAL-0003"];
        assert_eq!(highest_number("SAL", existing), 10);
    }

    #[test]
    fn test_ignores_other_prefixes_and_junk() {
        let existing = ["PUR-0099", "SAL-abc", "SALE-0005", "SAL-0004"];
        assert_eq!(highest_number("SAL", existing), 4);
    }

    #[test]
    fn test_order_prefixes_do_not_collide() {
        assert_eq!(highest_number("PO", ["PO-0007", "SO-0009", "PUR-0011"]), 7);
    }

    #[test]
    fn test_grows_past_four_digits() {
        assert_eq!(format_code("EXP", 10_000), "EXP-10000");
    }

    #[test]
    fn test_cogs_code() {
        assert_eq!(cogs_voucher_code("SAL-0001"), "COGS-SAL-0001");
    }
}
