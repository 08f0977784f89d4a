//! Mapping keys and resolution.

use crate::ledger::LedgerError;

/// Mapping keys used by the document services.
pub struct MappingKey;

impl MappingKey {
    /// Customer receivables.
    pub const SALES_RECEIVABLE: &'static str = "sales.receivable";
    /// Sales revenue.
    pub const SALES_REVENUE: &'static str = "sales.revenue";
    /// Output VAT on sales.
    pub const SALES_VAT: &'static str = "sales.vat";
    /// Cost of goods sold.
    pub const SALES_COGS: &'static str = "sales.cogs";
    /// Cash on hand.
    pub const CASH: &'static str = "cash.main";
    /// Bank accounts.
    pub const BANK: &'static str = "bank.main";
    /// Merchandise stock.
    pub const INVENTORY_STOCK: &'static str = "inventory.stock";
    /// Supplier payables.
    pub const PURCHASE_VENDOR: &'static str = "purchase.vendor";
    /// Input VAT on purchases.
    pub const PURCHASE_VAT: &'static str = "purchase.vat";
    /// General expenses.
    pub const EXPENSE: &'static str = "expense.main";

    /// The code a key falls back to when no mapping is stored.
    #[must_use]
    pub fn default_code(key: &str) -> Option<&'static str> {
        DEFAULT_MAPPINGS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| *code)
    }
}

/// Mappings seeded into an empty ledger.
pub const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    (MappingKey::SALES_RECEIVABLE, "120"),
    (MappingKey::SALES_REVENUE, "600"),
    (MappingKey::SALES_VAT, "391"),
    (MappingKey::SALES_COGS, "620"),
    (MappingKey::CASH, "100"),
    (MappingKey::BANK, "102"),
    (MappingKey::INVENTORY_STOCK, "153"),
    (MappingKey::PURCHASE_VENDOR, "320"),
    (MappingKey::PURCHASE_VAT, "191"),
    (MappingKey::EXPENSE, "770"),
];

/// Resolves a key given the stored mapping (if any) and an explicit fallback.
///
/// The stored mapping wins; without one the fallback is used; with neither
/// the key is reported missing.
///
/// # Errors
///
/// `MappingMissing` when there is neither a stored mapping nor a fallback.
pub fn resolve_mapping(
    key: &str,
    stored: Option<String>,
    fallback: Option<&str>,
) -> Result<String, LedgerError> {
    stored
        .or_else(|| fallback.map(str::to_string))
        .ok_or_else(|| LedgerError::MappingMissing(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MappingKey::SALES_RECEIVABLE, "120")]
    #[case(MappingKey::SALES_COGS, "620")]
    #[case(MappingKey::PURCHASE_VAT, "191")]
    #[case(MappingKey::EXPENSE, "770")]
    fn test_default_codes(#[case] key: &str, #[case] code: &str) {
        assert_eq!(MappingKey::default_code(key), Some(code));
    }

    #[test]
    fn test_unknown_key_has_no_default() {
        assert_eq!(MappingKey::default_code("payroll.main"), None);
    }

    #[test]
    fn test_stored_mapping_wins() {
        let code = resolve_mapping("sales.revenue", Some("601".into()), Some("600")).unwrap();
        assert_eq!(code, "601");
    }

    #[test]
    fn test_fallback_used() {
        let code = resolve_mapping("sales.revenue", None, Some("600")).unwrap();
        assert_eq!(code, "600");
    }

    #[test]
    fn test_missing() {
        let err = resolve_mapping("sales.revenue", None, None).unwrap_err();
        assert_eq!(err, LedgerError::MappingMissing("sales.revenue".into()));
        assert_eq!(err.to_string(), "MAPPING_MISSING:sales.revenue");
    }
}
