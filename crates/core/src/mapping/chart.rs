//! Default chart of accounts.

use crate::ledger::AccountType;

/// An account the seed step guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAccount {
    /// Account code.
    pub code: &'static str,
    /// Account name.
    pub name: &'static str,
    /// Account type.
    pub account_type: AccountType,
}

const fn account(code: &'static str, name: &'static str, account_type: AccountType) -> DefaultAccount {
    DefaultAccount {
        code,
        name,
        account_type,
    }
}

/// Accounts seeded into an empty ledger.
pub const DEFAULT_ACCOUNTS: &[DefaultAccount] = &[
    account("100", "Kasa", AccountType::Asset),
    account("102", "Bankalar", AccountType::Asset),
    account("120", "Alıcılar", AccountType::Asset),
    account("153", "Ticari Mallar", AccountType::Asset),
    account("191", "İndirilecek KDV", AccountType::Vat),
    account("320", "Satıcılar", AccountType::Liability),
    account("391", "Hesaplanan KDV", AccountType::Vat),
    account("600", "Yurtiçi Satışlar", AccountType::Income),
    account("620", "Satılan Malın Maliyeti", AccountType::Expense),
    account("770", "Genel Yönetim Giderleri", AccountType::Expense),
];

/// Default warehouse code and name.
pub const DEFAULT_WAREHOUSE: (&str, &str) = ("D01", "Ana Depo");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_unique() {
        let codes: HashSet<_> = DEFAULT_ACCOUNTS.iter().map(|a| a.code).collect();
        assert_eq!(codes.len(), DEFAULT_ACCOUNTS.len());
    }

    #[test]
    fn test_vat_accounts() {
        let vat: Vec<_> = DEFAULT_ACCOUNTS
            .iter()
            .filter(|a| a.account_type == AccountType::Vat)
            .map(|a| a.code)
            .collect();
        assert_eq!(vat, ["191", "391"]);
    }
}
