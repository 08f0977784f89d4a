//! Customers and suppliers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Role a party plays towards the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    /// Buys from us.
    Customer,
    /// Sells to us.
    Supplier,
    /// Both.
    Both,
}

impl PartyType {
    /// Stored name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
            Self::Both => "both",
        }
    }

    /// Whether a party of this type may act in `role`.
    #[must_use]
    pub fn covers(self, role: Self) -> bool {
        self == Self::Both || self == role
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "supplier" => Ok(Self::Supplier),
            "both" => Ok(Self::Both),
            other => Err(LedgerError::Validation(format!("unknown party type: {other}"))),
        }
    }
}

/// Whether adding `amount` to an open balance of `exposure` stays within
/// `limit`. A zero limit means the party is not limited.
#[must_use]
pub fn within_risk_limit(limit: Decimal, exposure: Decimal, amount: Decimal) -> bool {
    limit.is_zero() || exposure + amount <= limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_both_covers_either_role() {
        assert!(PartyType::Both.covers(PartyType::Customer));
        assert!(PartyType::Both.covers(PartyType::Supplier));
        assert!(PartyType::Customer.covers(PartyType::Customer));
        assert!(!PartyType::Customer.covers(PartyType::Supplier));
        assert!(!PartyType::Supplier.covers(PartyType::Customer));
    }

    #[test]
    fn test_parse() {
        assert_eq!("both".parse::<PartyType>().unwrap(), PartyType::Both);
        assert!("vendor".parse::<PartyType>().is_err());
    }

    #[test]
    fn test_risk_limit() {
        assert!(within_risk_limit(dec!(0), dec!(1000000), dec!(5)));
        assert!(within_risk_limit(dec!(100), dec!(60), dec!(40)));
        assert!(!within_risk_limit(dec!(100), dec!(60), dec!(40.01)));
    }
}
