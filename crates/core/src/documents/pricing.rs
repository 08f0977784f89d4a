//! Line pricing with VAT.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Rounds a money amount to two places using banker's rounding.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Quantity, price and VAT rate of one document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLine {
    /// Quantity, strictly positive.
    pub qty: Decimal,
    /// Net unit price.
    pub unit_price: Decimal,
    /// VAT rate as a fraction, e.g. `0.18`.
    pub vat_rate: Decimal,
}

/// Money amounts of a priced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineAmounts {
    /// Net amount, `qty × unit_price` rounded.
    pub net: Decimal,
    /// VAT amount, `net × vat_rate` rounded.
    pub vat: Decimal,
    /// Net plus VAT.
    pub gross: Decimal,
}

impl PriceLine {
    /// Validates the line.
    ///
    /// # Errors
    ///
    /// Validation error for a non-positive quantity, a negative price, or a VAT
    /// rate outside `0..=1`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.qty <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "line quantity must be positive, got {}",
                self.qty
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "unit price cannot be negative, got {}",
                self.unit_price
            )));
        }
        if self.vat_rate < Decimal::ZERO || self.vat_rate > Decimal::ONE {
            return Err(LedgerError::Validation(format!(
                "VAT rate must be between 0 and 1, got {}",
                self.vat_rate
            )));
        }
        Ok(())
    }

    /// Prices the line.
    #[must_use]
    pub fn amounts(&self) -> LineAmounts {
        let net = round_money(self.qty * self.unit_price);
        let vat = round_money(net * self.vat_rate);
        LineAmounts {
            net,
            vat,
            gross: net + vat,
        }
    }
}

/// Totals across all lines of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line nets.
    pub net: Decimal,
    /// Sum of line VAT.
    pub vat: Decimal,
    /// Sum of line grosses.
    pub gross: Decimal,
}

impl DocumentTotals {
    /// Adds a line.
    pub fn add(&mut self, line: LineAmounts) {
        self.net += line.net;
        self.vat += line.vat;
        self.gross += line.gross;
    }

    /// Totals of a set of lines.
    pub fn of<I: IntoIterator<Item = LineAmounts>>(lines: I) -> Self {
        let mut totals = Self::default();
        for line in lines {
            totals.add(line);
        }
        totals
    }
}
