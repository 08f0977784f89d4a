//! Ledger domain types for voucher creation and validation.
//!
//! This module defines the core types used for building and validating
//! journal vouchers in the double-entry bookkeeping system.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of a journal line: debit or credit.
///
/// Stored as the single letters `D` and `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dc {
    /// Debit side.
    #[serde(rename = "D")]
    Debit,
    /// Credit side.
    #[serde(rename = "C")]
    Credit,
}

impl Dc {
    /// The opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Stored letter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "D",
            Self::Credit => "C",
        }
    }
}

impl fmt::Display for Dc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account classification in the fixed chart-of-accounts model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (cash, bank, receivables, stock).
    Asset,
    /// Liability account (payables).
    Liability,
    /// Equity account.
    Equity,
    /// Income account (sales).
    Income,
    /// Expense account (cost of goods, overheads).
    Expense,
    /// VAT account, input or output.
    Vat,
}

impl AccountType {
    /// Stored name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Vat => "vat",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "vat" => Ok(Self::Vat),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Voucher lifecycle status. The only transition is `Posted -> Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is on the books.
    Posted,
    /// Voucher has been reversed by another voucher.
    Void,
}

/// A single line of a voucher to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    /// Account code the line posts to.
    pub account_code: String,
    /// Debit or credit.
    pub dc: Dc,
    /// Line amount, strictly positive.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
}

impl VoucherLine {
    /// Debit line.
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            dc: Dc::Debit,
            amount,
            description: None,
        }
    }

    /// Credit line.
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            dc: Dc::Credit,
            amount,
            description: None,
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for posting a voucher.
#[derive(Debug, Clone)]
pub struct PostVoucherInput {
    /// Unique voucher code.
    pub code: String,
    /// Originating document type, e.g. `sale` or `cogs`.
    pub source_type: String,
    /// Originating document id.
    pub source_id: Option<Uuid>,
    /// Accounting date. Defaults to today when absent.
    pub voucher_date: Option<NaiveDate>,
    /// Voucher lines (at least 2).
    pub lines: Vec<VoucherLine>,
}

impl PostVoucherInput {
    /// Convenience constructor.
    pub fn new(
        code: impl Into<String>,
        source_type: impl Into<String>,
        source_id: Option<Uuid>,
        voucher_date: Option<NaiveDate>,
        lines: Vec<VoucherLine>,
    ) -> Self {
        Self {
            code: code.into(),
            source_type: source_type.into(),
            source_id,
            voucher_date,
            lines,
        }
    }
}

/// Debit and credit totals of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoucherTotals {
    /// Sum of debit lines.
    pub debit: Decimal,
    /// Sum of credit lines.
    pub credit: Decimal,
}

impl VoucherTotals {
    /// Sums the lines per side.
    #[must_use]
    pub fn of(lines: &[VoucherLine]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            match line.dc {
                Dc::Debit => acc.debit += line.amount,
                Dc::Credit => acc.credit += line.amount,
            }
            acc
        })
    }

    /// Absolute difference between the sides.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Whether the sides agree within `tolerance`.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        self.difference() <= tolerance
    }
}
