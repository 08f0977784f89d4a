//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur while posting, resolving
//! account mappings, checking the period lock, and voiding vouchers.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Voucher must have at least 2 lines.
    #[error("Voucher must have at least 2 lines")]
    InsufficientLines,

    /// Voucher is not balanced (debits != credits).
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}")]
    VoucherUnbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount must be strictly positive.
    #[error("Line amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Generic validation failure with a business reason.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== Account Errors ==========
    /// Account code does not exist in the chart of accounts.
    #[error("Account not found: {0}")]
    UnknownAccount(String),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    InactiveAccount(String),

    /// Account already carries posted lines and cannot be changed.
    #[error("Account {0} is referenced by journal lines and cannot be changed")]
    AccountInUse(String),

    /// Account code already exists.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// No mapping for the key and no fallback given.
    #[error("MAPPING_MISSING:{0}")]
    MappingMissing(String),

    // ========== Period Errors ==========
    /// The voucher date falls in a closed fiscal period.
    #[error("Fiscal period {0} is closed")]
    PeriodLocked(String),

    // ========== Voucher State Errors ==========
    /// Voucher code already used.
    #[error("Voucher code already exists: {0}")]
    DuplicateVoucherCode(String),

    /// Voucher or document is already void.
    #[error("{0} is already void")]
    AlreadyVoid(Uuid),

    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(Uuid),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::VoucherUnbalanced { .. } => "VOUCHER_UNBALANCED",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnknownAccount(_) => "ACCOUNT_NOT_FOUND",
            Self::InactiveAccount(_) => "ACCOUNT_INACTIVE",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::MappingMissing(_) => "MAPPING_MISSING",
            Self::PeriodLocked(_) => "PERIOD_LOCKED",
            Self::DuplicateVoucherCode(_) => "DUPLICATE_VOUCHER_CODE",
            Self::AlreadyVoid(_) => "ALREADY_VOID",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::VoucherUnbalanced { .. }
            | Self::NonPositiveAmount(_)
            | Self::Validation(_)
            | Self::InactiveAccount(_)
            | Self::MappingMissing(_) => 400,

            // 404 Not Found
            Self::UnknownAccount(_) | Self::VoucherNotFound(_) => 404,

            // 409 Conflict - state errors
            Self::AccountInUse(_)
            | Self::DuplicateAccountCode(_)
            | Self::DuplicateVoucherCode(_)
            | Self::AlreadyVoid(_) => 409,

            // 423 Locked
            Self::PeriodLocked(_) => 423,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::VoucherUnbalanced {
                debit: Decimal::new(100, 2),
                credit: Decimal::new(50, 2),
            }
            .error_code(),
            "VOUCHER_UNBALANCED"
        );
        assert_eq!(
            LedgerError::PeriodLocked("2026-01".into()).error_code(),
            "PERIOD_LOCKED"
        );
        assert_eq!(LedgerError::AlreadyVoid(Uuid::nil()).error_code(), "ALREADY_VOID");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(LedgerError::UnknownAccount("999".into()).http_status_code(), 404);
        assert_eq!(
            LedgerError::DuplicateVoucherCode("SAL-0001".into()).http_status_code(),
            409
        );
        assert_eq!(LedgerError::PeriodLocked("2026-01".into()).http_status_code(), 423);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::VoucherUnbalanced {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Voucher is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::MappingMissing("sales.revenue".into());
        assert_eq!(err.to_string(), "MAPPING_MISSING:sales.revenue");
    }
}
