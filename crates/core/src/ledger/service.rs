//! Ledger service for voucher validation.
//!
//! Pure checks run before a voucher is persisted. Account lookups are passed
//! in as a closure so the persistence layer can serve them from a preloaded map.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{VoucherLine, VoucherStatus, VoucherTotals};
use super::validation::validate_lines;

/// Information about an account needed for validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account code.
    pub code: String,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Ledger service for voucher validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates a voucher before persisting.
    ///
    /// 1. Validates line count, amounts and balance
    /// 2. Validates every referenced account exists and is active
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn validate_voucher<A>(
        lines: &[VoucherLine],
        tolerance: Decimal,
        account_lookup: A,
    ) -> Result<VoucherTotals, LedgerError>
    where
        A: Fn(&str) -> Option<AccountInfo>,
    {
        let totals = validate_lines(lines, tolerance)?;

        for line in lines {
            let account = account_lookup(&line.account_code)
                .ok_or_else(|| LedgerError::UnknownAccount(line.account_code.clone()))?;
            if !account.is_active {
                return Err(LedgerError::InactiveAccount(account.code));
            }
        }

        Ok(totals)
    }

    /// Validates that a voucher in `status` may be voided.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyVoid` for a void voucher.
    pub fn validate_can_void(
        voucher_id: uuid::Uuid,
        status: VoucherStatus,
    ) -> Result<(), LedgerError> {
        match status {
            VoucherStatus::Posted => Ok(()),
            VoucherStatus::Void => Err(LedgerError::AlreadyVoid(voucher_id)),
        }
    }
}
