//! Double-entry bookkeeping logic.
//!
//! This module implements the pure half of the posting engine:
//! - Voucher and line types
//! - Business rule validation (line count, positive amounts, balance)
//! - Account checks through an injected lookup
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use service::{AccountInfo, LedgerService};
pub use types::{AccountType, Dc, PostVoucherInput, VoucherLine, VoucherStatus, VoucherTotals};
pub use validation::{BALANCE_TOLERANCE, validate_lines, without_zero_lines};
