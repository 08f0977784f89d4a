//! Core business logic for Mizan.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the `mizan-db`
//! crate wraps them in transactions.
//!
//! # Modules
//!
//! - `ledger` - Double-entry voucher validation
//! - `fiscal` - Monthly period keys for the period lock
//! - `inventory` - Weighted-average costing math
//! - `reversal` - Debit/credit swap for void postings
//! - `mapping` - Symbolic account keys and the default chart of accounts
//! - `documents` - Source document pricing and code numbering
//! - `integrity` - Invariant checks shared by health scans and restores

pub mod documents;
pub mod fiscal;
pub mod integrity;
pub mod inventory;
pub mod ledger;
pub mod mapping;
pub mod reversal;
