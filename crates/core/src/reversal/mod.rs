//! Reversal postings for void operations.
//!
//! A void never edits a posted voucher. It posts a new voucher whose lines are
//! the exact debit/credit swap of the original's.

pub mod service;

#[cfg(test)]
mod service_props;

pub use service::{ReversalInput, ReversalOutput, ReversalService};
