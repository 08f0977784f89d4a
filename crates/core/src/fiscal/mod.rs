//! Fiscal period keys for the posting lock.

pub mod period;

pub use period::{FiscalPeriodState, PeriodKey};
