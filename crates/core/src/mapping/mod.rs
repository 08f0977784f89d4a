//! Symbolic account keys and the default chart of accounts.
//!
//! Posting code never hard-wires account codes. It asks for a key such as
//! `sales.revenue`; the mapping table decides which account that is, and the
//! defaults here serve as the explicit fallback and the seed data.

pub mod chart;
pub mod keys;

pub use chart::{DEFAULT_ACCOUNTS, DEFAULT_WAREHOUSE, DefaultAccount};
pub use keys::{DEFAULT_MAPPINGS, MappingKey, resolve_mapping};
