//! Source documents: sales, purchases, collections, payments, expenses,
//! stock transfers and orders, plus the parties they are raised against.
//!
//! Pure helpers only: document kinds and their lifecycle, line pricing with
//! VAT, and sequential document codes.

pub mod codes;
pub mod party;
pub mod pricing;
pub mod types;

pub use codes::{cogs_voucher_code, format_code, highest_number};
pub use pricing::{DocumentTotals, LineAmounts, PriceLine, round_money};
pub use party::{PartyType, within_risk_limit};
pub use types::{DocumentStatus, DocumentType, PaymentMethod};
