//! Entity re-exports.

pub use super::account_mappings::Entity as AccountMappings;
pub use super::accounts::Entity as Accounts;
pub use super::audit_events::Entity as AuditEvents;
pub use super::document_lines::Entity as DocumentLines;
pub use super::document_sequences::Entity as DocumentSequences;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::inventory_items::Entity as InventoryItems;
pub use super::inventory_movements::Entity as InventoryMovements;
pub use super::journal_lines::Entity as JournalLines;
pub use super::journal_vouchers::Entity as JournalVouchers;
pub use super::parties::Entity as Parties;
pub use super::source_documents::Entity as SourceDocuments;
pub use super::warehouses::Entity as Warehouses;
