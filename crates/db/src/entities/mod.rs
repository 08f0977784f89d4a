//! `SeaORM` entity definitions.

pub mod prelude;

pub mod account_mappings;
pub mod accounts;
pub mod audit_events;
pub mod document_lines;
pub mod document_sequences;
pub mod fiscal_periods;
pub mod inventory_items;
pub mod inventory_movements;
pub mod journal_lines;
pub mod journal_vouchers;
pub mod parties;
pub mod sea_orm_active_enums;
pub mod source_documents;
pub mod warehouses;
