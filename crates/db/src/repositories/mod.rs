//! Repository abstractions for data access.
//!
//! Repositories borrow a connection rather than owning one, so the same
//! `DatabaseTransaction` can be handed to several of them inside one unit
//! of work. Each is also usable directly on a `DatabaseConnection`.

pub mod account;
pub mod audit;
pub mod document;
pub mod fiscal;
pub mod inventory;
pub mod ledger;
pub mod mapping;
pub mod party;

pub use account::{AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use audit::{AuditRecord, AuditRepository};
pub use document::{DocumentRepository, DocumentWithLines, NewDocument, NewDocumentLine};
pub use fiscal::FiscalRepository;
pub use inventory::{CreateItemInput, InventoryRepository, MovementSource};
pub use ledger::{LedgerRepository, TrialBalanceRow, VoucherWithLines};
pub use mapping::MappingRepository;
pub use party::{CreatePartyInput, PartyRepository};
