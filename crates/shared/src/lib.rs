//! Shared types and infrastructure for Mizan.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Configuration management
//! - Token-keyed session store with TTL
//! - Publish/subscribe event bus for committed business events

pub mod config;
pub mod events;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use events::{EventBus, LedgerEvent};
pub use session::{Session, SessionStore};
pub use types::Actor;
