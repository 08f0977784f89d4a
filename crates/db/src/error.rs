//! Errors surfaced by the persistence layer.
//!
//! Every unit of work returns `EngineError`. Domain failures from
//! `mizan-core` pass through unchanged so callers can match on them; store
//! failures are wrapped as `Database`.

use mizan_core::integrity::HealthReport;
use mizan_core::inventory::InventoryError;
use mizan_core::ledger::LedgerError;
use rust_decimal::Decimal;
use sea_orm::sqlx::error::DatabaseError;
use sea_orm::sqlx::sqlite::SqliteError;
use sea_orm::{DbErr, RuntimeErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error types for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Stock rule violated.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Source document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// No party under this code.
    #[error("Party not found: {0}")]
    PartyNotFound(String),

    /// Party code already taken.
    #[error("Party code already exists: {0}")]
    DuplicatePartyCode(String),

    /// A credit sale would take the customer past their risk limit.
    #[error("Risk limit of {party} exceeded: limit {limit}, open balance would be {exposure}")]
    RiskLimitExceeded {
        /// Party code.
        party: String,
        /// Configured limit.
        limit: Decimal,
        /// Open balance including the rejected document.
        exposure: Decimal,
    },

    /// Snapshot failed the invariant scan and was not loaded.
    #[error("Restore rejected: {reason}")]
    RestoreRejected {
        /// Summary of what failed.
        reason: String,
        /// Full scan result.
        report: Box<HealthReport>,
    },

    /// A row kept changing under a compare-and-set write; the whole unit of
    /// work can be retried.
    #[error("Concurrent update on {entity} {id}")]
    Contention {
        /// Table that kept moving.
        entity: &'static str,
        /// Row id.
        id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Caller-facing form of an error: a stable code plus the business reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable reference code, e.g. `PERIOD_LOCKED`.
    pub reference_code: String,
    /// Human readable reason.
    pub reason: String,
}

impl EngineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Inventory(e) => e.error_code(),
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::DuplicatePartyCode(_) => "DUPLICATE_PARTY_CODE",
            Self::RiskLimitExceeded { .. } => "RISK_LIMIT_EXCEEDED",
            Self::RestoreRejected { .. } => "RESTORE_REJECTED",
            Self::Contention { .. } => "CONCURRENT_UPDATE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Inventory(e) => e.http_status_code(),
            Self::DocumentNotFound(_) | Self::PartyNotFound(_) => 404,
            Self::DuplicatePartyCode(_)
            | Self::RiskLimitExceeded { .. }
            | Self::Contention { .. } => 409,
            Self::RestoreRejected { .. } | Self::Serialization(_) => 422,
            Self::Database(_) => 500,
        }
    }

    /// Whether the store rejected the transaction because of a concurrent
    /// writer. Business-rule failures are never retryable.
    ///
    /// Decided from the driver's error code, never from message text:
    /// SQLSTATE `40001` and `40P01` on Postgres, `SQLITE_BUSY` and
    /// `SQLITE_LOCKED` (any extended form) on SQLite.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Contention { .. } => true,
            Self::Database(err) => driver_error(err).is_some_and(is_conflict),
            _ => false,
        }
    }

    /// Structured form for callers.
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            reference_code: self.error_code().to_string(),
            reason: self.to_string(),
        }
    }
}

/// The driver's own error, when the store returned one.
fn driver_error(err: &DbErr) -> Option<&dyn DatabaseError> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err.as_database_error(),
        _ => None,
    }
}

fn is_conflict(db: &dyn DatabaseError) -> bool {
    let Some(code) = db.code() else {
        return false;
    };
    if db.try_downcast_ref::<SqliteError>().is_some() {
        // Extended result codes keep the primary code in the low byte.
        return code
            .parse::<i32>()
            .is_ok_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED));
    }
    matches!(code.as_ref(), PG_SERIALIZATION_FAILURE | PG_DEADLOCK_DETECTED)
}

const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_codes_pass_through() {
        let err: EngineError = LedgerError::PeriodLocked("2026-01".into()).into();
        assert_eq!(err.error_code(), "PERIOD_LOCKED");
        assert_eq!(err.http_status_code(), 423);

        let err: EngineError = InventoryError::NegativeStock {
            sku: "A".into(),
            available: dec!(1),
            requested: dec!(2),
        }
        .into();
        assert_eq!(err.error_code(), "NEGATIVE_STOCK");
    }

    #[test]
    fn test_report_carries_reason() {
        let err: EngineError = LedgerError::MappingMissing("sales.vat".into()).into();
        let report = err.report();
        assert_eq!(report.reference_code, "MAPPING_MISSING");
        assert_eq!(report.reason, "MAPPING_MISSING:sales.vat");
    }

    #[test]
    fn test_business_errors_never_retry() {
        let business: EngineError = LedgerError::AlreadyVoid(Uuid::nil()).into();
        assert!(!business.is_retryable());
    }

    /// A driver error carrying only a code, as Postgres reports it.
    #[derive(Debug)]
    struct CodedError(&'static str);

    impl std::fmt::Display for CodedError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error returned from database: {}", self.0)
        }
    }

    impl std::error::Error for CodedError {}

    impl DatabaseError for CodedError {
        fn message(&self) -> &str {
            "error returned from database"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.0.into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sea_orm::sqlx::error::ErrorKind {
            sea_orm::sqlx::error::ErrorKind::Other
        }
    }

    fn exec_failure(code: &'static str) -> EngineError {
        EngineError::Database(DbErr::Exec(RuntimeErr::SqlxError(
            sea_orm::sqlx::Error::Database(Box::new(CodedError(code))),
        )))
    }

    #[rstest]
    #[case("40001", true)]
    #[case("40P01", true)]
    #[case("23505", false)]
    #[case("42P01", false)]
    fn test_store_conflicts_retry_by_code(#[case] code: &'static str, #[case] retryable: bool) {
        assert_eq!(exec_failure(code).is_retryable(), retryable);
    }

    #[rstest]
    #[case("could not serialize access due to concurrent update")]
    #[case("database is locked")]
    #[case("value 40001 out of range")]
    fn test_message_text_never_decides_retry(#[case] message: &str) {
        let err = EngineError::Database(DbErr::Custom(message.into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_contention_is_retryable() {
        let err = EngineError::Contention {
            entity: "inventory_items",
            id: Uuid::nil(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "CONCURRENT_UPDATE");
        assert_eq!(err.http_status_code(), 409);
    }

    #[rstest]
    #[case(EngineError::DocumentNotFound(Uuid::nil()), "DOCUMENT_NOT_FOUND", 404)]
    #[case(EngineError::PartyNotFound("C001".into()), "PARTY_NOT_FOUND", 404)]
    #[case(EngineError::DuplicatePartyCode("C001".into()), "DUPLICATE_PARTY_CODE", 409)]
    #[case(LedgerError::VoucherUnbalanced { debit: dec!(2), credit: dec!(1) }.into(), "VOUCHER_UNBALANCED", 400)]
    #[case(EngineError::Database(DbErr::Custom("boom".into())), "DATABASE_ERROR", 500)]
    fn test_codes_and_statuses(
        #[case] err: EngineError,
        #[case] code: &str,
        #[case] status: u16,
    ) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.http_status_code(), status);
    }
}
