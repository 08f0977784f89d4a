//! Fiscal period lock repository.
//!
//! Periods are stored only once somebody closes or reopens them; a missing
//! row means the period is open.

use chrono::{NaiveDate, Utc};
use mizan_core::fiscal::{FiscalPeriodState, PeriodKey};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use tracing::warn;

use crate::entities::fiscal_periods;
use crate::error::EngineResult;

/// Fiscal period repository.
pub struct FiscalRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FiscalRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Current lock state of `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn state(&self, key: PeriodKey) -> EngineResult<FiscalPeriodState> {
        let row = fiscal_periods::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?;
        Ok(row.map_or_else(
            || FiscalPeriodState::open(key),
            |r| FiscalPeriodState {
                period_key: key,
                is_closed: r.is_closed,
                closed_by: r.closed_by,
                closed_at: r.closed_at,
            },
        ))
    }

    /// Whether postings dated `date` are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn is_locked(&self, date: NaiveDate) -> EngineResult<bool> {
        Ok(self.state(PeriodKey::of(date)).await?.is_closed)
    }

    /// Fails with `PeriodLocked` when `date` lies in a closed period.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, or a database error.
    pub async fn ensure_open(&self, date: NaiveDate) -> EngineResult<()> {
        let state = self.state(PeriodKey::of(date)).await?;
        if let Err(err) = state.ensure_open() {
            warn!(%date, error_code = err.error_code(), "posting into closed period");
            return Err(err.into());
        }
        Ok(())
    }

    /// Closes `key`, stamping who and when. Closing a closed period
    /// refreshes the stamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn close(&self, key: PeriodKey, closed_by: &str) -> EngineResult<fiscal_periods::Model> {
        let now = Utc::now();
        self.upsert(key, true, Some(closed_by.to_string()), Some(now))
            .await
    }

    /// Reopens `key` and clears the close stamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn open(&self, key: PeriodKey) -> EngineResult<fiscal_periods::Model> {
        self.upsert(key, false, None, None).await
    }

    /// All periods that were ever closed or reopened.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> EngineResult<Vec<fiscal_periods::Model>> {
        Ok(fiscal_periods::Entity::find()
            .order_by_asc(fiscal_periods::Column::PeriodKey)
            .all(self.conn)
            .await?)
    }

    async fn upsert(
        &self,
        key: PeriodKey,
        is_closed: bool,
        closed_by: Option<String>,
        closed_at: Option<chrono::DateTime<Utc>>,
    ) -> EngineResult<fiscal_periods::Model> {
        let now = Utc::now();
        let existing = fiscal_periods::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut period: fiscal_periods::ActiveModel = found.into();
                period.is_closed = Set(is_closed);
                period.closed_by = Set(closed_by);
                period.closed_at = Set(closed_at);
                period.updated_at = Set(now);
                period.update(self.conn).await?
            }
            None => {
                fiscal_periods::ActiveModel {
                    period_key: Set(key.to_string()),
                    is_closed: Set(is_closed),
                    closed_by: Set(closed_by),
                    closed_at: Set(closed_at),
                    updated_at: Set(now),
                }
                .insert(self.conn)
                .await?
            }
        };
        Ok(model)
    }
}
