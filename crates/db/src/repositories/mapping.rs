//! Symbolic account mappings.

use chrono::Utc;
use mizan_core::mapping::resolve_mapping;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};

use super::account::AccountRepository;
use crate::entities::account_mappings;
use crate::error::EngineResult;

/// Mapping repository.
pub struct MappingRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> MappingRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Stored account code for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(account_mappings::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?
            .map(|m| m.account_code))
    }

    /// Resolves `key` to an account code at posting time.
    ///
    /// The fallback is used when nothing is stored; it is not persisted.
    ///
    /// # Errors
    ///
    /// `MappingMissing` when there is neither a mapping nor a fallback.
    pub async fn resolve(&self, key: &str, fallback: Option<&str>) -> EngineResult<String> {
        let stored = self.get(key).await?;
        Ok(resolve_mapping(key, stored, fallback)?)
    }

    /// Points `key` at `account_code`, replacing any previous mapping.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` or `InactiveAccount` when the target cannot take postings.
    pub async fn set(
        &self,
        key: &str,
        account_code: &str,
    ) -> EngineResult<account_mappings::Model> {
        AccountRepository::new(self.conn)
            .ensure_postable(account_code)
            .await?;

        let now = Utc::now();
        let existing = account_mappings::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut mapping: account_mappings::ActiveModel = found.into();
                mapping.account_code = Set(account_code.to_string());
                mapping.updated_at = Set(now);
                mapping.update(self.conn).await?
            }
            None => {
                account_mappings::ActiveModel {
                    key: Set(key.to_string()),
                    account_code: Set(account_code.to_string()),
                    updated_at: Set(now),
                }
                .insert(self.conn)
                .await?
            }
        };
        Ok(model)
    }

    /// All mappings ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> EngineResult<Vec<account_mappings::Model>> {
        Ok(account_mappings::Entity::find()
            .order_by_asc(account_mappings::Column::Key)
            .all(self.conn)
            .await?)
    }
}
