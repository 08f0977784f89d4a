//! Account repository for chart of accounts operations.

use std::collections::HashMap;

use chrono::Utc;
use mizan_core::ledger::{AccountInfo, AccountType, LedgerError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{accounts, journal_lines};
use crate::error::EngineResult;

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountInput {
    /// Account code, unique.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
}

/// Input for updating an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountInput {
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub account_type: Option<AccountType>,
}

/// Account repository.
pub struct AccountRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AccountRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(&self, code: &str) -> EngineResult<Option<accounts::Model>> {
        Ok(accounts::Entity::find_by_id(code.to_string())
            .one(self.conn)
            .await?)
    }

    /// Loads an account, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` for a missing code.
    pub async fn get(&self, code: &str) -> EngineResult<accounts::Model> {
        self.find(code)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()).into())
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, include_inactive: bool) -> EngineResult<Vec<accounts::Model>> {
        let mut query = accounts::Entity::find();
        if !include_inactive {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(accounts::Column::Code)
            .all(self.conn)
            .await?)
    }

    /// Creates an active account.
    ///
    /// # Errors
    ///
    /// `DuplicateAccountCode` when the code is taken, a validation error for
    /// blank code or name.
    pub async fn create(&self, input: CreateAccountInput) -> EngineResult<accounts::Model> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() || name.is_empty() {
            return Err(LedgerError::Validation("account code and name are required".into()).into());
        }
        if self.find(&code).await?.is_some() {
            return Err(LedgerError::DuplicateAccountCode(code).into());
        }

        let now = Utc::now();
        let account = accounts::ActiveModel {
            code: Set(code),
            name: Set(name),
            account_type: Set(input.account_type.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(account.insert(self.conn).await?)
    }

    /// Renames or retypes an account that no line references yet.
    ///
    /// # Errors
    ///
    /// `UnknownAccount`, or `AccountInUse` once a journal line posts to it.
    pub async fn update(
        &self,
        code: &str,
        input: UpdateAccountInput,
    ) -> EngineResult<accounts::Model> {
        let existing = self.get(code).await?;
        if self.is_referenced(code).await? {
            return Err(LedgerError::AccountInUse(code.to_string()).into());
        }

        let mut account: accounts::ActiveModel = existing.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LedgerError::Validation("account name is required".into()).into());
            }
            account.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            account.account_type = Set(account_type.into());
        }
        account.updated_at = Set(Utc::now());
        Ok(account.update(self.conn).await?)
    }

    /// Marks an account inactive. Posted lines stay where they are.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` for a missing code.
    pub async fn deactivate(&self, code: &str) -> EngineResult<accounts::Model> {
        let mut account: accounts::ActiveModel = self.get(code).await?.into();
        account.is_active = Set(false);
        account.updated_at = Set(Utc::now());
        Ok(account.update(self.conn).await?)
    }

    /// Whether any journal line posts to the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn is_referenced(&self, code: &str) -> EngineResult<bool> {
        let count = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountCode.eq(code))
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Fails unless the account exists and is active.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` or `InactiveAccount`.
    pub async fn ensure_postable(&self, code: &str) -> EngineResult<()> {
        let account = self.get(code).await?;
        if !account.is_active {
            return Err(LedgerError::InactiveAccount(account.code).into());
        }
        Ok(())
    }

    /// Validation info for the given codes, keyed by code. Missing codes are
    /// simply absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lookup<'c, I>(&self, codes: I) -> EngineResult<HashMap<String, AccountInfo>>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let mut wanted: Vec<String> = codes.into_iter().map(str::to_string).collect();
        wanted.sort();
        wanted.dedup();

        let found = accounts::Entity::find()
            .filter(accounts::Column::Code.is_in(wanted))
            .all(self.conn)
            .await?;

        Ok(found
            .into_iter()
            .map(|a| {
                (
                    a.code.clone(),
                    AccountInfo {
                        code: a.code,
                        is_active: a.is_active,
                    },
                )
            })
            .collect())
    }
}
