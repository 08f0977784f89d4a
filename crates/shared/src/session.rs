//! Token-keyed session store.
//!
//! Sessions live in memory only and expire after a fixed time-to-live. The
//! ledger engine never reads them; transport adapters resolve a token to a
//! [`Session`] and pass the actor id down.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::types::UserId;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// The user this session acts for.
    pub user_id: UserId,
    /// Display name of the user, used as the actor label in period closes.
    pub username: String,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
}

/// In-memory session store with TTL eviction.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, Arc<Session>>,
}

impl SessionStore {
    /// Creates a store from configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_config(config.max_sessions, config.ttl_secs)
    }

    /// Creates a store with an explicit capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Issues a new session for `user_id` and returns it.
    pub fn create(&self, user_id: UserId, username: impl Into<String>) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            username: username.into(),
            created_at: Utc::now(),
        };
        self.cache
            .insert(session.token.clone(), Arc::new(session.clone()));
        tracing::debug!(user_id = %session.user_id, "session created");
        session
    }

    /// Looks up a live session by token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<Session> {
        self.cache.get(token).map(|s| (*s).clone())
    }

    /// Revokes a session. Returns `true` if the token was live.
    pub fn revoke(&self, token: &str) -> bool {
        self.cache.remove(token).is_some()
    }

    /// Number of sessions currently held.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
