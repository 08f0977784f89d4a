//! The identity on whose behalf an operation runs.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use crate::session::Session;

/// Who performed an action, as stamped on audit events and period closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Authenticated user, if any. Maintenance jobs run without one.
    pub user_id: Option<UserId>,
    /// Display label.
    pub name: String,
}

impl Actor {
    /// A named user.
    pub fn user(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            name: name.into(),
        }
    }

    /// The built-in actor used by seeders and maintenance tools.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: None,
            name: "system".to_string(),
        }
    }
}

impl From<&Session> for Actor {
    fn from(session: &Session) -> Self {
        Self::user(session.user_id, session.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;

    #[test]
    fn test_system_actor() {
        let actor = Actor::system();
        assert!(actor.user_id.is_none());
        assert_eq!(actor.name, "system");
    }

    #[test]
    fn test_from_session() {
        let store = SessionStore::default();
        let user = UserId::new();
        let session = store.create(user, "muhasebe");

        let actor = Actor::from(&session);
        assert_eq!(actor.user_id, Some(user));
        assert_eq!(actor.name, "muhasebe");
    }
}
