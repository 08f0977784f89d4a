//! Append-only audit log.

use chrono::Utc;
use mizan_shared::types::{Actor, AuditEventId};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value as Json;

use crate::entities::audit_events;
use crate::error::EngineResult;

/// One state change to record.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// Kind of entity, e.g. `voucher`, `sale`, `account`.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
    /// What happened, e.g. `create`, `void`, `close`.
    pub action: String,
    /// State before the change.
    pub before: Option<Json>,
    /// State after the change.
    pub after: Option<Json>,
}

impl AuditRecord {
    /// A record with no snapshots.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl ToString,
        action: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            action: action.into(),
            before: None,
            after: None,
        }
    }

    /// Attaches the pre-change snapshot.
    #[must_use]
    pub fn before(mut self, value: Json) -> Self {
        self.before = Some(value);
        self
    }

    /// Attaches the post-change snapshot.
    #[must_use]
    pub fn after(mut self, value: Json) -> Self {
        self.after = Some(value);
        self
    }
}

/// Audit repository. There is no update or delete.
pub struct AuditRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuditRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Appends an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record(
        &self,
        actor: &Actor,
        record: AuditRecord,
    ) -> EngineResult<audit_events::Model> {
        let event = audit_events::ActiveModel {
            id: Set(AuditEventId::new().into_inner()),
            actor_user_id: Set(actor.user_id.map(|u| u.into_inner())),
            actor_name: Set(Some(actor.name.clone())),
            entity_type: Set(record.entity_type),
            entity_id: Set(record.entity_id),
            action: Set(record.action),
            before_json: Set(record.before),
            after_json: Set(record.after),
            created_at: Set(Utc::now()),
        };
        Ok(event.insert(self.conn).await?)
    }

    /// Events for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> EngineResult<Vec<audit_events::Model>> {
        Ok(audit_events::Entity::find()
            .filter(audit_events::Column::EntityType.eq(entity_type))
            .filter(audit_events::Column::EntityId.eq(entity_id))
            .order_by_asc(audit_events::Column::CreatedAt)
            .order_by_asc(audit_events::Column::Id)
            .all(self.conn)
            .await?)
    }
}
