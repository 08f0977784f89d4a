//! Publish/subscribe bus for committed business events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::EventsConfig;

/// Notification that a state-changing operation committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Kind of entity touched, e.g. `voucher`, `sale`, `fiscal_period`.
    pub entity_type: String,
    /// Id of the entity.
    pub entity_id: Uuid,
    /// What happened, e.g. `create`, `void`, `close`.
    pub action: String,
    /// Commit time.
    pub at: DateTime<Utc>,
}

impl LedgerEvent {
    /// Builds an event stamped with the current time.
    pub fn new(entity_type: impl Into<String>, entity_id: Uuid, action: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
            action: action.into(),
            at: Utc::now(),
        }
    }
}

/// Broadcast bus. Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Creates a bus from configuration.
    #[must_use]
    pub fn new(config: &EventsConfig) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// Creates a bus holding up to `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event. Returns how many subscribers will see it.
    ///
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(entity_type = %event.entity_type, "event dropped, no subscribers");
                0
            }
        }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(&EventsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(LedgerEvent::new("voucher", Uuid::nil(), "create")), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::with_capacity(8);
        let mut rx = bus.subscribe();
        let id = Uuid::now_v7();

        assert_eq!(bus.publish(LedgerEvent::new("sale", id, "void")), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity_type, "sale");
        assert_eq!(event.entity_id, id);
        assert_eq!(event.action, "void");
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let bus = EventBus::with_capacity(8);
        let publisher = bus.clone();
        let mut rx = bus.subscribe();

        publisher.publish(LedgerEvent::new("fiscal_period", Uuid::nil(), "close"));
        assert_eq!(rx.recv().await.unwrap().action, "close");
        assert_eq!(bus.subscriber_count(), 1);
    }
}
