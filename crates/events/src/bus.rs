//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`EditorEvent`]s to any number of observers (status
//! bars, audit sinks, the CLI reporter). It is shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use quillboard_core::types::DraftVersion;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Event names published by a draft session.
pub mod event_types {
    pub const SAVED: &str = "draft.saved";
    pub const AUTO_SAVED: &str = "draft.auto_saved";
    pub const SAVE_FAILED: &str = "draft.save_failed";
    pub const PUBLISHED: &str = "draft.published";
    pub const PUBLISH_FAILED: &str = "draft.publish_failed";
}

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

/// Something that happened to a draft.
///
/// Constructed via [`EditorEvent::new`] and enriched with
/// [`with_version`](EditorEvent::with_version) and
/// [`with_payload`](EditorEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorEvent {
    /// Dot-separated event name, see [`event_types`].
    pub event_type: String,

    /// Id of the draft the event concerns.
    pub article_id: Uuid,

    /// Store version the event refers to, when meaningful.
    pub version: Option<DraftVersion>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl EditorEvent {
    pub fn new(event_type: impl Into<String>, article_id: Uuid) -> Self {
        Self {
            event_type: event_type.into(),
            article_id,
            version: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_version(mut self, version: DraftVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use quillboard_events::bus::{EditorEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EditorEvent::new("draft.saved", uuid::Uuid::nil()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers that fall more than `capacity` events behind observe
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: EditorEvent) {
        tracing::trace!(event_type = %event.event_type, "Publishing editor event");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let id = Uuid::now_v7();

        bus.publish(
            EditorEvent::new(event_types::SAVED, id)
                .with_version(3)
                .with_payload(serde_json::json!({"trigger": "manual"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "draft.saved");
        assert_eq!(received.article_id, id);
        assert_eq!(received.version, Some(3));
        assert_eq!(received.payload["trigger"], "manual");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(EditorEvent::new(event_types::PUBLISHED, Uuid::nil()));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, event_types::PUBLISHED);
        assert_eq!(e2.event_type, event_types::PUBLISHED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(EditorEvent::new(event_types::SAVE_FAILED, Uuid::nil()));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = EditorEvent::new(event_types::AUTO_SAVED, Uuid::nil());
        assert!(event.version.is_none());
        assert!(event.payload.is_object());
    }
}
