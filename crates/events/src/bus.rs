//! In-process task dispatcher backed by a `tokio::sync::broadcast`
//! channel.
//!
//! [`Dispatcher`] decouples webhook receipt from processing: the HTTP
//! handler verifies and acknowledges, the processor consumes at its own
//! pace. Shared via `Arc<Dispatcher>` across the application.

use chrono::{DateTime, Utc};
use comanda_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Well-known event names.
pub mod event_type {
    /// One verified webhook entry, dispatched per (tenant, entry).
    pub const WEBHOOK_ENTRY: &str = "webhook.entry";
}

// ---------------------------------------------------------------------------
// DispatchedEvent
// ---------------------------------------------------------------------------

/// A unit of deferred work published on the dispatcher.
///
/// Constructed via [`DispatchedEvent::new`] and enriched with
/// [`with_tenant`](DispatchedEvent::with_tenant) and
/// [`with_payload`](DispatchedEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchedEvent {
    /// Dot-separated event name, e.g. `"webhook.entry"`.
    pub event_type: String,

    /// The tenant the event was attributed to, when known.
    pub business_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data. May contain
    /// PII; consumers log only redacted projections of it.
    pub payload: serde_json::Value,

    /// When the event was dispatched (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DispatchedEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            business_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attribute the event to a tenant.
    pub fn with_tenant(mut self, business_id: DbId) -> Self {
        self.business_id = Some(business_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out dispatcher.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every dispatched [`DispatchedEvent`].
pub struct Dispatcher {
    sender: broadcast::Sender<DispatchedEvent>,
}

impl Dispatcher {
    /// Create a dispatcher with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are
    /// dropped and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; the send
    /// error only means there are no receivers.
    pub fn publish(&self, event: DispatchedEvent) {
        let _ = self.sender.send(event);
    }

    /// Convenience for the common name-plus-payload case.
    pub fn send(&self, event_type: &str, payload: serde_json::Value) {
        self.publish(DispatchedEvent::new(event_type).with_payload(payload));
    }

    /// Subscribe to all events published on this dispatcher.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchedEvent> {
        self.sender.subscribe()
    }
}

impl Default for Dispatcher {
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
        let dispatcher = Dispatcher::default();
        let mut rx = dispatcher.subscribe();

        let event = DispatchedEvent::new(event_type::WEBHOOK_ENTRY)
            .with_tenant(42)
            .with_payload(serde_json::json!({"entry_id": "e-1"}));
        dispatcher.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "webhook.entry");
        assert_eq!(received.business_id, Some(42));
        assert_eq!(received.payload["entry_id"], "e-1");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let dispatcher = Dispatcher::default();
        let mut rx1 = dispatcher.subscribe();
        let mut rx2 = dispatcher.subscribe();

        dispatcher.send("multi.test", serde_json::json!({}));

        assert_eq!(rx1.recv().await.unwrap().event_type, "multi.test");
        assert_eq!(rx2.recv().await.unwrap().event_type, "multi.test");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let dispatcher = Dispatcher::default();
        dispatcher.send("orphan.event", serde_json::json!({}));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DispatchedEvent::new("bare.event");
        assert!(event.business_id.is_none());
        assert!(event.payload.is_object());
    }
}
