//! Background webhook-entry processor.
//!
//! [`WebhookProcessor`] subscribes to the [`Dispatcher`](crate::bus::Dispatcher)
//! and consumes verified webhook entries after the HTTP handler has
//! already acknowledged them. It runs as a long-lived task and shuts
//! down when the dispatcher is dropped.
//!
//! The payload it receives is the raw (verified) entry and may contain
//! PII; everything logged here goes through identifier-only fields.

use tokio::sync::broadcast;

use comanda_core::types::DbId;
use comanda_core::webhook::WebhookEntry;
use comanda_db::repositories::OrderRepo;
use comanda_db::DbPool;

use crate::bus::{event_type, DispatchedEvent};

/// Background service consuming dispatched webhook entries.
pub struct WebhookProcessor;

impl WebhookProcessor {
    /// Run the processing loop.
    ///
    /// Exits when the channel is closed, i.e. when the dispatcher is
    /// dropped. Per-event failures are logged and never stop the loop.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DispatchedEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::handle(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            business_id = event.business_id,
                            "Failed to process dispatched event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook processor lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Dispatcher closed, webhook processor shutting down");
                    break;
                }
            }
        }
    }

    /// Process a single dispatched event.
    async fn handle(pool: &DbPool, event: &DispatchedEvent) -> Result<(), sqlx::Error> {
        if event.event_type != event_type::WEBHOOK_ENTRY {
            tracing::debug!(event_type = %event.event_type, "Ignoring unhandled event type");
            return Ok(());
        }
        let Some(business_id) = event.business_id else {
            // Attribution happens before dispatch; an unattributed
            // entry here indicates a publisher bug.
            tracing::warn!("Dropping webhook entry without tenant attribution");
            return Ok(());
        };

        let entry: WebhookEntry = match serde_json::from_value(event.payload.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, business_id, "Malformed webhook entry payload");
                return Ok(());
            }
        };

        for change in &entry.changes {
            let field = change["field"].as_str().unwrap_or("unknown");
            match field {
                "messages" => Self::handle_messages(pool, business_id, change).await?,
                other => {
                    tracing::debug!(business_id, field = other, "Unhandled webhook change field");
                }
            }
        }
        Ok(())
    }

    /// Handle a `messages` change: record catalog orders, log status
    /// updates by identifier.
    async fn handle_messages(
        pool: &DbPool,
        business_id: DbId,
        change: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        for candidate in order_candidates(change) {
            let order = OrderRepo::create(
                pool,
                business_id,
                candidate.customer_phone.as_deref(),
                &candidate.items,
                candidate.total,
            )
            .await?;
            tracing::info!(
                business_id,
                order_id = order.id,
                items = candidate.items.as_array().map_or(0, Vec::len),
                "Recorded catalog order from webhook"
            );
        }

        if let Some(statuses) = change["value"]["statuses"].as_array() {
            for status in statuses {
                tracing::info!(
                    business_id,
                    message_id = status["id"].as_str().unwrap_or("unknown"),
                    status = status["status"].as_str().unwrap_or("unknown"),
                    "Message status update"
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Order extraction
// ---------------------------------------------------------------------------

/// A catalog order found in a `messages` change, ready to persist.
#[derive(Debug)]
struct OrderCandidate {
    customer_phone: Option<String>,
    /// The platform's `product_items` array, stored verbatim.
    items: serde_json::Value,
    total: f64,
}

/// Extract catalog-order messages from one `messages` change.
///
/// An order message carries `{"order": {"product_items": [{quantity,
/// item_price, ...}]}}`; everything else is skipped.
fn order_candidates(change: &serde_json::Value) -> Vec<OrderCandidate> {
    let Some(messages) = change["value"]["messages"].as_array() else {
        return Vec::new();
    };

    messages
        .iter()
        .filter_map(|message| {
            let items = message["order"]["product_items"].as_array()?;
            let total = items
                .iter()
                .map(|item| {
                    let quantity = item["quantity"].as_f64().unwrap_or(0.0);
                    let price = item["item_price"].as_f64().unwrap_or(0.0);
                    quantity * price
                })
                .sum();
            Some(OrderCandidate {
                customer_phone: message["from"].as_str().map(str::to_string),
                items: serde_json::Value::Array(items.clone()),
                total,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn order_change() -> serde_json::Value {
        serde_json::json!({
            "field": "messages",
            "value": {
                "messages": [
                    {
                        "from": "5215512345678",
                        "id": "wamid.order-1",
                        "type": "order",
                        "order": {
                            "catalog_id": "cat-main",
                            "product_items": [
                                {"product_retailer_id": "prod-001", "quantity": 2, "item_price": 19.99, "currency": "MXN"},
                                {"product_retailer_id": "prod-002", "quantity": 1, "item_price": 35.0, "currency": "MXN"}
                            ]
                        }
                    },
                    {
                        "from": "5215512345678",
                        "id": "wamid.text-1",
                        "type": "text",
                        "text": {"body": "gracias"}
                    }
                ]
            }
        })
    }

    #[test]
    fn order_messages_become_candidates() {
        let candidates = order_candidates(&order_change());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].customer_phone.as_deref(), Some("5215512345678"));
        assert_eq!(candidates[0].items.as_array().unwrap().len(), 2);
        assert!((candidates[0].total - 74.98).abs() < 1e-9);
    }

    #[test]
    fn text_only_change_yields_no_candidates() {
        let change = serde_json::json!({
            "field": "messages",
            "value": {
                "messages": [{"from": "x", "id": "wamid.1", "type": "text", "text": {"body": "hola"}}]
            }
        });
        assert!(order_candidates(&change).is_empty());
    }

    #[test]
    fn status_only_change_yields_no_candidates() {
        let change = serde_json::json!({
            "field": "messages",
            "value": {"statuses": [{"id": "wamid.1", "status": "delivered"}]}
        });
        assert!(order_candidates(&change).is_empty());
    }
}
