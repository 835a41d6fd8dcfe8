//! In-process dispatch and background processing.
//!
//! Building blocks for the webhook pipeline's asynchronous half:
//!
//! - [`Dispatcher`]: publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DispatchedEvent`]: the canonical event envelope.
//! - [`WebhookProcessor`]: background consumer of verified webhook
//!   entries.

pub mod bus;
pub mod processor;

pub use bus::{event_type, DispatchedEvent, Dispatcher};
pub use processor::WebhookProcessor;
