//! Notification sinks.
//!
//! This module provides the targets an error event can be delivered to:
//! - Chat webhooks (Discord-compatible embeds)
//! - Log ingestion endpoints (flat JSON records, e.g. Logstash HTTP input)

mod chat;
mod log_ingest;

pub use chat::{ChatConfig, ChatMessage, ChatNotifier, Embed, EmbedField};
pub use log_ingest::{LogConfig, LogNotifier};

use async_trait::async_trait;
use tracing::warn;

use crate::Result;
use crate::tracking::ErrorEvent;

/// Trait for notification sinks.
///
/// Sinks hold only immutable configuration and a shareable HTTP client, so a
/// single instance can serve any number of concurrent deliveries.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Get the sink type name.
    fn sink_type(&self) -> &'static str;

    /// Whether a delivery target is configured.
    fn is_enabled(&self) -> bool;

    /// Local, synchronous bookkeeping run on the dispatching path before
    /// any delivery starts.
    fn record_locally(&self, _event: &ErrorEvent) {}

    /// Deliver the event once. Errors describe why this attempt failed.
    async fn send(&self, event: &ErrorEvent) -> Result<()>;

    /// Fire-and-forget delivery: failures end in a local log line.
    async fn notify(&self, event: &ErrorEvent) {
        if let Err(e) = self.send(event).await {
            warn!(
                sink = self.sink_type(),
                error_id = %event.id,
                error = %e,
                "Notification delivery failed"
            );
        }
    }
}
