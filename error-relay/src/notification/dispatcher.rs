//! Fan-out of error events to every registered sink.
//!
//! The dispatcher is configured once at startup. For each event it:
//! - Stamps the deployment environment and strips stack traces when disabled
//! - Runs each sink's synchronous local bookkeeping on the caller's path
//! - Starts one independent delivery per sink, so a slow or failing sink
//!   never holds back another one

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sinks::NotificationSink;
use crate::tracking::ErrorEvent;

/// Behavioral options for the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// Deliver in background tasks instead of awaiting every sink.
    pub async_delivery: bool,
    /// Keep captured stack traces on outgoing events.
    pub include_stack_trace: bool,
    /// Deployment environment stamped on every event.
    pub environment: Option<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            async_delivery: true,
            include_stack_trace: true,
            environment: None,
        }
    }
}

/// The notification dispatcher.
pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn NotificationSink>>,
    options: DispatchOptions,
}

impl NotificationDispatcher {
    /// Register the active sinks and options.
    pub fn configure(sinks: Vec<Arc<dyn NotificationSink>>, options: DispatchOptions) -> Self {
        for sink in &sinks {
            info!(
                sink = sink.sink_type(),
                enabled = sink.is_enabled(),
                "Registered notification sink"
            );
        }
        info!(
            "Notification dispatcher initialized with {} sinks",
            sinks.len()
        );
        Self { sinks, options }
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    fn prepare(&self, mut event: ErrorEvent) -> Arc<ErrorEvent> {
        if event.environment.is_none() {
            event.environment = self.options.environment.clone();
        }
        if !self.options.include_stack_trace {
            event.stack_trace = None;
        }

        for sink in &self.sinks {
            sink.record_locally(&event);
        }

        Arc::new(event)
    }

    /// Hand the event to every sink in its own task and return immediately.
    pub fn on_error(&self, event: ErrorEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(error_id = %event.id, "No async runtime available, dropping notification");
            return;
        };

        let event = self.prepare(event);
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let event = Arc::clone(&event);
            runtime.spawn(async move {
                sink.notify(&event).await;
            });
        }
        debug!(error_id = %event.id, sinks = self.sinks.len(), "Dispatched error event");
    }

    /// Deliver the event to every sink concurrently and wait for all of them.
    pub async fn dispatch(&self, event: ErrorEvent) {
        let event = self.prepare(event);
        join_all(self.sinks.iter().map(|sink| sink.notify(&event))).await;
        debug!(error_id = %event.id, sinks = self.sinks.len(), "Delivered error event");
    }

    /// Deliver according to [`DispatchOptions::async_delivery`].
    pub async fn handle(&self, event: ErrorEvent) {
        if self.options.async_delivery {
            self.on_error(event);
        } else {
            self.dispatch(event).await;
        }
    }
}
