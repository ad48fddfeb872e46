//! Turns failures into [`ErrorEvent`]s and hands them to the dispatcher.

use std::backtrace::Backtrace;
use std::sync::Arc;

use super::event::{Details, ErrorEvent, OriginalError};
use super::logger::ErrorLogger;
use crate::notification::NotificationDispatcher;

/// Context attached to events built from recovered panics.
pub const PANIC_CONTEXT: &str = "panic recovered";

/// Error tracker.
///
/// Built once at startup from the dispatcher (which owns the delivery
/// options) and the logging collaborator, then shared by the HTTP layer.
pub struct Tracker {
    dispatcher: Arc<NotificationDispatcher>,
    logger: Arc<dyn ErrorLogger>,
}

impl Tracker {
    pub fn new(dispatcher: Arc<NotificationDispatcher>, logger: Arc<dyn ErrorLogger>) -> Self {
        let options = dispatcher.options();
        logger.info(&format!(
            "Error tracking configured (async delivery: {}, stack traces: {}, environment: {})",
            options.async_delivery,
            options.include_stack_trace,
            options.environment.as_deref().unwrap_or("unset"),
        ));
        Self { dispatcher, logger }
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    fn capture_stack_trace(&self) -> Option<String> {
        self.dispatcher
            .options()
            .include_stack_trace
            .then(|| Backtrace::force_capture().to_string())
    }

    /// Wrap `error` with context and details, notify the sinks and return
    /// the event so the caller can answer with its ID.
    pub async fn track(
        &self,
        error: &(dyn std::error::Error + Send + Sync + 'static),
        context: &str,
        details: Details,
    ) -> ErrorEvent {
        let mut event = ErrorEvent::new(OriginalError::from_error(error), context).details(details);
        event.stack_trace = self.capture_stack_trace();

        self.dispatcher.handle(event.clone()).await;
        event
    }

    /// Build an event for a panic caught at the recovery boundary and fan it
    /// out in the background. Never blocks.
    pub fn recover(&self, panic_message: &str, backtrace: Option<String>) -> ErrorEvent {
        let mut event = ErrorEvent::new(
            OriginalError::new(format!("panic: {panic_message}")),
            PANIC_CONTEXT,
        );
        if self.dispatcher.options().include_stack_trace {
            event.stack_trace = backtrace.or_else(|| self.capture_stack_trace());
        }

        self.logger
            .info(&format!("Recovered from panic ({}): {}", event.id, panic_message));
        self.dispatcher.on_error(event.clone());
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{DispatchOptions, NotificationSink};
    use crate::tracking::details_from;
    use crate::Result;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct MemoryLogger {
        infos: Mutex<Vec<String>>,
    }

    impl ErrorLogger for MemoryLogger {
        fn info(&self, message: &str) {
            self.infos.lock().push(message.to_string());
        }

        fn error(&self, _error_id: &str, _error: &OriginalError, _context: &str, _details: &Details) {}
    }

    struct ChannelSink(mpsc::UnboundedSender<ErrorEvent>);

    #[async_trait]
    impl NotificationSink for ChannelSink {
        fn sink_type(&self) -> &'static str {
            "channel"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn send(&self, event: &ErrorEvent) -> Result<()> {
            let _ = self.0.send(event.clone());
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("insufficient funds")]
    struct InsufficientFunds;

    fn tracker(
        options: DispatchOptions,
    ) -> (Tracker, Arc<MemoryLogger>, mpsc::UnboundedReceiver<ErrorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(ChannelSink(tx))];
        let dispatcher = Arc::new(NotificationDispatcher::configure(sinks, options));
        let logger = Arc::new(MemoryLogger::default());
        (Tracker::new(dispatcher, logger.clone()), logger, rx)
    }

    #[tokio::test]
    async fn test_track_dispatches_fully_built_event() {
        let (tracker, logger, mut rx) = tracker(DispatchOptions {
            async_delivery: false,
            include_stack_trace: false,
            environment: Some("test".to_string()),
        });

        let event = tracker
            .track(
                &InsufficientFunds,
                "payment processing failed",
                details_from(json!({"amount": 150.0})),
            )
            .await;

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.id, event.id);
        assert_eq!(delivered.context, "payment processing failed");
        assert_eq!(delivered.original.message, "insufficient funds");
        assert_eq!(delivered.details["amount"], 150.0);
        assert_eq!(delivered.environment.as_deref(), Some("test"));
        assert!(delivered.stack_trace.is_none());
        assert!(logger.infos.lock()[0].starts_with("Error tracking configured"));
    }

    #[tokio::test]
    async fn test_track_captures_stack_trace_when_enabled() {
        let (tracker, _logger, mut rx) = tracker(DispatchOptions {
            async_delivery: false,
            ..Default::default()
        });

        tracker.track(&InsufficientFunds, "ctx", Details::new()).await;
        assert!(rx.try_recv().unwrap().stack_trace.is_some());
    }

    #[tokio::test]
    async fn test_recover_builds_panic_event() {
        let (tracker, logger, mut rx) = tracker(DispatchOptions::default());

        let event = tracker.recover("index out of bounds", Some("bt".to_string()));
        assert_eq!(event.context, PANIC_CONTEXT);
        assert_eq!(event.original.message, "panic: index out of bounds");
        assert_eq!(event.stack_trace.as_deref(), Some("bt"));

        let delivered = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered.id, event.id);
        assert!(logger.infos.lock().iter().any(|m| m.contains("Recovered from panic")));
    }
}
