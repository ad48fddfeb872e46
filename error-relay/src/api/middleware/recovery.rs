//! Panic recovery boundary.
//!
//! Wraps handlers in [`CatchPanicLayer`]; a caught panic becomes a tracked
//! event and the caller gets the regular tracked-error body.

use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use axum::response::IntoResponse;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::api::error::ApiError;
use crate::panic_hook::{panic_payload_to_string, take_recorded_backtrace};
use crate::tracking::Tracker;

/// Converts caught panics into tracked error responses.
#[derive(Clone)]
pub struct RecoveryHandler {
    tracker: Arc<Tracker>,
}

impl RecoveryHandler {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl ResponseForPanic for RecoveryHandler {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Self::ResponseBody> {
        let message = panic_payload_to_string(err.as_ref())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let event = self.tracker.recover(&message, take_recorded_backtrace());
        ApiError::tracked(&event).into_response()
    }
}

/// Layer installing the recovery boundary.
pub fn recovery_layer(tracker: Arc<Tracker>) -> CatchPanicLayer<RecoveryHandler> {
    CatchPanicLayer::custom(RecoveryHandler::new(tracker))
}
