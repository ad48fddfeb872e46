//! Error tracking.
//!
//! Assigns every failure a support ID, records its context and metadata,
//! and forwards the resulting [`ErrorEvent`] to the notification dispatcher.

pub mod event;
pub mod logger;
pub mod tracker;

pub use event::{Details, ErrorEvent, OriginalError, details_from, generate_error_id};
pub use logger::{ErrorLogger, summary_line};
pub use tracker::{PANIC_CONTEXT, Tracker};
