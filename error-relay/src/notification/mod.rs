//! Notification system module.
//!
//! Delivers tracked error events to external sinks (chat webhook, log
//! ingestion). Delivery is best effort: one attempt per sink, failures are
//! logged locally and never reach the code that raised the error.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use error_relay::notification::{DispatchOptions, NotificationDispatcher};
//! use error_relay::notification::sinks::{ChatConfig, ChatNotifier};
//!
//! let chat = Arc::new(ChatNotifier::new(ChatConfig {
//!     webhook_url: "https://discord.com/api/webhooks/...".to_string(),
//!     ..Default::default()
//! }));
//! let dispatcher = NotificationDispatcher::configure(vec![chat], DispatchOptions::default());
//! ```

pub mod dispatcher;
pub mod sinks;

pub use dispatcher::{DispatchOptions, NotificationDispatcher};
pub use sinks::{ChatConfig, ChatNotifier, LogConfig, LogNotifier, NotificationSink};
