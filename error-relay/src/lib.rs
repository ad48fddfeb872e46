//! error-relay library crate.
//!
//! Tracks failures raised while serving requests, turns them into
//! [`ErrorEvent`](tracking::ErrorEvent)s and fans each event out to the
//! configured notification sinks (a Discord-style chat webhook and a
//! log-ingestion endpoint) without blocking the request path. A small
//! load-generator bot keeps the pipeline exercised.

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod panic_hook;
pub mod services;
pub mod tracking;
pub mod utils;

pub use error::{Error, Result};

/// Service name reported by the health endpoint and stamped on log records.
pub const SERVICE_NAME: &str = "error-relay";
