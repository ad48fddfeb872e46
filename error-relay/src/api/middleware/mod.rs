//! HTTP middleware.

pub mod recovery;

pub use recovery::{RecoveryHandler, recovery_layer};
