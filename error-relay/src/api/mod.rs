//! HTTP surface.
//!
//! Health check, the error-simulation endpoints, and the recovery boundary
//! that turns in-request panics into tracked error responses.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{ApiServer, ApiServerConfig, AppState};
