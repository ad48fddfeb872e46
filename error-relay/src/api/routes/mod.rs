//! API route modules.

pub mod errors;
pub mod health;

use axum::Router;
use axum::routing::get;

use crate::api::error::ApiError;
use crate::api::middleware::recovery_layer;
use crate::api::server::AppState;

/// Create the main router.
///
/// `/api/error/uncaught-panic` is merged outside the recovery layer; it is
/// meant to take the process down.
pub fn create_router(state: AppState) -> Router {
    let recovered = Router::new()
        .nest("/api/error", errors::router())
        .layer(recovery_layer(state.tracker.clone()));

    Router::new()
        .merge(health::router())
        .merge(recovered)
        .route("/api/error/uncaught-panic", get(errors::uncaught_panic))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
