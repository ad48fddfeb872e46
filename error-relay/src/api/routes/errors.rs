//! Error-simulation routes.
//!
//! Each handler calls one simulated service, which fails; the failure is
//! tracked with operation-specific details and answered with the tracked
//! error body.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    routing::get,
};
use serde_json::{Value, json};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::services::DomainError;
use crate::tracking::details_from;

/// Create the router for the recoverable error endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/database", get(database_error))
        .route("/validation", get(validation_error))
        .route("/network", get(network_error))
        .route("/auth", get(auth_error))
        .route("/payment", get(payment_error))
        .route("/panic", get(panic_error))
}

async fn track(state: &AppState, error: &DomainError, context: &str, details: Value) -> ApiError {
    let event = state
        .tracker
        .track(error, context, details_from(details))
        .await;
    ApiError::tracked(&event)
}

async fn database_error(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if let Err(e) = state.services.database.connect() {
        let details = json!({
            "database": "postgres",
            "host": "db.example.com",
            "port": 5432,
            "timeout": "30s",
        });
        return Err(track(&state, &e, "failed to connect to PostgreSQL", details).await);
    }
    Ok(Json(json!({"message": "database connected"})))
}

async fn validation_error(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let email = "not-an-email";
    let username = "john.doe";

    if let Err(e) = state.services.users.register_user(email, username) {
        let details = json!({
            "field": "email",
            "provided_value": email,
            "expected": "valid email format",
            "username": username,
        });
        return Err(track(&state, &e, "user registration validation failed", details).await);
    }
    Ok(Json(json!({"message": "user registered"})))
}

async fn network_error(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if let Err(e) = state.services.external_api.call_stripe_api("/v1/charges").await {
        let details = json!({
            "api": "stripe",
            "endpoint": "https://api.stripe.com/v1/charges",
            "method": "POST",
            "timeout": "10s",
        });
        return Err(track(&state, &e, "failed to call payment gateway API", details).await);
    }
    Ok(Json(json!({"message": "API call successful"})))
}

async fn auth_error(State(state): State<AppState>, request: Request) -> ApiResult<Json<Value>> {
    let username = "john.doe";

    if let Err(e) = state.services.auth.authenticate_user(username, "wrong") {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let details = json!({
            "username": username,
            "ip_address": client_ip(&request),
            "user_agent": user_agent,
            "attempts": 3,
        });
        return Err(track(&state, &e, "user authentication failed", details).await);
    }
    Ok(Json(json!({"message": "authentication successful"})))
}

async fn payment_error(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let user_id = 12345;
    let amount = 150.00;
    let card_last4 = "4242";

    if let Err(e) = state
        .services
        .payments
        .process_payment(user_id, amount, card_last4)
    {
        let details = json!({
            "user_id": user_id,
            "amount": amount,
            "currency": "USD",
            "card_last4": card_last4,
            "merchant_id": "merchant_abc123",
        });
        return Err(track(&state, &e, "payment processing failed", details).await);
    }
    Ok(Json(json!({"message": "payment successful"})))
}

/// Panics inside the recovery boundary.
async fn panic_error(State(state): State<AppState>) -> Json<Value> {
    let result = state.services.dangerous.process_array(&[]);
    Json(json!({ "result": result }))
}

/// Faults with no recovery; the process terminates.
pub(super) async fn uncaught_panic(State(state): State<AppState>) -> Json<Value> {
    state.services.dangerous.uncaught_panic_operation()
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address, else `"unknown"`.
fn client_ip(request: &Request) -> String {
    forwarded_ip(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    first_hop
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}
