//! HTTP gateway (Axum) exposing claim verification.
//!
//! Handlers run the verification inside the request future. If the client
//! disconnects, the future is dropped and in-flight adapter calls are aborted.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{VerifyBatchRequest, verify_batch_handler, verify_claim_handler};
pub use state::HandlerState;

use crate::constants::DEEPSCOPE_STATUS_HEADER;

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/claims/verify", post(verify_claim_handler))
        .route("/v1/claims/verify-batch", post(verify_batch_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(DEEPSCOPE_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
