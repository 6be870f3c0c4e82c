use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::constants::DEEPSCOPE_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::model::Claim;

/// Body of `POST /v1/claims/verify-batch`.
#[derive(Debug, Deserialize)]
pub struct VerifyBatchRequest {
    pub claims: Vec<Claim>,
}

#[instrument(skip(state, request), fields(claim = tracing::field::Empty))]
pub async fn verify_claim_handler(
    State(state): State<HandlerState>,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = request?;
    let claim: Claim = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid claim schema: {}", e)))?;
    validate_claim(&claim, None)?;
    tracing::Span::current().record("claim", tracing::field::display(&claim.text));

    let verdict = state.verifier.verify_claim(claim).await;

    Ok(make_response(verdict.status.as_str(), &verdict))
}

#[instrument(skip(state, request), fields(claims = tracing::field::Empty))]
pub async fn verify_batch_handler(
    State(state): State<HandlerState>,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = request?;
    let request: VerifyBatchRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid batch schema: {}", e)))?;
    for (index, claim) in request.claims.iter().enumerate() {
        validate_claim(claim, Some(index))?;
    }
    tracing::Span::current().record("claims", request.claims.len());
    debug!("Verifying batch");

    let batch = state.verifier.verify_batch(request.claims).await;

    Ok(make_response("processed", &batch))
}

pub(crate) fn validate_claim(claim: &Claim, index: Option<usize>) -> Result<(), GatewayError> {
    if claim.is_blank() {
        let message = match index {
            Some(i) => format!("claims[{}]: claim text must not be empty", i),
            None => "claim text must not be empty".to_string(),
        };
        return Err(GatewayError::InvalidRequest(message));
    }

    if let (Some(start), Some(end)) = (claim.start_time, claim.end_time)
        && end < start
    {
        return Err(GatewayError::InvalidRequest(format!(
            "end_time {} precedes start_time {}",
            end, start
        )));
    }

    Ok(())
}

fn make_response<T: serde::Serialize>(status: &'static str, body: &T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(DEEPSCOPE_STATUS_HEADER, HeaderValue::from_static(status));

    (StatusCode::OK, headers, Json(body)).into_response()
}
