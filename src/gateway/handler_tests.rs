//! Router-level tests for the gateway handlers.

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::adapter::SourceAdapter;
use crate::adapter::mock::StaticAdapter;
use crate::constants::DEEPSCOPE_STATUS_HEADER;
use crate::gateway::create_router_with_state;
use crate::gateway::error::GatewayError;
use crate::gateway::handler::validate_claim;
use crate::gateway::state::HandlerState;
use crate::model::{Claim, Verification};
use crate::verify::{Verifier, VerifierConfig};

fn test_router(adapters: Vec<Arc<dyn SourceAdapter>>) -> Router {
    let verifier = Verifier::new(adapters, VerifierConfig::default());
    create_router_with_state(HandlerState::new(verifier))
}

fn flat_earth_router() -> Router {
    test_router(vec![
        Arc::new(StaticAdapter::llm("llm", Verification::Mismatch, 0.9)),
        Arc::new(StaticAdapter::new("search", Verification::NoData, 0.0)),
    ])
}

async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

mod validate_claim_tests {
    use super::*;

    #[test]
    fn test_accepts_plain_claim() {
        assert!(validate_claim(&Claim::new("The Earth is flat"), None).is_ok());
        assert!(validate_claim(&Claim::new("x").with_span(1.0, 1.0), None).is_ok());
    }

    #[test]
    fn test_rejects_blank_text() {
        let err = validate_claim(&Claim::new("   "), Some(2)).unwrap_err();
        assert!(
            matches!(err, GatewayError::InvalidRequest(ref m) if m.starts_with("claims[2]"))
        );
    }

    #[test]
    fn test_rejects_inverted_span() {
        let claim = Claim::new("x").with_span(10.0, 2.0);
        assert!(matches!(
            validate_claim(&claim, None),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}

mod router_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = flat_earth_router();
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let status = response.headers().get(DEEPSCOPE_STATUS_HEADER).unwrap();
        assert_eq!(status.to_str().unwrap(), "healthy");
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_verify_claim() {
        let router = flat_earth_router();

        let response = post_json(
            &router,
            "/v1/claims/verify",
            serde_json::json!({"text": "The Earth is flat", "start_time": 12.5, "end_time": 15.0}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let status = response.headers().get(DEEPSCOPE_STATUS_HEADER).unwrap();
        assert_eq!(status.to_str().unwrap(), "false");

        let body = body_json(response).await;
        assert_eq!(body["claim"]["text"], "The Earth is flat");
        assert_eq!(body["claim"]["start_time"], 12.5);
        assert_eq!(body["status"], "false");
        assert_eq!(body["confidence"], 1.0);
        assert_eq!(body["sources_checked"], 2);
        assert_eq!(body["sources_with_data"], 1);
        assert_eq!(body["sources"][0]["source_name"], "llm");
        assert_eq!(body["sources"][1]["verification"], "no_data");
    }

    #[tokio::test]
    async fn test_verify_claim_rejects_empty_text() {
        let router = flat_earth_router();

        let response =
            post_json(&router, "/v1/claims/verify", serde_json::json!({"text": ""})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 400);
        assert!(body["error"].as_str().unwrap().contains("must not be empty"));
    }

    #[tokio::test]
    async fn test_malformed_json_gets_error_body() {
        let router = flat_earth_router();

        for uri in ["/v1/claims/verify", "/v1/claims/verify-batch"] {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from("{\"text\": "))
                .unwrap();

            let response = router.clone().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let status = response.headers().get(DEEPSCOPE_STATUS_HEADER).unwrap();
            assert_eq!(status.to_str().unwrap(), "invalid_request");
            let body = body_json(response).await;
            assert_eq!(body["code"], 400);
            assert!(body["error"].as_str().unwrap().contains("Invalid JSON body"));
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_gets_error_body() {
        let router = flat_earth_router();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/claims/verify")
            .body(Body::from(r#"{"text": "The Earth is flat"}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], 400);
    }

    #[tokio::test]
    async fn test_verify_claim_rejects_bad_schema() {
        let router = flat_earth_router();

        let response =
            post_json(&router, "/v1/claims/verify", serde_json::json!({"claim": "x"})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let status = response.headers().get(DEEPSCOPE_STATUS_HEADER).unwrap();
        assert_eq!(status.to_str().unwrap(), "invalid_request");
    }

    #[tokio::test]
    async fn test_verify_batch() {
        let router = test_router(vec![Arc::new(
            StaticAdapter::new("search", Verification::Match, 1.0)
                .with_delay(Duration::from_millis(5)),
        )]);

        let response = post_json(
            &router,
            "/v1/claims/verify-batch",
            serde_json::json!({"claims": [
                {"text": "Water boils at 100°C at sea level"},
                {"text": "The Moon orbits the Earth"}
            ]}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_claims"], 2);
        assert_eq!(body["verified_claims"], 2);
        assert_eq!(body["unverified_claims"], 0);
        assert_eq!(body["average_confidence"], 1.0);
        assert_eq!(body["results"][1]["claim"]["text"], "The Moon orbits the Earth");
        assert!(body["batch_id"].is_string());
    }

    #[tokio::test]
    async fn test_verify_batch_rejects_blank_member() {
        let router = flat_earth_router();

        let response = post_json(
            &router,
            "/v1/claims/verify-batch",
            serde_json::json!({"claims": [{"text": "ok"}, {"text": " "}]}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("claims[1]"));
    }

    #[tokio::test]
    async fn test_verify_batch_empty_list() {
        let router = flat_earth_router();

        let response = post_json(
            &router,
            "/v1/claims/verify-batch",
            serde_json::json!({"claims": []}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_claims"], 0);
        assert_eq!(body["average_confidence"], 0.0);
    }
}
