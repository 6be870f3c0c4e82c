mod common;

use common::harness::{FakeReply, search_response, spawn_fake_factcheck};
use deepscope::adapter::RetryPolicy;
use deepscope::constants::FACTCHECK_SOURCE_NAME;
use deepscope::{FactCheckSearchAdapter, SourceAdapter, Verification};
use std::time::{Duration, Instant};

fn adapter_for(url: &str) -> FactCheckSearchAdapter {
    FactCheckSearchAdapter::new("test-key")
        .unwrap()
        .with_endpoint(url)
        .with_retry_policy(RetryPolicy::immediate(3))
}

#[tokio::test]
async fn test_false_rating_is_mismatch() {
    let server = spawn_fake_factcheck(FakeReply::Json(search_response(&[("Snopes", "False")])))
        .await
        .unwrap();

    let verdict = adapter_for(&server.search_url())
        .check("The Earth is flat")
        .await;

    assert_eq!(verdict.source_name, FACTCHECK_SOURCE_NAME);
    assert_eq!(verdict.verification, Verification::Mismatch);
    assert_eq!(verdict.confidence, 1.0);
    assert_eq!(
        verdict.evidence.reference_links,
        vec!["https://snopes.example/review"]
    );
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_request_carries_key_query_and_language() {
    let server = spawn_fake_factcheck(FakeReply::Json(search_response(&[("AFP", "True")])))
        .await
        .unwrap();

    let verdict = adapter_for(&server.search_url())
        .with_language_code("fr-FR")
        .check("Water boils at 100°C at sea level")
        .await;

    assert_eq!(verdict.verification, Verification::Match);
    let queries = server.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["key"], "test-key");
    assert_eq!(queries[0]["query"], "Water boils at 100°C at sea level");
    assert_eq!(queries[0]["languageCode"], "fr-FR");
}

#[tokio::test]
async fn test_mixed_publishers_conflict() {
    let server = spawn_fake_factcheck(FakeReply::Json(search_response(&[
        ("Snopes", "Mostly False"),
        ("PolitiFact", "Accurate"),
    ])))
    .await
    .unwrap();

    let verdict = adapter_for(&server.search_url()).check("claim").await;

    assert_eq!(verdict.verification, Verification::Conflicting);
    assert_eq!(verdict.confidence, 0.5);
    assert_eq!(verdict.evidence.reference_links.len(), 2);
}

#[tokio::test]
async fn test_no_claims_is_no_data() {
    let server = spawn_fake_factcheck(FakeReply::Json(serde_json::json!({})))
        .await
        .unwrap();

    let verdict = adapter_for(&server.search_url()).check("claim").await;

    assert_eq!(verdict.verification, Verification::NoData);
    assert_eq!(verdict.evidence.summary, "no claims returned by provider");
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let server = spawn_fake_factcheck(FakeReply::Status(403)).await.unwrap();

    let verdict = adapter_for(&server.search_url()).check("claim").await;

    assert_eq!(verdict.verification, Verification::NoData);
    assert_eq!(verdict.confidence, 0.0);
    assert_eq!(verdict.evidence.summary, "provider returned status 403");
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn test_rate_limit_backs_off_between_attempts() {
    let server = spawn_fake_factcheck(FakeReply::Status(429)).await.unwrap();
    let policy = RetryPolicy::immediate(3).with_base_delay(Duration::from_millis(20));
    let adapter = adapter_for(&server.search_url()).with_retry_policy(policy);

    let started = Instant::now();
    let verdict = adapter.check("claim").await;

    assert_eq!(verdict.evidence.summary, "provider returned status 429");
    assert_eq!(server.hits(), 3);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = spawn_fake_factcheck(FakeReply::Status(500)).await.unwrap();

    let verdict = adapter_for(&server.search_url()).check("claim").await;

    assert_eq!(verdict.verification, Verification::NoData);
    assert_eq!(verdict.evidence.summary, "provider returned status 500");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_no_data() {
    let server = spawn_fake_factcheck(FakeReply::Raw("<html>oops</html>".to_string()))
        .await
        .unwrap();

    let verdict = adapter_for(&server.search_url()).check("claim").await;

    assert_eq!(verdict.verification, Verification::NoData);
    assert!(
        verdict
            .evidence
            .summary
            .starts_with("malformed provider response")
    );
}
