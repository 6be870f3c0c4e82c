//! Fact-check search adapter (Google Fact Check Tools `claims:search`).
//!
//! Each publisher review's `textualRating` is interpreted on its own and the
//! results are tallied, so a claim rated "False" by one publisher and
//! "Accurate" by another comes back as `conflicting`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_FACTCHECK_URL, DEFAULT_LANGUAGE_CODE, FACTCHECK_SOURCE_NAME, HTTP_REQUEST_TIMEOUT,
};
use crate::model::{Evidence, SourceVerdict, Verification};

use super::error::{AdapterError, AdapterResult};
use super::rating::{RatingKeywords, interpret_rating, tally_ratings};
use super::retry::{RetryPolicy, retry_with_backoff};
use super::{AdapterKind, SourceAdapter};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub claims: Vec<SearchClaim>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClaim {
    pub text: Option<String>,
    pub claimant: Option<String>,
    #[serde(default)]
    pub claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    pub publisher: Option<Publisher>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub textual_rating: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Publisher {
    pub name: Option<String>,
    pub site: Option<String>,
}

impl ClaimReview {
    fn publisher_label(&self) -> &str {
        self.publisher
            .as_ref()
            .and_then(|p| p.name.as_deref().or(p.site.as_deref()))
            .unwrap_or("unknown publisher")
    }
}

pub struct FactCheckSearchAdapter {
    http: HttpClient,
    api_key: String,
    endpoint: String,
    language_code: String,
    retry: RetryPolicy,
    keywords: RatingKeywords,
}

impl std::fmt::Debug for FactCheckSearchAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactCheckSearchAdapter")
            .field("endpoint", &self.endpoint)
            .field("language_code", &self.language_code)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl FactCheckSearchAdapter {
    /// Fails with [`AdapterError::MissingCredential`] on an empty key.
    pub fn new(api_key: impl Into<String>) -> AdapterResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdapterError::MissingCredential {
                name: "GOOGLE_API_KEY",
            });
        }

        Ok(Self {
            http: HttpClient::builder()
                .timeout(HTTP_REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            api_key,
            endpoint: DEFAULT_FACTCHECK_URL.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            retry: RetryPolicy::default(),
            keywords: RatingKeywords::default(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_keywords(mut self, keywords: RatingKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn search(&self, claim: &str) -> AdapterResult<SearchResponse> {
        let response = retry_with_backoff(&self.retry, is_rate_limited, |_| {
            self.http
                .get(&self.endpoint)
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("query", claim),
                    ("languageCode", self.language_code.as_str()),
                ])
                .send()
        })
        .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| AdapterError::MalformedResponse {
                reason: e.to_string(),
            })
    }

    /// Maps a provider response to a verification and its evidence.
    pub fn interpret(&self, response: &SearchResponse) -> (Verification, Evidence) {
        if response.claims.is_empty() {
            return (
                Verification::NoData,
                Evidence::new("no claims returned by provider", Vec::new()),
            );
        }

        let reviews: Vec<&ClaimReview> = response
            .claims
            .iter()
            .flat_map(|c| c.claim_review.iter())
            .collect();
        if reviews.is_empty() {
            return (
                Verification::NoData,
                Evidence::new("no claim reviews found", Vec::new()),
            );
        }

        let rated: Vec<(&ClaimReview, Verification)> = reviews
            .into_iter()
            .map(|r| {
                let rating = r.textual_rating.as_deref().unwrap_or_default();
                (r, interpret_rating(rating, &self.keywords))
            })
            .collect();

        let verification = tally_ratings(rated.iter().map(|(_, v)| *v));

        let mut links: Vec<String> = Vec::new();
        for url in rated.iter().filter_map(|(r, _)| r.url.as_ref()) {
            if !links.contains(url) {
                links.push(url.clone());
            }
        }

        let details = rated
            .iter()
            .map(|(r, v)| {
                format!(
                    "{} rated \"{}\" ({})",
                    r.publisher_label(),
                    r.textual_rating.as_deref().unwrap_or(""),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        let summary = format!("{} claim review(s): {}", rated.len(), details);

        (verification, Evidence::new(summary, links))
    }
}

fn is_rate_limited(response: &reqwest::Response) -> bool {
    matches!(
        response.status(),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    )
}

/// Search results carry no graded confidence of their own.
pub fn search_confidence(verification: Verification) -> f64 {
    match verification {
        Verification::Match | Verification::Mismatch => 1.0,
        Verification::Conflicting => 0.5,
        Verification::NoData => 0.0,
    }
}

#[async_trait]
impl SourceAdapter for FactCheckSearchAdapter {
    fn name(&self) -> &str {
        FACTCHECK_SOURCE_NAME
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Search
    }

    async fn check(&self, claim: &str) -> SourceVerdict {
        let started = Instant::now();

        match self.search(claim).await {
            Ok(response) => {
                let (verification, evidence) = self.interpret(&response);
                debug!(
                    verification = %verification,
                    claims = response.claims.len(),
                    "Fact-check search complete"
                );
                SourceVerdict::new(
                    FACTCHECK_SOURCE_NAME,
                    verification,
                    search_confidence(verification),
                    evidence,
                    started.elapsed(),
                )
            }
            Err(e) => {
                warn!(error = %e, "Fact-check search failed");
                SourceVerdict::no_data(FACTCHECK_SOURCE_NAME, e.to_string(), started.elapsed())
            }
        }
    }
}
