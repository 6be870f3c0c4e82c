//! Cross-cutting, shared constants.
//!
//! Defaults here are used by [`Config`](crate::config::Config) and by the adapter
//! constructors when no override is given.

use std::time::Duration;

/// Per-adapter timeout applied by the coordinator.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on adapter calls in flight across all claims.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Claims verified in parallel inside one batch.
pub const DEFAULT_CLAIM_CONCURRENCY: usize = 1;

/// Attempts made by the search adapter before giving up on a rate-limited call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

pub const DEFAULT_FACTCHECK_URL: &str =
    "https://factchecktools.googleapis.com/v1alpha1/claims:search";

pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Display name of the fact-check search source.
pub const FACTCHECK_SOURCE_NAME: &str = "Google Fact Check Tools Claims";

/// Display name of the LLM reasoning source.
pub const LLM_SOURCE_NAME: &str = "LLM Fact Checker";

/// Timeout on a single outbound HTTP request (independent of retries).
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response header naming the outcome of an HTTP request.
pub const DEEPSCOPE_STATUS_HEADER: &str = "x-deepscope-status";
