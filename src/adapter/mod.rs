//! Source adapters: one external evidence provider each.
//!
//! An adapter turns a claim string into exactly one [`SourceVerdict`]. It must
//! never fail at call time; network errors, malformed responses and exhausted
//! retries all come back as a `no_data` verdict whose evidence summary carries
//! the error text. Missing credentials are caught when the adapter is built.
//!
//! Adapters that can only do blocking I/O implement [`BlockingSourceAdapter`]
//! and are wrapped in [`Blocking`], which runs them on the blocking thread pool.

pub mod error;
pub mod factcheck;
pub mod llm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod rating;
pub mod retry;


use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::OwnedSemaphorePermit;

use crate::model::SourceVerdict;

pub use error::{AdapterError, AdapterResult};
pub use factcheck::FactCheckSearchAdapter;
pub use llm::{ChatBackend, GenaiBackend, LlmAdapter, LlmReply, parse_llm_reply};
pub use rating::{RatingKeywords, interpret_rating, tally_ratings};
pub use retry::{RetryPolicy, retry_with_backoff, uniform_jitter};

/// Broad family of an adapter. The coordinator's short-circuit policy only
/// trusts [`AdapterKind::Llm`] results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Llm,
    Search,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable display name, copied into every verdict's `source_name`.
    fn name(&self) -> &str;

    fn kind(&self) -> AdapterKind;

    /// Checks one claim. Infallible by contract: failures are `no_data`.
    async fn check(&self, claim: &str) -> SourceVerdict;

    /// Checks one claim while holding a worker-pool slot. The slot must stay
    /// taken until the work it covers has stopped, even if this future is
    /// dropped first.
    async fn check_with_permit(
        &self,
        claim: &str,
        permit: OwnedSemaphorePermit,
    ) -> SourceVerdict {
        let verdict = self.check(claim).await;
        drop(permit);
        verdict
    }
}

/// An adapter whose provider call blocks the current thread.
pub trait BlockingSourceAdapter: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn kind(&self) -> AdapterKind;

    fn check_blocking(&self, claim: &str) -> SourceVerdict;
}

/// Runs a [`BlockingSourceAdapter`] on tokio's blocking pool so that its
/// I/O and any retry sleeps hold a worker thread, not the async scheduler.
pub struct Blocking<A> {
    inner: Arc<A>,
}

impl<A: BlockingSourceAdapter> Blocking<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// A blocking thread cannot be cancelled, so `permit` moves onto it and is
    /// released only when `check_blocking` returns.
    async fn run(&self, claim: &str, permit: Option<OwnedSemaphorePermit>) -> SourceVerdict {
        let started = Instant::now();
        let inner = Arc::clone(&self.inner);
        let claim = claim.to_string();

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            inner.check_blocking(&claim)
        });

        match task.await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(
                    source = self.inner.name(),
                    error = %e,
                    "Blocking adapter task failed"
                );
                SourceVerdict::no_data(
                    self.inner.name(),
                    format!("adapter task failed: {e}"),
                    started.elapsed(),
                )
            }
        }
    }
}

#[async_trait]
impl<A: BlockingSourceAdapter> SourceAdapter for Blocking<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> AdapterKind {
        self.inner.kind()
    }

    async fn check(&self, claim: &str) -> SourceVerdict {
        self.run(claim, None).await
    }

    async fn check_with_permit(
        &self,
        claim: &str,
        permit: OwnedSemaphorePermit,
    ) -> SourceVerdict {
        self.run(claim, Some(permit)).await
    }
}
