//! Deepscope library crate (used by the server binary and integration tests).
//!
//! Verifies factual claims against several evidence sources and aggregates
//! the per-source judgments into a claim verdict and a batch summary.
//!
//! # Public API Surface
//!
//! ## Records
//! - [`Claim`], [`SourceVerdict`], [`ClaimVerdict`], [`BatchResult`]
//! - [`Verification`] (per source) and [`VerdictStatus`] (per claim)
//!
//! ## Pipeline
//! - [`Verifier`] - concurrent fan-out to adapters, `verify_claim` / `verify_batch`
//! - [`aggregate`], [`aggregate_batch`] - pure aggregation over source verdicts
//!
//! ## Adapters
//! - [`SourceAdapter`] - one external evidence provider
//! - [`LlmAdapter`], [`FactCheckSearchAdapter`] - the two built-in providers
//! - [`Blocking`] - runs a [`BlockingSourceAdapter`] on the blocking pool
//!
//! ## Test/Mock Support
//! Deterministic adapters are available behind `#[cfg(any(test, feature = "mock"))]`
//! in [`adapter::mock`].

pub mod adapter;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod model;
pub mod verify;

pub use adapter::{
    AdapterError, AdapterKind, AdapterResult, Blocking, BlockingSourceAdapter, ChatBackend,
    FactCheckSearchAdapter, GenaiBackend, LlmAdapter, RatingKeywords, RetryPolicy, SourceAdapter,
    interpret_rating, parse_llm_reply, tally_ratings,
};
pub use config::{Config, ConfigError};
pub use model::{
    BatchResult, Claim, ClaimVerdict, Evidence, ResponseMetadata, SourceVerdict, Verification,
    VerdictStatus,
};
pub use verify::{Verifier, VerifierConfig, aggregate, aggregate_batch};
