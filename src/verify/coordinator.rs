use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{
    AdapterKind, AdapterResult, FactCheckSearchAdapter, LlmAdapter, SourceAdapter,
};
use crate::config::Config;
use crate::constants::{
    DEFAULT_ADAPTER_TIMEOUT, DEFAULT_CLAIM_CONCURRENCY, DEFAULT_MAX_CONCURRENCY,
};
use crate::model::{BatchResult, Claim, ClaimVerdict, SourceVerdict};

use super::batch::aggregate_batch;

/// Scheduling policy for a [`Verifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierConfig {
    /// Per-adapter timeout. `None` waits indefinitely.
    pub adapter_timeout: Option<Duration>,
    /// When set, an LLM verdict with data and at least this confidence is
    /// returned alone and the remaining adapters are not called.
    pub short_circuit_threshold: Option<f64>,
    /// Adapter calls in flight at once, across all claims.
    pub max_concurrency: usize,
    /// Claims checked in parallel inside one batch.
    pub claim_concurrency: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Some(DEFAULT_ADAPTER_TIMEOUT),
            short_circuit_threshold: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            claim_concurrency: DEFAULT_CLAIM_CONCURRENCY,
        }
    }
}

impl From<&Config> for VerifierConfig {
    fn from(config: &Config) -> Self {
        Self {
            adapter_timeout: config.adapter_timeout,
            short_circuit_threshold: config.short_circuit_threshold,
            max_concurrency: config.max_concurrency,
            claim_concurrency: config.claim_concurrency,
        }
    }
}

/// Fans claims out to source adapters and aggregates what comes back.
///
/// Adapters run as tasks on the tokio runtime, bounded by a shared semaphore.
/// Dropping an in-flight `verify_*` future aborts its adapter tasks and
/// releases their permits. A blocking adapter keeps its permit until its
/// thread finishes, whether it was abandoned or timed out.
pub struct Verifier {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    config: VerifierConfig,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("adapters", &self.adapter_names())
            .field("config", &self.config)
            .finish()
    }
}

impl Verifier {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, config: VerifierConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            adapters,
            config,
            permits,
        }
    }

    /// Builds the adapters named by `config`: the LLM adapter when an OpenAI
    /// key is present, then the fact-check search adapter when a Google key is.
    pub fn from_config(config: &Config) -> AdapterResult<Self> {
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            let llm = LlmAdapter::openai(key.as_str(), Some(config.llm_model.as_str()))?;
            adapters.push(Arc::new(llm));
        }

        if let Some(key) = &config.google_api_key {
            let search = FactCheckSearchAdapter::new(key.as_str())?
                .with_endpoint(config.factcheck_url.as_str())
                .with_language_code(config.language_code.as_str());
            adapters.push(Arc::new(search));
        }

        Ok(Self::new(adapters, VerifierConfig::from(config)))
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Runs every adapter against `claim` and returns their verdicts in
    /// registration order (or a single LLM verdict when short-circuiting).
    pub async fn check_sources(&self, claim: &str) -> Vec<SourceVerdict> {
        let all: Vec<usize> = (0..self.adapters.len()).collect();

        let Some(threshold) = self.config.short_circuit_threshold else {
            return self.run_adapters(claim, &all).await;
        };

        let (llm, rest): (Vec<usize>, Vec<usize>) = all
            .iter()
            .copied()
            .partition(|&i| self.adapters[i].kind() == AdapterKind::Llm);
        if llm.is_empty() || rest.is_empty() {
            return self.run_adapters(claim, &all).await;
        }

        let first = self.run_adapters(claim, &llm).await;
        if let Some(trusted) = first
            .iter()
            .find(|v| v.verification.has_data() && v.confidence >= threshold)
        {
            info!(
                source = %trusted.source_name,
                confidence = trusted.confidence,
                threshold,
                "Short-circuiting on confident LLM verdict"
            );
            return vec![trusted.clone()];
        }

        let second = self.run_adapters(claim, &rest).await;

        let mut slots: Vec<Option<SourceVerdict>> = vec![None; self.adapters.len()];
        for (index, verdict) in llm.into_iter().zip(first).chain(rest.into_iter().zip(second)) {
            slots[index] = Some(verdict);
        }
        slots.into_iter().flatten().collect()
    }

    async fn run_adapters(&self, claim: &str, indices: &[usize]) -> Vec<SourceVerdict> {
        let mut tasks = JoinSet::new();

        for (slot, &index) in indices.iter().enumerate() {
            let adapter = Arc::clone(&self.adapters[index]);
            let permits = Arc::clone(&self.permits);
            let timeout = self.config.adapter_timeout;
            let claim = claim.to_string();

            tasks.spawn(async move {
                let verdict = run_adapter(adapter, permits, &claim, timeout).await;
                (slot, verdict)
            });
        }

        let mut slots: Vec<Option<SourceVerdict>> = vec![None; indices.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, verdict)) => slots[slot] = Some(verdict),
                Err(e) => warn!(error = %e, "Adapter task failed"),
            }
        }

        slots
            .into_iter()
            .zip(indices)
            .map(|(verdict, &index)| {
                verdict.unwrap_or_else(|| {
                    SourceVerdict::no_data(
                        self.adapters[index].name(),
                        "adapter task failed",
                        Duration::ZERO,
                    )
                })
            })
            .collect()
    }

    #[instrument(skip(self, claim), fields(claim = %claim.text))]
    pub async fn verify_claim(&self, claim: Claim) -> ClaimVerdict {
        let started = Instant::now();
        let sources = self.check_sources(&claim.text).await;
        let verdict =
            ClaimVerdict::from_sources(claim, sources, Some(started.elapsed().as_secs_f64()));

        info!(
            status = %verdict.status,
            confidence = verdict.confidence,
            sources_with_data = verdict.sources_with_data,
            "Claim verified"
        );
        verdict
    }

    /// Verifies `claims` (up to `claim_concurrency` at a time) and rolls the
    /// verdicts up. Result order always matches input order. A claim text
    /// that appears more than once is checked once and every copy shares its
    /// sources and processing time.
    #[instrument(skip(self, claims), fields(claims = claims.len()))]
    pub async fn verify_batch(&self, claims: Vec<Claim>) -> BatchResult {
        let concurrency = self.config.claim_concurrency.max(1);

        let texts: Vec<String> = {
            let mut seen = HashSet::with_capacity(claims.len());
            claims
                .iter()
                .filter(|claim| seen.insert(claim.text.as_str()))
                .map(|claim| claim.text.clone())
                .collect()
        };
        if texts.len() < claims.len() {
            debug!(
                distinct = texts.len(),
                total = claims.len(),
                "Checking repeated claims once"
            );
        }

        let checked: Vec<(String, Vec<SourceVerdict>, f64)> = stream::iter(texts)
            .map(|text| async move {
                let started = Instant::now();
                let sources = self.check_sources(&text).await;
                let elapsed = started.elapsed().as_secs_f64();
                (text, sources, elapsed)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut sources_by_claim = HashMap::with_capacity(checked.len());
        let mut processing_times = HashMap::with_capacity(checked.len());
        for (text, sources, elapsed) in checked {
            sources_by_claim.insert(text.clone(), sources);
            processing_times.insert(text, elapsed);
        }

        let batch = aggregate_batch(&claims, &sources_by_claim, &processing_times);
        info!(
            total = batch.total_claims,
            verified = batch.verified_claims,
            average_confidence = batch.average_confidence,
            "Batch verified"
        );
        batch
    }
}

async fn run_adapter(
    adapter: Arc<dyn SourceAdapter>,
    permits: Arc<Semaphore>,
    claim: &str,
    timeout: Option<Duration>,
) -> SourceVerdict {
    let started = Instant::now();

    let Ok(permit) = permits.acquire_owned().await else {
        return SourceVerdict::no_data(adapter.name(), "worker pool closed", started.elapsed());
    };

    let call = adapter.check_with_permit(claim, permit);
    let verdict = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(source = adapter.name(), ?limit, "Adapter timed out");
                SourceVerdict::no_data(
                    adapter.name(),
                    format!("timed out after {:.1}s", limit.as_secs_f64()),
                    started.elapsed(),
                )
            }
        },
        None => call.await,
    };

    debug!(
        source = adapter.name(),
        verification = %verdict.verification,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Adapter finished"
    );
    verdict
}
