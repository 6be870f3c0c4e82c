//! Deterministic adapters and chat backends for tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::model::{Evidence, SourceVerdict, Verification};

use super::error::{AdapterError, AdapterResult};
use super::llm::ChatBackend;
use super::{AdapterKind, BlockingSourceAdapter, SourceAdapter};

/// Returns the same verdict for every claim, optionally after a delay.
#[derive(Clone)]
pub struct StaticAdapter {
    name: String,
    kind: AdapterKind,
    verification: Verification,
    confidence: f64,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticAdapter {
    pub fn new(name: &str, verification: Verification, confidence: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: AdapterKind::Search,
            verification,
            confidence,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn llm(name: &str, verification: Verification, confidence: f64) -> Self {
        Self::new(name, verification, confidence).with_kind(AdapterKind::Llm)
    }

    pub fn with_kind(mut self, kind: AdapterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `check` calls that have started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared call counter (survives moving the adapter into an `Arc`).
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SourceAdapter for StaticAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn check(&self, claim: &str) -> SourceVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        SourceVerdict::new(
            self.name.as_str(),
            self.verification,
            self.confidence,
            Evidence::new(format!("static verdict for: {claim}"), Vec::new()),
            started.elapsed(),
        )
    }
}

/// Panics on every call. Exercises the coordinator's task-failure path.
pub struct PanickingAdapter;

#[async_trait]
impl SourceAdapter for PanickingAdapter {
    fn name(&self) -> &str {
        "panicking"
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Search
    }

    async fn check(&self, _claim: &str) -> SourceVerdict {
        panic!("adapter panicked");
    }
}

/// Blocking adapter that sleeps the calling thread before answering.
pub struct SleepyBlockingAdapter {
    pub verification: Verification,
    pub sleep: Duration,
}

impl BlockingSourceAdapter for SleepyBlockingAdapter {
    fn name(&self) -> &str {
        "sleepy-blocking"
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Search
    }

    fn check_blocking(&self, _claim: &str) -> SourceVerdict {
        let started = Instant::now();
        std::thread::sleep(self.sleep);
        SourceVerdict::new(
            "sleepy-blocking",
            self.verification,
            1.0,
            Evidence::default(),
            started.elapsed(),
        )
    }
}

/// Chat backend returning a fixed reply (or a fixed error).
pub struct ScriptedChatBackend {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChatBackend {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            reply: Err(error.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChatBackend {
    async fn complete(&self, _system: &str, prompt: &str) -> AdapterResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.reply.clone().map_err(AdapterError::Model)
    }
}
