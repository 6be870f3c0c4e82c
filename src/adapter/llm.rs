//! LLM reasoning adapter.
//!
//! One chat call per claim with a fixed instruction demanding a JSON reply.
//! A reply that does not parse into [`LlmReply`] is an adapter failure
//! (`no_data`, confidence 0); it is never re-prompted.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_LLM_MODEL, LLM_SOURCE_NAME};
use crate::model::{Evidence, SourceVerdict, Verification};

use super::error::{AdapterError, AdapterResult};
use super::{AdapterKind, SourceAdapter};

const SYSTEM_PROMPT: &str = "You are a reliable fact-checker.";

const INSTRUCTION: &str = "Evaluate the following claim for its truthfulness. \
Respond with a single JSON object and nothing else, with exactly these keys: \
\"verification\" (one of \"match\", \"mismatch\", \"no_data\", \"conflicting\"; \
\"match\" if the claim is true, \"mismatch\" if it is false, \"conflicting\" if \
credible evidence disagrees, \"no_data\" if you cannot tell), \
\"confidence\" (a number from 0 to 1), \
\"summary\" (a short human-readable explanation), and \
\"reference_links\" (an array of supporting URLs, possibly empty).";

/// Builds the user message for one claim.
pub fn build_prompt(claim: &str) -> String {
    format!("{INSTRUCTION}\n\nClaim: {claim}")
}

/// Model transport. Returns the raw text of the first reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> AdapterResult<String>;
}

/// [`ChatBackend`] over a `genai` client with an explicit API key.
pub struct GenaiBackend {
    client: Client,
    model: String,
}

impl GenaiBackend {
    /// Fails with [`AdapterError::MissingCredential`] on an empty key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> AdapterResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdapterError::MissingCredential {
                name: "OPENAI_API_KEY",
            });
        }

        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );
        let client = Client::builder().with_auth_resolver(auth_resolver).build();

        Ok(Self {
            client,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for GenaiBackend {
    async fn complete(&self, system: &str, prompt: &str) -> AdapterResult<String> {
        let request =
            ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(prompt)]);
        let options = ChatOptions::default().with_temperature(0.0);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await
            .map_err(|e| AdapterError::Model(e.to_string()))?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AdapterError::MalformedReply {
                reason: "model returned no text".to_string(),
            })
    }
}

/// Structured reply required from the model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmReply {
    pub verification: Verification,
    pub confidence: f64,
    pub summary: String,
    pub reference_links: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    verification: Option<String>,
    confidence: Option<f64>,
    summary: Option<String>,
    #[serde(default)]
    reference_links: Vec<String>,
}

/// Parses the model's reply. A surrounding Markdown code fence is removed
/// first; anything else that is not the required JSON object is rejected.
pub fn parse_llm_reply(text: &str) -> AdapterResult<LlmReply> {
    let body = strip_code_fence(text);
    let raw: RawReply = serde_json::from_str(body).map_err(|e| AdapterError::MalformedReply {
        reason: format!("reply is not the required JSON object: {e}"),
    })?;

    let missing = |field: &str| AdapterError::MalformedReply {
        reason: format!("reply is missing `{field}`"),
    };

    let verification = raw
        .verification
        .ok_or_else(|| missing("verification"))?
        .parse::<Verification>()
        .map_err(|reason| AdapterError::MalformedReply { reason })?;

    let confidence = raw.confidence.ok_or_else(|| missing("confidence"))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(AdapterError::MalformedReply {
            reason: format!("confidence {confidence} is outside [0, 1]"),
        });
    }

    let summary = raw.summary.ok_or_else(|| missing("summary"))?;

    Ok(LlmReply {
        verification,
        confidence,
        summary,
        reference_links: raw.reference_links,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

pub struct LlmAdapter {
    backend: Arc<dyn ChatBackend>,
}

impl LlmAdapter {
    /// Adapter over OpenAI through `genai`.
    pub fn openai(api_key: impl Into<String>, model: Option<&str>) -> AdapterResult<Self> {
        let backend = GenaiBackend::new(api_key, model.unwrap_or(DEFAULT_LLM_MODEL))?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    pub fn with_backend(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SourceAdapter for LlmAdapter {
    fn name(&self) -> &str {
        LLM_SOURCE_NAME
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Llm
    }

    async fn check(&self, claim: &str) -> SourceVerdict {
        let started = Instant::now();
        let prompt = build_prompt(claim);

        let reply = self
            .backend
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .and_then(|text| parse_llm_reply(&text));

        match reply {
            Ok(reply) => {
                debug!(
                    verification = %reply.verification,
                    confidence = reply.confidence,
                    "LLM check complete"
                );
                SourceVerdict::new(
                    LLM_SOURCE_NAME,
                    reply.verification,
                    reply.confidence,
                    Evidence::new(reply.summary, reply.reference_links),
                    started.elapsed(),
                )
            }
            Err(e) => {
                warn!(error = %e, "LLM check failed");
                SourceVerdict::no_data(LLM_SOURCE_NAME, e.to_string(), started.elapsed())
            }
        }
    }
}
