//! CFO advisor
//!
//! Answers free-text finance questions about the current scenario. An
//! external chat-completion responder is tried first when configured; any
//! failure (transport, status, empty body, timeout) falls back to the local
//! rule-based answer, so callers always get text.

pub mod format;
pub mod intent;
pub mod prompt;
pub mod responses;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::engine::compute_metrics;
use crate::error::AdvisorError;
use crate::llm::ChatCompletion;
use crate::models::{RichText, ScenarioInput};

pub use intent::{classify_intent, detect_sub_intent, IntentCategory, SubIntent};
pub use prompt::render_system_prompt;
pub use responses::respond;

pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(15);

/// Where an answer came from. Kept out of serialized replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    ExternalAi,
    RuleBased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorReply {
    pub text: RichText,
    pub category: IntentCategory,
    #[serde(skip, default = "rule_based")]
    pub source: ResponseSource,
}

fn rule_based() -> ResponseSource {
    ResponseSource::RuleBased
}

/// Answers questions, preferring the external responder when present
#[derive(Clone)]
pub struct Advisor {
    responder: Option<Arc<dyn ChatCompletion>>,
    timeout: Duration,
}

impl Advisor {
    /// Advisor that only uses the rule-based responder
    pub fn local() -> Self {
        Self {
            responder: None,
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_responder(responder: Arc<dyn ChatCompletion>, timeout: Duration) -> Self {
        Self {
            responder: Some(responder),
            timeout,
        }
    }

    pub fn has_external_responder(&self) -> bool {
        self.responder.is_some()
    }

    /// Answer with the local rule-based responder only
    pub fn local_answer(&self, query: &str, input: &ScenarioInput) -> AdvisorReply {
        let metrics = compute_metrics(input);
        let category = classify_intent(query);
        debug!(%category, "Answering with rule-based responder");

        AdvisorReply {
            text: respond(category, query, input, &metrics),
            category,
            source: ResponseSource::RuleBased,
        }
    }

    /// Answer a question, falling back to the local responder on any
    /// external failure
    pub async fn ask(&self, query: &str, input: &ScenarioInput) -> AdvisorReply {
        let Some(responder) = &self.responder else {
            return self.local_answer(query, input);
        };

        match self.ask_external(responder.as_ref(), query, input).await {
            Ok(text) => AdvisorReply {
                text: RichText::new(text),
                category: classify_intent(query),
                source: ResponseSource::ExternalAi,
            },
            Err(e) => {
                warn!("External advisor failed, using fallback: {}", e);
                self.local_answer(query, input)
            }
        }
    }

    async fn ask_external(
        &self,
        responder: &dyn ChatCompletion,
        query: &str,
        input: &ScenarioInput,
    ) -> crate::Result<String> {
        let metrics = compute_metrics(input);
        let system_prompt = render_system_prompt(input, &metrics);

        let text = tokio::time::timeout(self.timeout, responder.complete(&system_prompt, query))
            .await
            .map_err(|_| AdvisorError::LlmTimeout(self.timeout.as_secs()))??;

        if text.trim().is_empty() {
            return Err(AdvisorError::LlmError("empty completion".to_string()));
        }
        Ok(text)
    }
}

impl Default for Advisor {
    fn default() -> Self {
        Self::local()
    }
}
