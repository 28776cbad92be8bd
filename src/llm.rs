//! Chat-completion client for the external advisor
//!
//! Speaks the OpenAI-compatible `chat/completions` wire format.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::error::AdvisorError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Value shipped in sample configs; treated the same as a missing key
pub const PLACEHOLDER_API_KEY: &str = "sk-proj-your-openai-api-key-here";

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// Anything that can turn a system prompt plus a user message into text
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> crate::Result<String>;
}

/// True when the key is present and not the sample placeholder
pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

/// Reusable chat-completion client (connection-pooled)
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let api_key = api_key.into();
        if !is_usable_api_key(&api_key) {
            return Err(AdvisorError::ConfigError(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_url: api_url.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, system_prompt: &str, user_message: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> crate::Result<String> {
        let request = self.build_request(system_prompt, user_message);

        info!(model = %self.model, "Calling chat completion API");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                AdvisorError::LlmError(format!("chat completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat completion error response ({}): {}", status, error_text);
            return Err(AdvisorError::LlmError(format!(
                "chat completion API error: {}",
                status
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat completion response: {}", e);
            AdvisorError::LlmError(format!("chat completion parse error: {}", e))
        })?;

        extract_content(body)
    }
}

/// First choice's message content; empty or missing content is an error
fn extract_content(response: ChatResponse) -> crate::Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AdvisorError::LlmError("Empty response from chat completion".to_string()))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
