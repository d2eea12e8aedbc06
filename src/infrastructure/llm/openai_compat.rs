use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completion adapter for any OpenAI-compatible `/v1/chat/completions`
/// endpoint (Ollama serves one). A single user message per call, no
/// streaming.
pub struct OpenAiCompatLlm {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiCompatLlm {
    pub fn new(base_url: impl Into<String>, config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl LlmService for OpenAiCompatLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "chat request failed");
                DomainError::transport(format!("chat request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "chat service returned an error");
            return Err(DomainError::protocol(format!(
                "chat service returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::protocol(format!("malformed chat response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::protocol("chat response has no choices"))?;

        let answer = choice.message.content.trim().to_string();
        if answer.is_empty() {
            warn!(model = %self.model, "chat service returned empty content");
        }

        Ok(answer)
    }
}
