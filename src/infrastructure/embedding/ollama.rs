use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding adapter for Ollama's native `/api/embeddings` endpoint.
///
/// One blocking call per text; no retry, no batching. The vector dimension
/// is static configuration and every response is checked against it.
pub struct OllamaEmbedding {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: EmbeddingOptions,
}

#[derive(Serialize)]
struct EmbeddingOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbedding {
    pub fn new(base_url: impl Into<String>, config: &EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }
}

#[async_trait]
impl EmbeddingService for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        debug!(model = %self.model, text_len = text.len(), "embedding text");

        let url = format!("{}/api/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.model,
            prompt: text,
            options: EmbeddingOptions { temperature: 0.0 },
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!(error = %e, "embedding request failed");
            DomainError::transport(format!("embedding request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "embedding service returned an error");
            return Err(DomainError::protocol(format!(
                "embedding service returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            DomainError::protocol(format!("malformed embedding response: {e}"))
        })?;

        let vector = parsed.embedding.ok_or_else(|| {
            DomainError::protocol("embedding response missing 'embedding' field")
        })?;

        if vector.len() != self.dimension {
            return Err(DomainError::protocol(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }

        Ok(Embedding::new(vector))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
