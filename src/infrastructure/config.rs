use serde::Deserialize;

use crate::domain::{
    ChunkStrategy, ChunkingConfig, DomainError, FailurePolicy, IdPolicy, SyncConfig,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ollama_base_url: String,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkingConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub api_key: String,
}

/// Which vector store backend holds the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Fresh in-memory collection per session, discarded afterwards.
    Ephemeral,
    /// On-disk collections at a fixed path, reused across runs.
    Persistent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: String,
    pub collection: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://127.0.0.1:11434".to_string(),
            embedding: EmbeddingConfig {
                model: "turingdance/m3e-base".to_string(),
                dimension: 768,
            },
            llm: LlmConfig {
                model: "granite4:3b".to_string(),
                temperature: 0.1,
                api_key: "ollama".to_string(),
            },
            chunking: ChunkingConfig {
                strategy: ChunkStrategy::BoundaryAware,
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            store: StoreConfig {
                backend: StoreBackend::Persistent,
                path: "./kb_store".to_string(),
                collection: "markdown_kb".to_string(),
            },
            sync: SyncConfig {
                id_policy: IdPolicy::SourceName,
                on_embed_failure: FailurePolicy::SkipFailed,
                embed_concurrency: 4,
            },
            top_k: 3,
        }
    }
}

impl Config {
    /// Assemble a config from `KB_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, DomainError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("KB_OLLAMA_BASE_URL") {
            config.ollama_base_url = url;
        }
        if let Ok(model) = std::env::var("KB_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(dim) = std::env::var("KB_EMBEDDING_DIMENSION") {
            config.embedding.dimension = parse_var("KB_EMBEDDING_DIMENSION", &dim)?;
        }
        if let Ok(model) = std::env::var("KB_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(key) = std::env::var("OLLAMA_API_KEY") {
            config.llm.api_key = key;
        }
        if let Ok(strategy) = std::env::var("KB_CHUNK_STRATEGY") {
            config.chunking.strategy = match strategy.as_str() {
                "fixed_window" => ChunkStrategy::FixedWindow,
                "boundary_aware" => ChunkStrategy::BoundaryAware,
                other => {
                    return Err(DomainError::config(format!(
                        "unknown chunk strategy '{other}'"
                    )))
                }
            };
        }
        if let Ok(size) = std::env::var("KB_CHUNK_SIZE") {
            config.chunking.chunk_size = parse_var("KB_CHUNK_SIZE", &size)?;
        }
        if let Ok(overlap) = std::env::var("KB_CHUNK_OVERLAP") {
            config.chunking.chunk_overlap = parse_var("KB_CHUNK_OVERLAP", &overlap)?;
        }
        if let Ok(backend) = std::env::var("KB_STORE_BACKEND") {
            config.store.backend = match backend.as_str() {
                "ephemeral" => StoreBackend::Ephemeral,
                "persistent" => StoreBackend::Persistent,
                other => {
                    return Err(DomainError::config(format!(
                        "unknown store backend '{other}'"
                    )))
                }
            };
        }
        if let Ok(path) = std::env::var("KB_STORE_PATH") {
            config.store.path = path;
        }
        if let Ok(collection) = std::env::var("KB_COLLECTION") {
            config.store.collection = collection;
        }
        if let Ok(policy) = std::env::var("KB_ID_POLICY") {
            config.sync.id_policy = match policy.as_str() {
                "sequential" => IdPolicy::Sequential,
                "source_name" => IdPolicy::SourceName,
                "row_counter" => IdPolicy::RowCounter,
                other => return Err(DomainError::config(format!("unknown id policy '{other}'"))),
            };
        }
        if let Ok(policy) = std::env::var("KB_FAILURE_POLICY") {
            config.sync.on_embed_failure = match policy.as_str() {
                "drop_batch" => FailurePolicy::DropBatch,
                "skip_failed" => FailurePolicy::SkipFailed,
                other => {
                    return Err(DomainError::config(format!(
                        "unknown failure policy '{other}'"
                    )))
                }
            };
        }
        if let Ok(concurrency) = std::env::var("KB_EMBED_CONCURRENCY") {
            config.sync.embed_concurrency = parse_var("KB_EMBED_CONCURRENCY", &concurrency)?;
        }
        if let Ok(top_k) = std::env::var("KB_TOP_K") {
            config.top_k = parse_var("KB_TOP_K", &top_k)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunking.chunk_size == 0 {
            return Err(DomainError::config("chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(DomainError::config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(DomainError::config("top_k must be greater than zero"));
        }
        if self.embedding.dimension == 0 {
            return Err(DomainError::config("embedding dimension must be greater than zero"));
        }
        if self.sync.embed_concurrency == 0 {
            return Err(DomainError::config("embed_concurrency must be greater than zero"));
        }
        Ok(())
    }
}

fn parse_var(name: &str, value: &str) -> Result<usize, DomainError> {
    value
        .parse()
        .map_err(|_| DomainError::config(format!("{name} must be a number, got '{value}'")))
}
