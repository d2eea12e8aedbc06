pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_store;

pub use config::{Config, StoreBackend};
pub use embedding::OllamaEmbedding;
pub use llm::OpenAiCompatLlm;
pub use loader::MarkdownLoader;
pub use vector_store::{InMemoryVectorStore, OnDiskVectorStore};
