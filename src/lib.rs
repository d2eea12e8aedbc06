//! Markdown knowledge-base synchronization and retrieval-augmented QA.
//!
//! The pipeline turns a Markdown source into bounded chunks, embeds and
//! stores them in a vector collection (in-memory or on-disk), and answers
//! questions grounded in the top-k retrieved chunks.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{IndexSync, KnowledgeBase, QaAnswer, QaService};
pub use domain::{
    chunk_text, Chunk, ChunkStrategy, Document, DomainError, Embedding, QueryResult, Result,
    ScoredRecord, VectorRecord,
};
pub use infrastructure::{
    Config, InMemoryVectorStore, MarkdownLoader, OllamaEmbedding, OnDiskVectorStore,
    OpenAiCompatLlm,
};
