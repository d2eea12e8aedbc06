mod chunking;
mod document;
mod embedding;

pub use chunking::{chunk_document, chunk_text, ChunkStrategy, ChunkingConfig};
pub use document::{Chunk, Document, QueryResult, ScoredRecord, VectorRecord};
pub use embedding::Embedding;
