use crate::domain::{errors::DomainError, Embedding, QueryResult, VectorRecord};
use async_trait::async_trait;

/// Named-collection vector storage with cosine similarity search.
///
/// Records are append-only from the pipeline's point of view: `add` never
/// updates or deletes. A record whose id already exists with identical
/// content is skipped; an existing id with different content is an error,
/// never a silent overwrite.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist, or open it if it does.
    ///
    /// Opening an existing collection with a different dimension is a fatal
    /// configuration error and propagates.
    async fn ensure_collection(&self, name: &str, dimension: usize) -> Result<(), DomainError>;

    /// Append a batch of records to a collection.
    async fn add(&self, collection: &str, records: &[VectorRecord]) -> Result<(), DomainError>;

    /// Return the `top_k` most similar records, highest similarity first.
    /// Ties break by insertion order.
    async fn query(
        &self,
        collection: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<QueryResult, DomainError>;

    /// Number of records currently in a collection.
    async fn count(&self, collection: &str) -> Result<usize, DomainError>;
}
