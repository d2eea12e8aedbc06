use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::domain::{
    chunk_document,
    ports::{DocumentLoader, EmbeddingService, VectorStore},
    Chunk, ChunkingConfig, DomainError, Embedding, FailurePolicy, IdPolicy, SyncConfig,
    VectorRecord,
};

/// Synchronizes a document source into a vector collection:
/// load → chunk → embed → assign ids → one batched `add`.
pub struct IndexSync {
    loader: Arc<dyn DocumentLoader>,
    embedding: Arc<dyn EmbeddingService>,
    store: Arc<dyn VectorStore>,
    collection: String,
    chunking: ChunkingConfig,
    id_policy: IdPolicy,
    on_embed_failure: FailurePolicy,
    embed_concurrency: usize,
    row_counter: AtomicU64,
}

impl IndexSync {
    /// Build the service, creating (or opening) the target collection with
    /// the embedding provider's dimension and seeding the row counter from
    /// the collection's current size.
    ///
    /// Collection creation failure is a configuration problem and
    /// propagates.
    pub async fn new(
        loader: Arc<dyn DocumentLoader>,
        embedding: Arc<dyn EmbeddingService>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        chunking: ChunkingConfig,
        sync: &SyncConfig,
    ) -> Result<Self, DomainError> {
        let collection = collection.into();
        store
            .ensure_collection(&collection, embedding.dimension())
            .await?;

        // Seeded once per service lifetime. A stale seed after restart or a
        // second concurrent writer can collide; see the id-policy docs.
        let seed = store.count(&collection).await? as u64;

        Ok(Self {
            loader,
            embedding,
            store,
            collection,
            chunking,
            id_policy: sync.id_policy,
            on_embed_failure: sync.on_embed_failure,
            embed_concurrency: sync.embed_concurrency.max(1),
            row_counter: AtomicU64::new(seed),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Sync one source file. Returns the number of chunks written.
    ///
    /// An empty document, or a document none of whose chunks could be
    /// embedded, returns `Ok(0)`: retrieval then degrades to "no
    /// information found" instead of failing the pipeline. Embedding
    /// failures never propagate; loader and store failures do.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn sync(&self, path: &Path) -> Result<usize, DomainError> {
        let documents = self.loader.load(path).await?;

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in &documents {
            chunks.extend(chunk_document(
                document,
                self.chunking.strategy,
                self.chunking.chunk_size,
                self.chunking.chunk_overlap,
            ));
        }

        if chunks.is_empty() {
            info!(path = %path.display(), "document produced no chunks");
            return Ok(0);
        }

        let embeddings: Vec<Result<Embedding, DomainError>> = stream::iter(&chunks)
            .map(|chunk| {
                let embedding = Arc::clone(&self.embedding);
                async move { embedding.embed(&chunk.text).await }
            })
            .buffered(self.embed_concurrency)
            .collect()
            .await;

        let failed = embeddings.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(
                path = %path.display(),
                failed,
                total = chunks.len(),
                policy = ?self.on_embed_failure,
                "some chunks failed to embed"
            );
            if self.on_embed_failure == FailurePolicy::DropBatch {
                return Ok(0);
            }
        }

        let embedded: Vec<(Chunk, Embedding)> = chunks
            .into_iter()
            .zip(embeddings)
            .filter_map(|(chunk, result)| result.ok().map(|e| (chunk, e)))
            .collect();

        if embedded.is_empty() {
            return Ok(0);
        }

        let records = self.assign_ids(path, embedded);
        let written = records.len();
        self.store.add(&self.collection, &records).await?;

        info!(path = %path.display(), written, "synced document");
        Ok(written)
    }

    fn assign_ids(&self, path: &Path, embedded: Vec<(Chunk, Embedding)>) -> Vec<VectorRecord> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        embedded
            .into_iter()
            .enumerate()
            .map(|(n, (chunk, embedding))| {
                let id = match self.id_policy {
                    IdPolicy::Sequential => (n + 1).to_string(),
                    IdPolicy::SourceName => format!("{file_name}_{}", n + 1),
                    IdPolicy::RowCounter => {
                        self.row_counter.fetch_add(1, Ordering::SeqCst).to_string()
                    }
                };
                VectorRecord::new(id, embedding, chunk.text, chunk.metadata)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::Ordering as AtomicOrdering;

    use crate::application::testing::{KeyedEmbedding, StaticLoader};
    use crate::domain::ChunkStrategy;
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    const DOC: &str = "# A\nalpha section.\n\n# B\nbeta section.";

    fn chunking() -> ChunkingConfig {
        ChunkingConfig {
            strategy: ChunkStrategy::BoundaryAware,
            chunk_size: 100,
            chunk_overlap: 20,
        }
    }

    fn sync_config(id_policy: IdPolicy, on_embed_failure: FailurePolicy) -> SyncConfig {
        SyncConfig {
            id_policy,
            on_embed_failure,
            embed_concurrency: 2,
        }
    }

    async fn service(
        text: &str,
        embedding: KeyedEmbedding,
        store: Arc<InMemoryVectorStore>,
        config: SyncConfig,
    ) -> (IndexSync, Arc<KeyedEmbedding>) {
        let embedding = Arc::new(embedding);
        let sync = IndexSync::new(
            Arc::new(StaticLoader {
                text: text.to_string(),
            }),
            Arc::clone(&embedding) as Arc<dyn EmbeddingService>,
            store,
            "kb",
            chunking(),
            &config,
        )
        .await
        .unwrap();
        (sync, embedding)
    }

    async fn stored_ids(store: &InMemoryVectorStore) -> HashSet<String> {
        store
            .query("kb", &Embedding::new(vec![1.0, 1.0]), 100)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    #[tokio::test]
    async fn test_empty_document_returns_zero_without_embedding() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, embedding) = service(
            "",
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::SourceName, FailurePolicy::SkipFailed),
        )
        .await;

        assert_eq!(sync.sync(Path::new("empty.md")).await.unwrap(), 0);
        assert_eq!(store.count("kb").await.unwrap(), 0);
        assert_eq!(embedding.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_writes_source_named_records() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, _) = service(
            DOC,
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::SourceName, FailurePolicy::SkipFailed),
        )
        .await;

        assert_eq!(sync.sync(Path::new("dir/kb.md")).await.unwrap(), 2);
        assert_eq!(store.count("kb").await.unwrap(), 2);

        let ids = stored_ids(&store).await;
        assert!(ids.contains("kb.md_1"));
        assert!(ids.contains("kb.md_2"));
    }

    #[tokio::test]
    async fn test_resync_same_file_neither_errors_nor_grows() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, _) = service(
            DOC,
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::SourceName, FailurePolicy::SkipFailed),
        )
        .await;

        sync.sync(Path::new("kb.md")).await.unwrap();
        sync.sync(Path::new("kb.md")).await.unwrap();

        assert_eq!(store.count("kb").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_sequential_policy_assigns_bare_numeric_ids() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, _) = service(
            DOC,
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::Sequential, FailurePolicy::SkipFailed),
        )
        .await;

        assert_eq!(sync.sync(Path::new("session.md")).await.unwrap(), 2);
        assert_eq!(
            stored_ids(&store).await,
            HashSet::from(["1", "2"].map(String::from))
        );
    }

    #[tokio::test]
    async fn test_row_counter_seeds_from_collection_size() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (first, _) = service(
            DOC,
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::RowCounter, FailurePolicy::SkipFailed),
        )
        .await;
        first.sync(Path::new("kb.md")).await.unwrap();

        // A second service built later sees the grown row count as its seed,
        // so a re-sync of the same file gets fresh ids.
        let (second, _) = service(
            DOC,
            KeyedEmbedding::uniform(2),
            Arc::clone(&store),
            sync_config(IdPolicy::RowCounter, FailurePolicy::SkipFailed),
        )
        .await;
        second.sync(Path::new("kb.md")).await.unwrap();

        assert_eq!(store.count("kb").await.unwrap(), 4);
        assert_eq!(stored_ids(&store).await, HashSet::from(["0", "1", "2", "3"].map(String::from)));
    }

    #[tokio::test]
    async fn test_drop_batch_discards_everything_on_one_failure() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, _) = service(
            DOC,
            KeyedEmbedding::uniform(2).failing_on("# A\nalpha section."),
            Arc::clone(&store),
            sync_config(IdPolicy::SourceName, FailurePolicy::DropBatch),
        )
        .await;

        assert_eq!(sync.sync(Path::new("kb.md")).await.unwrap(), 0);
        assert_eq!(store.count("kb").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_skip_failed_inserts_the_rest() {
        let store = Arc::new(InMemoryVectorStore::new());
        let (sync, _) = service(
            DOC,
            KeyedEmbedding::uniform(2).failing_on("# A\nalpha section."),
            Arc::clone(&store),
            sync_config(IdPolicy::SourceName, FailurePolicy::SkipFailed),
        )
        .await;

        assert_eq!(sync.sync(Path::new("kb.md")).await.unwrap(), 1);
        assert_eq!(store.count("kb").await.unwrap(), 1);

        let ids = stored_ids(&store).await;
        assert_eq!(ids, HashSet::from(["kb.md_1".to_string()]));
    }
}
