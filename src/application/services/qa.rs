use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError, QueryResult,
};

/// Returned when retrieval finds nothing; the chat service is not called.
pub const NO_RESULTS_ANSWER: &str = "No relevant information found.";

/// Returned when the embedding or chat service fails at transport or
/// protocol level.
pub const SERVICE_FAILURE_ANSWER: &str = "Failed to generate an answer.";

/// A grounded answer together with the raw retrieval behind it.
#[derive(Debug, Clone)]
pub struct QaAnswer {
    pub answer: String,
    pub results: QueryResult,
}

/// Answers a question from an already-populated collection:
/// embed → top-k retrieval → context assembly → one chat call.
pub struct QaService {
    embedding: Arc<dyn EmbeddingService>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    collection: String,
    top_k: usize,
}

impl QaService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            embedding,
            store,
            llm,
            collection: collection.into(),
            top_k,
        }
    }

    /// Answer with the configured top-k.
    pub async fn answer(&self, question: &str) -> Result<QaAnswer, DomainError> {
        self.answer_top_k(question, self.top_k).await
    }

    /// Answer with an explicit top-k.
    ///
    /// Embedding and chat failures at transport or protocol level are
    /// converted into a sentinel answer, never an `Err`. Store failures
    /// (missing collection) propagate.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn answer_top_k(&self, question: &str, top_k: usize) -> Result<QaAnswer, DomainError> {
        let query_embedding = match self.embedding.embed(question).await {
            Ok(embedding) => embedding,
            Err(e) if e.is_service_failure() => {
                warn!(error = %e, "question embedding failed");
                return Ok(QaAnswer {
                    answer: SERVICE_FAILURE_ANSWER.to_string(),
                    results: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        let results = self
            .store
            .query(&self.collection, &query_embedding, top_k)
            .await?;

        if results.is_empty() {
            info!("retrieval found nothing");
            return Ok(QaAnswer {
                answer: NO_RESULTS_ANSWER.to_string(),
                results,
            });
        }

        let context: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        let prompt = build_prompt(&context.join("\n"), question);

        match self.llm.complete(&prompt).await {
            Ok(answer) => Ok(QaAnswer { answer, results }),
            Err(e) if e.is_service_failure() => {
                warn!(error = %e, "chat completion failed");
                Ok(QaAnswer {
                    answer: SERVICE_FAILURE_ANSWER.to_string(),
                    results,
                })
            }
            Err(e) => Err(e),
        }
    }
}

fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an internal policy assistant. Answer strictly from the \
         material below; use only information found in the material and do \
         not invent content.\n\nMaterial:\n{context}\n\nQuestion: {question}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    use crate::application::testing::{CannedLlm, KeyedEmbedding, UnreachableLlm};
    use crate::domain::{Embedding, VectorRecord};
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    const QUESTION: &str = "what is the bonus policy?";

    fn record(id: &str, vector: Vec<f32>, content: &str) -> VectorRecord {
        VectorRecord::new(id, Embedding::new(vector), content, HashMap::new())
    }

    async fn populated_store() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("kb", 2).await.unwrap();
        store
            .add(
                "kb",
                &[
                    record("1", vec![0.0, 1.0], "unrelated material"),
                    record("2", vec![1.0, 0.0], "bonuses are paid in January"),
                    record("3", vec![0.7, 0.7], "somewhat related material"),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_prompt("rule one\nrule two", "what is rule one?");
        assert!(prompt.contains("Material:\nrule one\nrule two"));
        assert!(prompt.contains("Question: what is rule one?"));
    }

    #[tokio::test]
    async fn test_empty_collection_returns_sentinel_without_llm_call() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("kb", 2).await.unwrap();
        let llm = Arc::new(CannedLlm::new("should never be used"));

        let qa = QaService::new(
            Arc::new(KeyedEmbedding::uniform(2)),
            store,
            Arc::clone(&llm) as Arc<dyn LlmService>,
            "kb",
            3,
        );

        let result = qa.answer(QUESTION).await.unwrap();

        assert_eq!(result.answer, NO_RESULTS_ANSWER);
        assert!(result.results.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first_at_top_k_3() {
        let store = populated_store().await;
        let embedding =
            Arc::new(KeyedEmbedding::uniform(2).with_vector(QUESTION, vec![1.0, 0.0]));
        let llm = Arc::new(CannedLlm::new("Bonuses are paid in January."));

        let qa = QaService::new(
            embedding,
            store,
            Arc::clone(&llm) as Arc<dyn LlmService>,
            "kb",
            3,
        );

        let result = qa.answer(QUESTION).await.unwrap();

        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[0].content, "bonuses are paid in January");
        assert_eq!(result.answer, "Bonuses are paid in January.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_becomes_sentinel_answer() {
        let store = populated_store().await;
        let embedding = Arc::new(KeyedEmbedding::uniform(2).failing_on(QUESTION));
        let llm = Arc::new(CannedLlm::new("unused"));

        let qa = QaService::new(
            embedding,
            store,
            Arc::clone(&llm) as Arc<dyn LlmService>,
            "kb",
            3,
        );

        let result = qa.answer(QUESTION).await.unwrap();

        assert_eq!(result.answer, SERVICE_FAILURE_ANSWER);
        assert!(result.results.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_becomes_sentinel_but_keeps_retrieval() {
        let store = populated_store().await;
        let embedding =
            Arc::new(KeyedEmbedding::uniform(2).with_vector(QUESTION, vec![1.0, 0.0]));

        let qa = QaService::new(embedding, store, Arc::new(UnreachableLlm), "kb", 3);

        let result = qa.answer(QUESTION).await.unwrap();

        assert_eq!(result.answer, SERVICE_FAILURE_ANSWER);
        assert_eq!(result.results.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_llm_reply_returned_as_is() {
        let store = populated_store().await;
        let embedding =
            Arc::new(KeyedEmbedding::uniform(2).with_vector(QUESTION, vec![1.0, 0.0]));
        let llm = Arc::new(CannedLlm::new(""));

        let qa = QaService::new(
            embedding,
            store,
            Arc::clone(&llm) as Arc<dyn LlmService>,
            "kb",
            3,
        );

        // An empty reply is the chat service's answer, not a failure.
        let result = qa.answer(QUESTION).await.unwrap();

        assert_eq!(result.answer, "");
        assert_eq!(result.results.len(), 3);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_propagates() {
        let store = Arc::new(InMemoryVectorStore::new());
        let qa = QaService::new(
            Arc::new(KeyedEmbedding::uniform(2)),
            store,
            Arc::new(CannedLlm::new("unused")),
            "never_created",
            3,
        );

        let err = qa.answer(QUESTION).await.unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
    }
}
