use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kb_rag::application::{IndexSync, KnowledgeBase, QaService};
use kb_rag::domain::ports::{EmbeddingService, VectorStore};
use kb_rag::domain::IdPolicy;
use kb_rag::infrastructure::{
    Config, InMemoryVectorStore, MarkdownLoader, OllamaEmbedding, OnDiskVectorStore,
    OpenAiCompatLlm, StoreBackend,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kb_rag=info,kb=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let file = args.next().context("usage: kb <markdown-file> <question>")?;
    let question = args.next().context("usage: kb <markdown-file> <question>")?;

    let mut config = Config::from_env()?;
    // An ephemeral collection is never reused, so bare numeric ids suffice.
    if config.store.backend == StoreBackend::Ephemeral {
        config.sync.id_policy = IdPolicy::Sequential;
    }

    let embedding: Arc<dyn EmbeddingService> = Arc::new(OllamaEmbedding::new(
        &config.ollama_base_url,
        &config.embedding,
    ));
    let llm = Arc::new(OpenAiCompatLlm::new(&config.ollama_base_url, &config.llm));
    let loader = Arc::new(MarkdownLoader::new());

    let (store, collection): (Arc<dyn VectorStore>, String) = match config.store.backend {
        StoreBackend::Persistent => (
            Arc::new(OnDiskVectorStore::open(&config.store.path)?),
            config.store.collection.clone(),
        ),
        StoreBackend::Ephemeral => (
            Arc::new(InMemoryVectorStore::new()),
            InMemoryVectorStore::session_collection_name(),
        ),
    };
    info!(collection = %collection, backend = ?config.store.backend, "knowledge base ready");

    let sync = IndexSync::new(
        loader,
        Arc::clone(&embedding),
        Arc::clone(&store),
        collection.clone(),
        config.chunking.clone(),
        &config.sync,
    )
    .await?;
    let qa = QaService::new(embedding, store, llm, collection, config.top_k);
    let kb = KnowledgeBase::new(sync, qa);

    let (written, result) = kb.sync_and_answer(Path::new(&file), &question).await?;

    println!("Chunks written: {written}");
    println!("Question: {question}");
    println!("Answer: {}", result.answer);

    Ok(())
}
