use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ports::VectorStore, DomainError, Embedding, QueryResult, VectorRecord};
use crate::infrastructure::vector_store::collection::Collection;

/// Ephemeral backend: collections live only for the process and are meant
/// to be created fresh per index-then-query session.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a unique session collection name, never reused.
    pub fn session_collection_name() -> String {
        format!("kb_{}", Uuid::new_v4().simple())
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, name: &str, dimension: usize) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::store(e.to_string()))?;

        match collections.get(name) {
            Some(existing) if existing.dimension != dimension => {
                Err(DomainError::collection(format!(
                    "collection '{name}' exists with dimension {}, requested {dimension}",
                    existing.dimension
                )))
            }
            Some(_) => Ok(()),
            None => {
                collections.insert(name.to_string(), Collection::new(name, dimension));
                Ok(())
            }
        }
    }

    async fn add(&self, collection: &str, records: &[VectorRecord]) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::store(e.to_string()))?;

        let target = collections
            .get_mut(collection)
            .ok_or_else(|| DomainError::store(format!("collection '{collection}' does not exist")))?;
        target.append(records)?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<QueryResult, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::store(e.to_string()))?;

        let target = collections
            .get(collection)
            .ok_or_else(|| DomainError::store(format!("collection '{collection}' does not exist")))?;
        Ok(target.search(query, top_k))
    }

    async fn count(&self, collection: &str) -> Result<usize, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::store(e.to_string()))?;

        let target = collections
            .get(collection)
            .ok_or_else(|| DomainError::store(format!("collection '{collection}' does not exist")))?;
        Ok(target.records.len())
    }
}
