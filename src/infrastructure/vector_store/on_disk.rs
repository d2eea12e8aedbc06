use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{ports::VectorStore, DomainError, Embedding, QueryResult, VectorRecord};
use crate::infrastructure::vector_store::collection::Collection;

/// Persistent backend: one JSON file per collection under a root directory,
/// loaded on open and rewritten after every `add`.
///
/// Assumes a single writer per root directory. Concurrent `add` calls from
/// multiple processes against the same root are unsupported.
pub struct OnDiskVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, Collection>>,
}

impl OnDiskVectorStore {
    /// Open the store at `root`, creating the directory if absent and
    /// loading every collection file found there.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| DomainError::store(format!("cannot create {}: {e}", root.display())))?;

        let mut collections = HashMap::new();
        let entries = fs::read_dir(&root)
            .map_err(|e| DomainError::store(format!("cannot read {}: {e}", root.display())))?;

        for entry in entries {
            let entry = entry.map_err(|e| DomainError::store(e.to_string()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let collection = Self::load_collection(&path)?;
                collections.insert(collection.name.clone(), collection);
            }
        }

        info!(root = %root.display(), collections = collections.len(), "opened vector store");

        Ok(Self {
            root,
            collections: RwLock::new(collections),
        })
    }

    fn load_collection(path: &Path) -> Result<Collection, DomainError> {
        let bytes = fs::read(path)
            .map_err(|e| DomainError::store(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::store(format!("corrupt collection {}: {e}", path.display())))
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn persist(&self, collection: &Collection) -> Result<(), DomainError> {
        let path = self.collection_path(&collection.name);
        let bytes = serde_json::to_vec(collection)
            .map_err(|e| DomainError::store(format!("cannot serialize '{}': {e}", collection.name)))?;
        fs::write(&path, bytes)
            .map_err(|e| DomainError::store(format!("cannot write {}: {e}", path.display())))
    }
}

#[async_trait]
impl VectorStore for OnDiskVectorStore {
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
                let collection = Collection::new(name, dimension);
                self.persist(&collection)?;
                collections.insert(name.to_string(), collection);
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

        let appended = target.append(records)?;
        if appended > 0 {
            self.persist(target)?;
        }
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
