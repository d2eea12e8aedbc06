use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Embedding;

/// A source document as produced by a loader. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A bounded text segment derived from a [`Document`].
///
/// Chunks carry a copy of the document metadata and a sequential index.
/// Order is the only structural relationship between chunks of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, index: usize, metadata: HashMap<String, String>) -> Self {
        Self {
            text: text.into(),
            index,
            metadata,
        }
    }
}

/// One row of a vector collection. Ids are unique within a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Embedding,
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl VectorRecord {
    pub fn new(
        id: impl Into<String>,
        embedding: Embedding,
        content: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            embedding,
            content: content.into(),
            metadata,
        }
    }
}

/// A retrieved record paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub content: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

/// Ordered retrieval result, highest similarity first. Possibly empty.
pub type QueryResult = Vec<ScoredRecord>;
