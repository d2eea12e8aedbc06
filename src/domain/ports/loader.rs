use std::path::Path;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Document};

/// Produces read-only [`Document`]s from a source location. One source may
/// yield several documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Document>, DomainError>;
}
