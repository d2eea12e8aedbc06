use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ports::DocumentLoader, Document, DomainError};

/// Loads a Markdown file as one flat [`Document`] with `source` and
/// `file_name` metadata. No markup parsing beyond what chunking needs.
#[derive(Debug, Default)]
pub struct MarkdownLoader;

impl MarkdownLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for MarkdownLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>, DomainError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::store(format!("cannot read {}: {e}", path.display())))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), path.display().to_string());
        metadata.insert("file_name".to_string(), file_name);

        debug!(path = %path.display(), bytes = text.len(), "loaded markdown source");

        Ok(vec![Document::new(text).with_metadata(metadata)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_sets_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# Title\n\nBody.").unwrap();

        let docs = MarkdownLoader::new().load(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert!(docs[0].text.starts_with("# Title"));
        assert_eq!(docs[0].metadata.get("file_name").unwrap(), "notes.md");
    }

    #[tokio::test]
    async fn test_missing_file_is_store_error() {
        let err = MarkdownLoader::new()
            .load(Path::new("/nonexistent/kb.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
    }
}
