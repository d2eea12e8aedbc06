use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Embedding, QueryResult, ScoredRecord, VectorRecord};

/// A named set of records with a fixed dimension and cosine metric.
///
/// Shared by both store backends; the on-disk backend serializes this
/// struct verbatim as the collection file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Collection {
    pub name: String,
    pub dimension: usize,
    pub records: Vec<VectorRecord>,
}

impl Collection {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            records: Vec::new(),
        }
    }

    /// Append records. Validates the whole batch before touching the
    /// collection, so a rejected batch leaves no partial insert.
    ///
    /// A record whose id already exists with identical content is skipped;
    /// an existing id with different content is a [`DomainError::Store`].
    pub fn append(&mut self, records: &[VectorRecord]) -> Result<usize, DomainError> {
        for record in records {
            if record.embedding.dimension() != self.dimension {
                return Err(DomainError::collection(format!(
                    "collection '{}' has dimension {}, record '{}' has {}",
                    self.name,
                    self.dimension,
                    record.id,
                    record.embedding.dimension()
                )));
            }
            if let Some(existing) = self.records.iter().find(|r| r.id == record.id) {
                if existing.content != record.content {
                    return Err(DomainError::store(format!(
                        "id '{}' already exists in collection '{}' with different content",
                        record.id, self.name
                    )));
                }
            }
        }

        let mut appended = 0;
        for record in records {
            if self.records.iter().any(|r| r.id == record.id) {
                continue;
            }
            self.records.push(record.clone());
            appended += 1;
        }

        Ok(appended)
    }

    /// Top-k cosine search. The sort is stable over insertion order, so
    /// score ties rank earlier-inserted records first.
    pub fn search(&self, query: &Embedding, top_k: usize) -> QueryResult {
        let mut scored: Vec<ScoredRecord> = self
            .records
            .iter()
            .map(|record| ScoredRecord {
                id: record.id.clone(),
                content: record.content.clone(),
                score: query.cosine_similarity(&record.embedding),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(id: &str, vector: Vec<f32>, content: &str) -> VectorRecord {
        VectorRecord::new(id, Embedding::new(vector), content, HashMap::new())
    }

    #[test]
    fn test_append_rejects_dimension_mismatch() {
        let mut collection = Collection::new("kb", 3);
        let err = collection
            .append(&[record("1", vec![1.0, 0.0], "short vector")])
            .unwrap_err();
        assert!(matches!(err, DomainError::Collection(_)));
        assert!(collection.records.is_empty());
    }

    #[test]
    fn test_duplicate_id_same_content_is_skipped() {
        let mut collection = Collection::new("kb", 2);
        let rec = record("a_1", vec![1.0, 0.0], "same text");

        assert_eq!(collection.append(&[rec.clone()]).unwrap(), 1);
        assert_eq!(collection.append(&[rec]).unwrap(), 0);
        assert_eq!(collection.records.len(), 1);
    }

    #[test]
    fn test_duplicate_id_different_content_errors_loudly() {
        let mut collection = Collection::new("kb", 2);
        collection
            .append(&[record("a_1", vec![1.0, 0.0], "original")])
            .unwrap();

        let err = collection
            .append(&[record("a_1", vec![0.0, 1.0], "rewritten")])
            .unwrap_err();

        assert!(matches!(err, DomainError::Store(_)));
        assert_eq!(collection.records[0].content, "original");
    }

    #[test]
    fn test_rejected_batch_leaves_no_partial_insert() {
        let mut collection = Collection::new("kb", 2);
        collection
            .append(&[record("dup", vec![1.0, 0.0], "original")])
            .unwrap();

        let batch = [
            record("fresh", vec![0.0, 1.0], "new row"),
            record("dup", vec![1.0, 0.0], "conflicting"),
        ];
        assert!(collection.append(&batch).is_err());
        assert_eq!(collection.records.len(), 1);
    }

    #[test]
    fn test_search_ranks_highest_first_and_truncates() {
        let mut collection = Collection::new("kb", 2);
        collection
            .append(&[
                record("1", vec![0.0, 1.0], "orthogonal"),
                record("2", vec![1.0, 0.0], "exact"),
                record("3", vec![0.7, 0.7], "diagonal"),
            ])
            .unwrap();

        let results = collection.search(&Embedding::new(vec![1.0, 0.0]), 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "2");
        assert_eq!(results[1].id, "3");
    }

    #[test]
    fn test_search_breaks_ties_by_insertion_order() {
        let mut collection = Collection::new("kb", 2);
        collection
            .append(&[
                record("first", vec![1.0, 0.0], "inserted first"),
                record("second", vec![2.0, 0.0], "same direction, inserted second"),
            ])
            .unwrap();

        // Both score 1.0 against the query; stable sort keeps insertion order.
        let results = collection.search(&Embedding::new(vec![1.0, 0.0]), 3);
        assert_eq!(results[0].id, "first");
        assert_eq!(results[1].id, "second");
    }

    #[test]
    fn test_search_empty_collection_returns_empty() {
        let collection = Collection::new("kb", 2);
        assert!(collection.search(&Embedding::new(vec![1.0, 0.0]), 5).is_empty());
    }
}
