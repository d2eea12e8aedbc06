//! Policies governing how a sync writes records into a collection.

use serde::Deserialize;

/// How record ids are assigned during a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Bare `"1"`, `"2"`, … per insert call. For ephemeral sessions whose
    /// collection is created fresh and never reused.
    Sequential,
    /// `{file_name}_{n}` with `n` starting at 1 per sync call. Safe across
    /// different files; re-syncing the same file reuses the same ids.
    SourceName,
    /// Integer counter seeded from the collection row count when the sync
    /// service is built, incremented per record for its lifetime. Unsafe
    /// under restart-with-stale-counter or multiple writers.
    RowCounter,
}

/// What happens to a sync batch when some chunks fail to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Drop the whole batch; the sync reports zero chunks written.
    DropBatch,
    /// Skip only the failed chunks and insert the rest.
    SkipFailed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub id_policy: IdPolicy,
    pub on_embed_failure: FailurePolicy,
    /// Embedding calls in flight at once during a sync.
    pub embed_concurrency: usize,
}
