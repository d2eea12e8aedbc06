use std::path::Path;

use tracing::instrument;

use crate::application::services::{IndexSync, QaAnswer, QaService};
use crate::domain::DomainError;

/// Sync-then-ask facade over [`IndexSync`] and [`QaService`].
///
/// The two services share nothing but the collection itself; this type only
/// composes them for the common one-shot usage.
pub struct KnowledgeBase {
    sync: IndexSync,
    qa: QaService,
}

impl KnowledgeBase {
    pub fn new(sync: IndexSync, qa: QaService) -> Self {
        Self { sync, qa }
    }

    pub async fn sync(&self, path: &Path) -> Result<usize, DomainError> {
        self.sync.sync(path).await
    }

    pub async fn answer(&self, question: &str) -> Result<QaAnswer, DomainError> {
        self.qa.answer(question).await
    }

    /// Sync a source file, then answer a question against the freshly
    /// populated collection. Returns the chunk count and the answer.
    #[instrument(skip(self))]
    pub async fn sync_and_answer(
        &self,
        path: &Path,
        question: &str,
    ) -> Result<(usize, QaAnswer), DomainError> {
        let written = self.sync.sync(path).await?;
        let answer = self.qa.answer(question).await?;
        Ok((written, answer))
    }
}
