use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::store::{fields, StoreResult, Submission, SubmissionStore};

/// In-memory submission store. Backs deployments without a database and the
/// test suite; semantics mirror the Postgres adapter.
#[derive(Default)]
pub struct MemorySubmissionStore {
    submissions: RwLock<HashMap<i64, Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, submission: Submission) {
        self.submissions
            .write()
            .await
            .insert(submission.id, submission);
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn load(&self, sid: i64) -> StoreResult<Option<Submission>> {
        Ok(self.submissions.read().await.get(&sid).cloned())
    }

    async fn set_field(&self, sid: i64, name: &str, value: &str) -> StoreResult<()> {
        if let Some(submission) = self.submissions.write().await.get_mut(&sid) {
            submission
                .data
                .insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn find_by_reference(&self, reference: &str) -> StoreResult<Option<i64>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .find(|s| s.field(fields::TRANSACTION_REFERENCE) == Some(reference))
            .map(|s| s.id))
    }
}
