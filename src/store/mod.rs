pub mod memory;
pub mod postgres;

pub use memory::MemorySubmissionStore;
pub use postgres::PgSubmissionStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Field names the payment flow reads and writes on the submission's
/// key-value bag. The rest of the bag belongs to the form owner.
pub mod fields {
    pub const PAID: &str = "paid";
    pub const TRANSACTION_REFERENCE: &str = "transaction_reference";
    pub const AMOUNT: &str = "amount";
    pub const EMAIL: &str = "email";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIP: &str = "zip";
    pub const COUNTRY: &str = "country";
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Save-lifecycle state of a form submission. Only `Completed` triggers
/// payment initiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    New,
    Draft,
    Completed,
    Updated,
    Converted,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::New => "new",
            SubmissionState::Draft => "draft",
            SubmissionState::Completed => "completed",
            SubmissionState::Updated => "updated",
            SubmissionState::Converted => "converted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "new" => Some(SubmissionState::New),
            "draft" => Some(SubmissionState::Draft),
            "completed" => Some(SubmissionState::Completed),
            "updated" => Some(SubmissionState::Updated),
            "converted" => Some(SubmissionState::Converted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub state: SubmissionState,
    pub data: HashMap<String, String>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }
}

/// Adapter over the externally-owned submission storage. The payment flow
/// only loads records, writes individual fields, and resolves the reverse
/// lookup the webhook channel needs.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn load(&self, sid: i64) -> StoreResult<Option<Submission>>;

    async fn set_field(&self, sid: i64, name: &str, value: &str) -> StoreResult<()>;

    /// Finds the submission whose *current* `transaction_reference` equals
    /// the given value. A reference orphaned by a newer payment attempt no
    /// longer matches anything.
    async fn find_by_reference(&self, reference: &str) -> StoreResult<Option<i64>>;
}
