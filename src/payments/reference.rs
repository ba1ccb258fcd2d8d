use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation token minted per payment attempt and echoed back unmodified
/// by the provider on both the redirect callback and the webhook channel.
///
/// The legacy format was `ref<unix-seconds>`, which collides for concurrent
/// attempts within the same second. The timestamp prefix is kept so the ids
/// stay recognizable in provider dashboards, with a random suffix appended
/// for uniqueness. Consumers must treat the id as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn mint() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        ReferenceId(format!("ref{}-{}", seconds, &suffix[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReferenceId {
    fn from(value: String) -> Self {
        ReferenceId(value)
    }
}
