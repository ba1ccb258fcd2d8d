#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use formpay_backend::payments::error::{GatewayError, GatewayResult};
use formpay_backend::payments::provider::HostedPageProvider;
use formpay_backend::payments::types::{HostedSessionRequest, SessionToken};
use formpay_backend::store::{MemorySubmissionStore, Submission, SubmissionState, SubmissionStore};

pub const TEST_REDIRECT_ENDPOINT: &str = "https://test.authorize.net/payment/payment";

/// Hosted-page provider double. Records every request and, to check the
/// persist-before-call ordering, whether the reference id was already
/// resolvable in the store at the moment of the call.
pub struct StubProvider {
    store: Arc<MemorySubmissionStore>,
    token: Option<&'static str>,
    pub requests: Mutex<Vec<HostedSessionRequest>>,
    pub reference_persisted_at_call: Mutex<Vec<bool>>,
}

impl StubProvider {
    pub fn succeeding(store: Arc<MemorySubmissionStore>, token: &'static str) -> Self {
        Self {
            store,
            token: Some(token),
            requests: Mutex::new(Vec::new()),
            reference_persisted_at_call: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(store: Arc<MemorySubmissionStore>) -> Self {
        Self {
            store,
            token: None,
            requests: Mutex::new(Vec::new()),
            reference_persisted_at_call: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HostedPageProvider for StubProvider {
    async fn create_hosted_session(
        &self,
        request: HostedSessionRequest,
    ) -> GatewayResult<SessionToken> {
        let persisted = self
            .store
            .find_by_reference(request.reference_id.as_str())
            .await?
            .is_some();
        self.reference_persisted_at_call
            .lock()
            .unwrap()
            .push(persisted);
        self.requests.lock().unwrap().push(request);

        match self.token {
            Some(token) => Ok(SessionToken::new(token)),
            None => Err(GatewayError::Provider {
                code: "E00007".to_string(),
                text: "User authentication failed.".to_string(),
            }),
        }
    }

    fn redirect_endpoint(&self) -> &str {
        TEST_REDIRECT_ENDPOINT
    }
}

/// A completed submission with a due amount and payment tracking enabled.
pub fn payable_submission(sid: i64, amount: &str) -> Submission {
    let data: HashMap<String, String> = [
        ("amount", amount),
        ("email", "donor@example.com"),
        ("first_name", "Dave"),
        ("last_name", "Parcells"),
        ("city", "Bridgeport"),
        ("state", "CT"),
        ("zip", "06606"),
        ("country", "US"),
        ("paid", ""),
        ("transaction_reference", ""),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Submission {
        id: sid,
        state: SubmissionState::Completed,
        data,
    }
}
