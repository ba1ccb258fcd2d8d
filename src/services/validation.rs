use std::sync::Arc;
use tracing::{info, warn};

use crate::payments::signature::verify_webhook_signature;
use crate::payments::types::PaymentStatus;
use crate::store::{fields, StoreResult, SubmissionStore};

/// Result of the browser-return channel. `Ignored` deliberately covers every
/// non-match (unknown submission, untracked form, stale or forged reference)
/// so the response never leaks which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Confirmed,
    Ignored,
}

/// Result of the webhook channel. `NotApplicable` maps to an empty 204 so
/// the provider does not retry events we cannot correlate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Completed,
    NotApplicable,
}

/// Reconciles the two out-of-order completion signals against the reference
/// id stored on the submission. Either channel, both, or neither may fire
/// for a given attempt; each transition is idempotent.
pub struct ValidationService {
    store: Arc<dyn SubmissionStore>,
    webhook_signature_key: Option<String>,
}

impl ValidationService {
    pub fn new(store: Arc<dyn SubmissionStore>, webhook_signature_key: Option<String>) -> Self {
        Self {
            store,
            webhook_signature_key,
        }
    }

    /// Browser return with the submission id and the echoed reference id.
    /// Exact string equality against the stored reference decides; a match
    /// marks the submission `success`.
    pub async fn validate_callback(&self, sid: i64, tid: &str) -> StoreResult<CallbackOutcome> {
        let Some(submission) = self.store.load(sid).await? else {
            return Ok(CallbackOutcome::Ignored);
        };
        if !submission.has_field(fields::PAID) {
            return Ok(CallbackOutcome::Ignored);
        }
        let Some(stored) = submission.field(fields::TRANSACTION_REFERENCE) else {
            return Ok(CallbackOutcome::Ignored);
        };
        if stored != tid {
            // Stale or forged callback; dropped without a distinguishable
            // response.
            return Ok(CallbackOutcome::Ignored);
        }

        self.store
            .set_field(sid, fields::PAID, PaymentStatus::Success.as_str())
            .await?;
        info!(sid, "Payment confirmed via redirect callback");
        Ok(CallbackOutcome::Confirmed)
    }

    /// Server-to-server push notification. The webhook carries no submission
    /// id, so the submission is resolved by reverse lookup on the current
    /// reference; a hit marks it `complete`.
    pub async fn validate_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> StoreResult<WebhookOutcome> {
        if let Some(key) = &self.webhook_signature_key {
            let verified = signature
                .map(|header| verify_webhook_signature(body, key, header))
                .unwrap_or(false);
            if !verified {
                warn!("Webhook signature missing or invalid");
                return Ok(WebhookOutcome::NotApplicable);
            }
        }

        let Ok(event) = serde_json::from_slice::<serde_json::Value>(body) else {
            return Ok(WebhookOutcome::NotApplicable);
        };
        let Some(reference) = event
            .get("payload")
            .and_then(|payload| payload.get("merchantReferenceId"))
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
        else {
            return Ok(WebhookOutcome::NotApplicable);
        };

        let Some(sid) = self.store.find_by_reference(reference).await? else {
            return Ok(WebhookOutcome::NotApplicable);
        };

        self.store
            .set_field(sid, fields::PAID, PaymentStatus::Complete.as_str())
            .await?;
        info!(sid, reference, "Payment completed via webhook");
        Ok(WebhookOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySubmissionStore, Submission, SubmissionState};
    use std::collections::HashMap;

    fn tracked_submission(sid: i64, reference: &str, paid: &str) -> Submission {
        let mut data = HashMap::new();
        data.insert(fields::PAID.to_string(), paid.to_string());
        data.insert(
            fields::TRANSACTION_REFERENCE.to_string(),
            reference.to_string(),
        );
        Submission {
            id: sid,
            state: SubmissionState::Completed,
            data,
        }
    }

    async fn service_with(
        submissions: Vec<Submission>,
    ) -> (Arc<MemorySubmissionStore>, ValidationService) {
        let store = Arc::new(MemorySubmissionStore::new());
        for submission in submissions {
            store.insert(submission).await;
        }
        let service = ValidationService::new(store.clone(), None);
        (store, service)
    }

    #[tokio::test]
    async fn matching_callback_marks_success() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        let outcome = service.validate_callback(42, "ref-1").await.unwrap();
        assert_eq!(outcome, CallbackOutcome::Confirmed);
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("success"));
    }

    #[tokio::test]
    async fn callback_is_idempotent() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        for _ in 0..2 {
            let outcome = service.validate_callback(42, "ref-1").await.unwrap();
            assert_eq!(outcome, CallbackOutcome::Confirmed);
        }
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("success"));
    }

    #[tokio::test]
    async fn mismatched_reference_never_mutates() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        let outcome = service.validate_callback(42, "ref-forged").await.unwrap();
        assert_eq!(outcome, CallbackOutcome::Ignored);
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("pending"));
    }

    #[tokio::test]
    async fn unknown_submission_is_ignored() {
        let (_, service) = service_with(vec![]).await;
        let outcome = service.validate_callback(404, "ref-1").await.unwrap();
        assert_eq!(outcome, CallbackOutcome::Ignored);
    }

    #[tokio::test]
    async fn untracked_form_is_ignored() {
        let (store, service) = service_with(vec![]).await;
        store
            .insert(Submission {
                id: 5,
                state: SubmissionState::Completed,
                data: HashMap::new(),
            })
            .await;
        let outcome = service.validate_callback(5, "ref-1").await.unwrap();
        assert_eq!(outcome, CallbackOutcome::Ignored);
    }

    #[tokio::test]
    async fn webhook_completes_by_reverse_lookup() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        let body = br#"{"payload":{"merchantReferenceId":"ref-1"}}"#;
        let outcome = service.validate_webhook(body, None).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Completed);
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("complete"));
    }

    #[tokio::test]
    async fn webhook_with_unknown_reference_is_not_applicable() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        let body = br#"{"payload":{"merchantReferenceId":"unknown-ref"}}"#;
        let outcome = service.validate_webhook(body, None).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::NotApplicable);
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("pending"));
    }

    #[tokio::test]
    async fn malformed_webhook_bodies_are_not_applicable() {
        let (_, service) = service_with(vec![tracked_submission(42, "ref-1", "pending")]).await;

        for body in [
            &b"not json"[..],
            br#"{"other":1}"#,
            br#"{"payload":{}}"#,
            br#"{"payload":{"merchantReferenceId":""}}"#,
            br#"{"payload":{"merchantReferenceId":42}}"#,
        ] {
            let outcome = service.validate_webhook(body, None).await.unwrap();
            assert_eq!(outcome, WebhookOutcome::NotApplicable);
        }
    }

    #[tokio::test]
    async fn channels_are_order_independent() {
        // webhook first, callback second
        let (store, service) =
            service_with(vec![tracked_submission(1, "ref-a", "pending")]).await;
        let body = br#"{"payload":{"merchantReferenceId":"ref-a"}}"#;
        assert_eq!(
            service.validate_webhook(body, None).await.unwrap(),
            WebhookOutcome::Completed
        );
        assert_eq!(
            service.validate_callback(1, "ref-a").await.unwrap(),
            CallbackOutcome::Confirmed
        );
        let loaded = store.load(1).await.unwrap().unwrap();
        assert!(PaymentStatus::parse(loaded.field(fields::PAID)).is_terminal());

        // callback first, webhook second
        let (store, service) =
            service_with(vec![tracked_submission(2, "ref-b", "pending")]).await;
        assert_eq!(
            service.validate_callback(2, "ref-b").await.unwrap(),
            CallbackOutcome::Confirmed
        );
        let body = br#"{"payload":{"merchantReferenceId":"ref-b"}}"#;
        assert_eq!(
            service.validate_webhook(body, None).await.unwrap(),
            WebhookOutcome::Completed
        );
        let loaded = store.load(2).await.unwrap().unwrap();
        assert!(PaymentStatus::parse(loaded.field(fields::PAID)).is_terminal());
    }

    #[tokio::test]
    async fn stale_reference_is_orphaned_by_overwrite() {
        let (store, service) =
            service_with(vec![tracked_submission(42, "ref-old", "pending")]).await;

        // A second payment attempt overwrites the reference.
        store
            .set_field(42, fields::TRANSACTION_REFERENCE, "ref-new")
            .await
            .unwrap();

        assert_eq!(
            service.validate_callback(42, "ref-old").await.unwrap(),
            CallbackOutcome::Ignored
        );
        let body = br#"{"payload":{"merchantReferenceId":"ref-old"}}"#;
        assert_eq!(
            service.validate_webhook(body, None).await.unwrap(),
            WebhookOutcome::NotApplicable
        );
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("pending"));
    }

    #[tokio::test]
    async fn signed_webhooks_require_a_valid_signature() {
        use hmac::{Hmac, Mac};
        use sha2::Sha512;

        let store = Arc::new(MemorySubmissionStore::new());
        store
            .insert(tracked_submission(42, "ref-1", "pending"))
            .await;
        let service = ValidationService::new(store.clone(), Some("sig-key".to_string()));

        let body = br#"{"payload":{"merchantReferenceId":"ref-1"}}"#;

        // Missing header
        assert_eq!(
            service.validate_webhook(body, None).await.unwrap(),
            WebhookOutcome::NotApplicable
        );
        // Wrong digest
        assert_eq!(
            service
                .validate_webhook(body, Some("sha512=deadbeef"))
                .await
                .unwrap(),
            WebhookOutcome::NotApplicable
        );
        let loaded = store.load(42).await.unwrap().unwrap();
        assert_eq!(loaded.field(fields::PAID), Some("pending"));

        // Valid digest
        let mut mac = Hmac::<Sha512>::new_from_slice(b"sig-key").unwrap();
        mac.update(body);
        let header = format!("sha512={}", hex::encode(mac.finalize().into_bytes()));
        assert_eq!(
            service
                .validate_webhook(body, Some(&header))
                .await
                .unwrap(),
            WebhookOutcome::Completed
        );
    }
}
