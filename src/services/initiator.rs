use std::sync::Arc;
use tracing::{error, info};

use crate::payments::error::GatewayResult;
use crate::payments::provider::HostedPageProvider;
use crate::payments::redirect::RedirectForm;
use crate::payments::reference::ReferenceId;
use crate::payments::types::{HostedSessionRequest, Money, PaymentStatus};
use crate::store::{fields, Submission, SubmissionState, SubmissionStore};

/// Orchestrates a payment attempt for a completed form submission: mints the
/// reference id, persists it, requests the hosted-page token and hands the
/// redirect form back to the caller.
pub struct SessionInitiator {
    store: Arc<dyn SubmissionStore>,
    provider: Arc<dyn HostedPageProvider>,
    public_base_url: String,
}

impl SessionInitiator {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        provider: Arc<dyn HostedPageProvider>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            store,
            provider,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Runs on submission save. Returns `Ok(None)` when no payment is due or
    /// when the provider refused the session (fail closed: the user simply
    /// sees no redirect). Missing required fields and store failures
    /// propagate as errors for the boundary to log.
    pub async fn on_submission_completed(
        &self,
        sid: i64,
    ) -> GatewayResult<Option<RedirectForm>> {
        let Some(submission) = self.store.load(sid).await? else {
            return Ok(None);
        };
        if submission.state != SubmissionState::Completed {
            return Ok(None);
        }
        let Some(amount) = due_amount(&submission) else {
            return Ok(None);
        };
        amount.validate_positive(fields::AMOUNT)?;

        let reference_id = ReferenceId::mint();

        // The reference must be on record before the provider call so that a
        // validation racing the session creation can already resolve it.
        // This also orphans any previous in-flight reference for good.
        if submission.has_field(fields::TRANSACTION_REFERENCE) {
            self.store
                .set_field(sid, fields::TRANSACTION_REFERENCE, reference_id.as_str())
                .await?;
        }

        let request = HostedSessionRequest::from_submission(
            &submission,
            amount,
            reference_id.clone(),
            self.return_url(sid, &reference_id),
            self.cancel_url(sid),
        )?;

        match self.provider.create_hosted_session(request).await {
            Ok(token) => {
                if submission.has_field(fields::PAID) {
                    self.store
                        .set_field(sid, fields::PAID, PaymentStatus::Pending.as_str())
                        .await?;
                }
                info!(sid, reference_id = %reference_id, "Hosted payment session created");
                Ok(Some(RedirectForm::new(
                    self.provider.redirect_endpoint(),
                    token,
                )))
            }
            Err(err) if err.is_provider_failure() => {
                error!(sid, error = %err, "Failed to get hosted payment page token");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn return_url(&self, sid: i64, reference_id: &ReferenceId) -> String {
        format!(
            "{}/validate/{}?tid={}",
            self.public_base_url,
            sid,
            reference_id.as_str()
        )
    }

    fn cancel_url(&self, sid: i64) -> String {
        format!("{}/form/{}?cancel=true", self.public_base_url, sid)
    }
}

fn due_amount(submission: &Submission) -> Option<Money> {
    submission
        .field(fields::AMOUNT)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Money::usd)
}
