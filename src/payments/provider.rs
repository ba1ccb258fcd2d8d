use crate::payments::error::GatewayResult;
use crate::payments::types::{HostedSessionRequest, SessionToken};
use async_trait::async_trait;

/// Seam between the session initiator and the concrete hosted-payment-page
/// integration. One provider per deployment; the trait exists so the
/// orchestration can be exercised against a stub.
#[async_trait]
pub trait HostedPageProvider: Send + Sync {
    /// Requests a one-time hosted-payment session. The token is valid for a
    /// single redirect attempt; callers never retry with the same reference
    /// id.
    async fn create_hosted_session(
        &self,
        request: HostedSessionRequest,
    ) -> GatewayResult<SessionToken>;

    /// Host-level URL the hidden redirect form posts the token to. Must be
    /// honored bit-exact by the rendered form.
    fn redirect_endpoint(&self) -> &str;
}
