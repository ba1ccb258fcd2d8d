use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::AppState;
use crate::services::WebhookOutcome;

const SIGNATURE_HEADER: &str = "x-anet-signature";

/// POST /webhook
///
/// Asynchronous provider notification. Responds `200 "TRUE"` once the event
/// is correlated to a submission, `204 ""` for everything else — never an
/// error status, so the provider does not retry events we cannot use.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.validation.validate_webhook(&body, signature).await {
        Ok(WebhookOutcome::Completed) => (StatusCode::OK, "TRUE").into_response(),
        Ok(WebhookOutcome::NotApplicable) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(error = %err, "Webhook validation failed");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
