use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct InitiateRequest {
    pub sid: i64,
}

/// POST /payments/initiate
///
/// Triggered by the form workflow when a submission is saved. Responds with
/// the interstitial redirect form on success and 204 otherwise; initiation
/// failures are logged but never surfaced to the user as an error page.
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiateRequest>,
) -> Response {
    info!(sid = request.sid, "Payment initiation requested");

    match state.initiator.on_submission_completed(request.sid).await {
        Ok(Some(form)) => (StatusCode::OK, Html(form.into_html())).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(sid = request.sid, error = %err, "Payment initiation failed");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
