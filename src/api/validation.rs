use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use tracing::error;

use crate::api::AppState;
use crate::services::CallbackOutcome;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub tid: Option<String>,
}

/// GET /validate/{sid}?tid=<reference>
///
/// Browser return from the hosted payment page. Always answers with a
/// redirect to the landing page; a confirmed payment adds a flag the landing
/// page uses to render the thank-you message. Mismatches, unknown ids and
/// store failures are indistinguishable from the caller's point of view.
pub async fn validate_callback(
    State(state): State<AppState>,
    Path(sid): Path<i64>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let outcome = match query.tid.as_deref() {
        Some(tid) => state.validation.validate_callback(sid, tid).await,
        None => Ok(CallbackOutcome::Ignored),
    };

    match outcome {
        Ok(CallbackOutcome::Confirmed) => Redirect::to(&confirmed_url(&state.front_url)),
        Ok(CallbackOutcome::Ignored) => Redirect::to(&state.front_url),
        Err(err) => {
            error!(sid, error = %err, "Callback validation failed");
            Redirect::to(&state.front_url)
        }
    }
}

fn confirmed_url(front_url: &str) -> String {
    let separator = if front_url.contains('?') { '&' } else { '?' };
    format!("{}{}payment=confirmed", front_url, separator)
}
