pub mod payments;
pub mod validation;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::services::{SessionInitiator, ValidationService};

#[derive(Clone)]
pub struct AppState {
    pub initiator: Arc<SessionInitiator>,
    pub validation: Arc<ValidationService>,
    /// Landing page both validation redirects land on.
    pub front_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/payments/initiate", post(payments::initiate_payment))
        .route("/validate/{sid}", get(validation::validate_callback))
        .route("/webhook", post(webhook::handle_webhook))
        .with_state(state)
}
