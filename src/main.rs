use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use formpay_backend::api::{self, AppState};
use formpay_backend::config::AppConfig;
use formpay_backend::health;
use formpay_backend::logging::init_tracing;
use formpay_backend::middleware::logging::UuidRequestId;
use formpay_backend::payments::authorizenet::AuthorizeNetClient;
use formpay_backend::services::{SessionInitiator, ValidationService};
use formpay_backend::store::{
    postgres, MemorySubmissionStore, PgSubmissionStore, SubmissionStore,
};

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;
    init_tracing(&config.logging);

    let store: Arc<dyn SubmissionStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = postgres::init_pool(&database_url).await?;
            info!("Using Postgres submission store");
            Arc::new(PgSubmissionStore::new(pool))
        }
        Err(_) => {
            warn!("DATABASE_URL not set, using in-memory submission store");
            Arc::new(MemorySubmissionStore::new())
        }
    };

    let client = AuthorizeNetClient::from_env()?;
    info!(mode = client.mode().as_str(), "Authorize.Net client configured");

    let state = AppState {
        initiator: Arc::new(SessionInitiator::new(
            store.clone(),
            Arc::new(client),
            config.site.public_base_url.clone(),
        )),
        validation: Arc::new(ValidationService::new(
            store,
            config.site.webhook_signature_key.clone(),
        )),
        front_url: config.site.front_url.clone(),
    };

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(api::router(state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http()),
        );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!(%addr, "Starting formpay-backend");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
