//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the run routes
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use std::sync::Arc;

use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, SecretStore};
use crate::http::forward::{run_app, run_without_app};
use crate::http::request::X_REQUEST_ID;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub secrets: Arc<SecretStore>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &ProxyConfig, secrets: SecretStore) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: Arc::new(UpstreamClient::new(&config.upstream)?),
            secrets: Arc::new(secrets),
            max_body_bytes: config.limits.max_body_bytes,
        })
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/lam/{app_name}/run", post(run_app))
        .route("/lam//run", post(run_without_app))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
}

/// HTTP server for the LAM proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig, secrets: SecretStore) -> Result<Self, UpstreamError> {
        let state = AppState::new(&config, secrets)?;
        let router = build_router(state);
        Ok(Self { router, config })
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
