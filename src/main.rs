//! Raccoon LAM proxy.
//!
//! Forwards `POST /lam/{app_name}/run` to the LAM API with the caller's
//! passcode and the process secret key, and relays the response back.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                ┌──────────────────────────────────────────────┐
//!     POST /lam/x/run       │                 LAM PROXY                    │
//!     ──────────────────────┼─▶ http::server (request id, trace)           │
//!                           │      → http::forward                          │
//!                           │          → config::SecretStore (secret-key)   │
//!                           │          → http::request (passcode, stream)   │
//!                           │          → upstream::client ─────────────────┼──▶ LAM API
//!     ◀─────────────────────┼──────── http::response (buffered / streamed) ◀┼───
//!                           └──────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use raccoon_lam_proxy::config::{self, LoggingConfig, SecretStore};
use raccoon_lam_proxy::http::HttpServer;
use raccoon_lam_proxy::lifecycle::{signals, Shutdown};
use raccoon_lam_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match config::load_from_env() {
        Ok(config) => {
            logging::init(&config.logging);
            config
        }
        Err(e) => {
            logging::init(&LoggingConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "raccoon-lam-proxy starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        reload_secret_per_request = config.secret.reload_per_request,
        "Configuration loaded"
    );

    let secrets = SecretStore::from_config(&config.secret);

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                bind_address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listener"
            );
            return Err(e.into());
        }
    };

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config, secrets)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
