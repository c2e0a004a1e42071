//! The run forwarding handler.
//!
//! ```text
//! POST /lam/{app_name}/run
//!     1. resolve secret key        → 500 on failure, nothing sent
//!     2. raccoon-passcode header   → 400 when absent/blank
//!     3. read body, decode stream  → 500 on read failure, 400 on bad JSON
//!     4. application name          → 400 when empty
//!     5-7. one upstream POST       → 500 on transport failure
//!     8-9. relay status + body     (buffered or streamed)
//! ```

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::http::error::ForwardError;
use crate::http::request::{self, RunOptions, X_REQUEST_ID};
use crate::http::response::relay;
use crate::http::server::AppState;

/// `POST /lam/{app_name}/run`
pub async fn run_app(
    State(state): State<AppState>,
    Path(app_name): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ForwardError> {
    forward_run(&state, Some(app_name), &headers, body).await
}

/// `POST /lam//run`: same pipeline, fails at the application name check.
pub async fn run_without_app(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ForwardError> {
    forward_run(&state, None, &headers, body).await
}

async fn forward_run(
    state: &AppState,
    app_name: Option<String>,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, ForwardError> {
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::debug!(
        request_id = %request_id,
        app_name = app_name.as_deref().unwrap_or(""),
        "Run request received"
    );

    let secret = state.secrets.resolve()?;
    let passcode = request::passcode(headers)?;

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| ForwardError::ReadBody(e.to_string()))?;
    let options = RunOptions::from_body(&body)?;

    let app_name = request::app_name(app_name)?;

    let upstream = state
        .upstream
        .run(&app_name, passcode, &secret, body)
        .await?;

    tracing::info!(
        request_id = %request_id,
        app_name = %app_name,
        status = %upstream.status(),
        stream = options.stream,
        "Relaying upstream response"
    );

    relay(upstream, options.into()).await
}
