//! Response relay.
//!
//! # Responsibilities
//! - Mirror the upstream status code verbatim (no translation)
//! - Always reply with `Content-Type: application/json`
//! - Buffer or stream the upstream body
//!
//! # Design Decisions
//! - Buffered relay reads the whole body before the reply exists, so a read
//!   failure still becomes a clean 500
//! - Streamed relay commits the status first; a mid-stream failure can only
//!   be logged and ends the reply body early

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use futures_util::TryStreamExt;

use crate::http::error::ForwardError;
use crate::http::request::RunOptions;

/// How the upstream body reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Buffered,
    Streamed,
}

impl From<RunOptions> for RelayMode {
    fn from(options: RunOptions) -> Self {
        if options.stream {
            Self::Streamed
        } else {
            Self::Buffered
        }
    }
}

/// Turn the upstream response into the reply for the caller.
pub async fn relay(upstream: reqwest::Response, mode: RelayMode) -> Result<Response, ForwardError> {
    let status = upstream.status();

    let body = match mode {
        RelayMode::Buffered => {
            let bytes = upstream
                .bytes()
                .await
                .map_err(ForwardError::ReadUpstreamBody)?;
            Body::from(bytes)
        }
        RelayMode::Streamed => {
            let chunks = upstream.bytes_stream().inspect_err(|e| {
                tracing::warn!(error = %e, "Upstream stream failed mid-response");
            });
            Body::from_stream(chunks)
        }
    };

    Ok(json_response(status, body))
}

fn json_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
