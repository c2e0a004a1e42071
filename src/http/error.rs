//! Local failures of the forwarding handler.
//!
//! Upstream status codes are never errors here: a 4xx or 5xx from the LAM API
//! is relayed verbatim. Only failures that happen before a reply is committed
//! map to a local status.

use std::error::Error as StdError;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::SecretError;
use crate::upstream::UpstreamError;

/// Errors the forwarding handler can produce.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("server configuration error: {0}")]
    Configuration(#[from] SecretError),
    #[error("missing required header: raccoon-passcode")]
    MissingPasscode,
    #[error("failed to read request body: {0}")]
    ReadBody(String),
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("missing application name in path")]
    MissingAppName,
    #[error("invalid application name `{0}`")]
    InvalidAppName(String),
    #[error("{}", error_chain(.0))]
    Upstream(#[from] UpstreamError),
    #[error("failed to read upstream response: {}", error_chain(.0))]
    ReadUpstreamBody(#[source] reqwest::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingPasscode
            | Self::InvalidJson(_)
            | Self::MissingAppName
            | Self::InvalidAppName(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_)
            | Self::ReadBody(_)
            | Self::Upstream(_)
            | Self::ReadUpstreamBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Render an error with its sources, e.g. `request failed: connection refused`.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %body, status = %status, "Run request failed");
        } else {
            tracing::warn!(error = %body, status = %status, "Run request rejected");
        }

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
