//! The single outbound call to the LAM API.
//!
//! # Responsibilities
//! - Own the shared `reqwest::Client` (connection pooling per client defaults)
//! - Template the run URL from the configured base URL
//! - Attach the passcode and secret headers
//! - Send exactly once, never retry

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::config::{SecretKey, UpstreamConfig};
use crate::http::request::{RACCOON_PASSCODE, SECRET_KEY};

/// Error talking to the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream base URL `{0}`")]
    BaseUrl(String),
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to build upstream request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("upstream request failed: {0}")]
    Send(#[source] reqwest::Error),
}

/// Client for `POST {base_url}/lam/{app_name}/run`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| UpstreamError::BaseUrl(config.base_url.clone()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(UpstreamError::Client)?;

        Ok(Self { http, base_url })
    }

    /// Append `lam/{app_name}/run` to the base URL path.
    ///
    /// The application name is percent-encoded as one segment, so `/` or `?`
    /// inside it can never change the target path.
    pub fn run_url(&self, app_name: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["lam", app_name, "run"]);
        Ok(url)
    }

    /// Forward a run request. The body is sent byte-for-byte.
    pub async fn run(
        &self,
        app_name: &str,
        passcode: HeaderValue,
        secret: &SecretKey,
        body: Bytes,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = self.run_url(app_name)?;

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(RACCOON_PASSCODE, passcode)
            .header(SECRET_KEY, secret.header_value().clone())
            .body(body)
            .build()
            .map_err(UpstreamError::Request)?;

        tracing::debug!(url = %request.url(), app_name, "Forwarding run request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(UpstreamError::Send)?;

        tracing::debug!(status = %response.status(), app_name, "Upstream responded");
        Ok(response)
    }
}
