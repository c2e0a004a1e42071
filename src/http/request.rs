//! Request inspection.
//!
//! # Responsibilities
//! - Extract and check the `raccoon-passcode` header
//! - Validate the application name path segment
//! - Decode the `stream` flag from the JSON body without re-serializing it
//!
//! # Design Decisions
//! - The raw body is what gets forwarded; decoding only inspects it
//! - Unknown body fields are skipped, never materialized
//! - A `stream` value that is not a boolean means "not streamed"

use std::borrow::Cow;
use std::fmt;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};

use crate::http::error::ForwardError;

/// Passcode header, copied from the caller to the upstream.
pub const RACCOON_PASSCODE: HeaderName = HeaderName::from_static("raccoon-passcode");

/// Secret header, set from configuration on the upstream request only.
pub const SECRET_KEY: HeaderName = HeaderName::from_static("secret-key");

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Return the caller's passcode, rejecting absent or blank values.
pub fn passcode(headers: &HeaderMap) -> Result<HeaderValue, ForwardError> {
    headers
        .get(&RACCOON_PASSCODE)
        .filter(|value| !value.as_bytes().trim_ascii().is_empty())
        .cloned()
        .ok_or(ForwardError::MissingPasscode)
}

/// Validate the application name taken from the path.
pub fn app_name(raw: Option<String>) -> Result<String, ForwardError> {
    let name = raw.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ForwardError::MissingAppName);
    }
    // Dot segments would be resolved away when appended to the upstream URL.
    if name == "." || name == ".." {
        return Err(ForwardError::InvalidAppName(name));
    }
    Ok(name)
}

/// Options the proxy reads from a run request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Pipe the upstream body through as it arrives.
    pub stream: bool,
}

impl RunOptions {
    /// Decode options from a JSON object body.
    pub fn from_body(body: &[u8]) -> Result<Self, ForwardError> {
        serde_json::from_slice(body).map_err(ForwardError::InvalidJson)
    }
}

impl<'de> Deserialize<'de> for RunOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RunOptionsVisitor)
    }
}

struct RunOptionsVisitor;

impl<'de> Visitor<'de> for RunOptionsVisitor {
    type Value = RunOptions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<RunOptions, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut options = RunOptions::default();
        while let Some(key) = map.next_key::<Cow<'de, str>>()? {
            if key == "stream" {
                let value: serde_json::Value = map.next_value()?;
                options.stream = value.as_bool().unwrap_or(false);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(options)
    }
}
