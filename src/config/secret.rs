//! Upstream secret key resolution.
//!
//! The secret is read from the process environment first and from an
//! optional dotenv file second. The file is parsed with `dotenvy` without
//! touching the process environment, so repeated resolution always reflects
//! the file's current contents.

use std::fmt;
use std::path::PathBuf;

use axum::http::header::{HeaderValue, InvalidHeaderValue};

use crate::config::schema::SecretConfig;

/// Error resolving the secret key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("secret key variable `{var}` is not set")]
    Missing { var: String },
    #[error("secret key in `{var}` is not a valid header value")]
    Invalid { var: String },
    #[error("failed to read env file `{path}`: {reason}")]
    EnvFile { path: String, reason: String },
}

/// The secret sent upstream in the `secret-key` header.
#[derive(Clone)]
pub struct SecretKey(HeaderValue);

impl SecretKey {
    /// Wrap a secret string. Fails when it cannot be sent as a header value.
    pub fn parse(value: &str) -> Result<Self, InvalidHeaderValue> {
        let mut header = HeaderValue::from_str(value)?;
        header.set_sensitive(true);
        Ok(Self(header))
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Where to look for the secret key.
#[derive(Debug, Clone)]
pub struct SecretSource {
    var: String,
    env_file: Option<PathBuf>,
}

impl SecretSource {
    pub fn new(var: impl Into<String>, env_file: Option<PathBuf>) -> Self {
        Self {
            var: var.into(),
            env_file,
        }
    }

    pub fn from_config(config: &SecretConfig) -> Self {
        Self::new(config.env_var.clone(), config.env_file.as_ref().map(PathBuf::from))
    }

    /// Resolve the secret from the process environment, then the env file.
    pub fn load(&self) -> Result<SecretKey, SecretError> {
        self.load_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn load_with<F>(&self, lookup: F) -> Result<SecretKey, SecretError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = match lookup(&self.var).filter(|v| !v.is_empty()) {
            Some(value) => Some(value),
            None => self.read_env_file()?,
        };

        let value = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SecretError::Missing {
                var: self.var.clone(),
            })?;

        SecretKey::parse(&value).map_err(|_| SecretError::Invalid {
            var: self.var.clone(),
        })
    }

    fn read_env_file(&self) -> Result<Option<String>, SecretError> {
        let Some(path) = &self.env_file else {
            return Ok(None);
        };

        let env_file_error = |e: dotenvy::Error| SecretError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => return Ok(None),
            Err(e) => return Err(env_file_error(e)),
        };

        let mut found = None;
        for entry in entries {
            let (key, value) = entry.map_err(env_file_error)?;
            if key == self.var {
                found = Some(value);
            }
        }
        Ok(found)
    }
}

/// Read-only secret store shared by all requests.
#[derive(Debug)]
pub enum SecretStore {
    /// Resolved once at startup; a failure is kept and reported per request.
    Loaded(Result<SecretKey, SecretError>),
    /// Resolved again on every request.
    Reloading(SecretSource),
}

impl SecretStore {
    pub fn from_config(config: &SecretConfig) -> Self {
        let source = SecretSource::from_config(config);

        if config.reload_per_request {
            tracing::info!(var = %config.env_var, "Secret key resolved per request");
            return Self::Reloading(source);
        }

        let loaded = source.load();
        match &loaded {
            Ok(_) => tracing::info!(var = %config.env_var, "Secret key loaded"),
            Err(e) => tracing::warn!(
                error = %e,
                "Secret key unavailable, run requests will fail until restart"
            ),
        }
        Self::Loaded(loaded)
    }

    /// A store holding a known key.
    pub fn fixed(key: SecretKey) -> Self {
        Self::Loaded(Ok(key))
    }

    pub fn resolve(&self) -> Result<SecretKey, SecretError> {
        match self {
            Self::Loaded(loaded) => loaded.clone(),
            Self::Reloading(source) => source.load(),
        }
    }
}
