//! Configuration structures for SolusVM clients.
//!
//! A [`SolusVmConfig`] names the panel and the API credentials of one virtual server. It can be
//! built in code or deserialized from any serde format, and is validated before use.

use crate::client::API_PATH;
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Connection settings for one virtual server on a SolusVM panel.
///
/// The API hash is held as a [`SecretString`]: it is redacted from `Debug` output and never
/// serialized.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SolusVmConfig {
    /// Panel base URL, without the API path (e.g. `https://panel.example.com:5656`)
    #[validate(url)]
    pub host: String,

    /// API key identifying the virtual server
    #[validate(length(min = 1))]
    pub key: String,

    /// API hash (secret)
    #[serde(skip_serializing)]
    pub hash: SecretString,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to a custom CA certificate (PEM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    crate::client::DEFAULT_TIMEOUT_SECS
}

impl SolusVmConfig {
    /// Create a new configuration for the given panel and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host is not a URL, the key is empty or the hash is
    /// empty.
    pub fn new(
        host: impl Into<String>,
        key: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Self, Error> {
        let hash: String = hash.into();
        let config = Self {
            host: host.into(),
            key: key.into(),
            hash: SecretString::from(hash),
            request_timeout_secs: default_request_timeout_secs(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
        };

        config.check()?;
        Ok(config)
    }

    /// Validate a configuration obtained by deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid field.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        if self.hash.expose_secret().is_empty() {
            return Err(Error::ConfigError(
                "Invalid configuration: hash must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full URL of the command endpoint for this panel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the host cannot be parsed.
    pub fn endpoint(&self) -> Result<Url, Error> {
        command_endpoint(&self.host)
    }
}

/// Append the API command path to a panel host and parse the result.
///
/// A trailing slash on `host` is ignored, so `https://panel/` and `https://panel` give the same
/// endpoint.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if the result is not a valid URL.
pub fn command_endpoint(host: &str) -> Result<Url, Error> {
    let joined = format!("{}{API_PATH}", host.trim().trim_end_matches('/'));
    Url::parse(&joined)
        .map_err(|e| Error::InvalidEndpoint(format!("Invalid SolusVM host `{host}`: {e}")))
}
