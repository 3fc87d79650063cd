//! Error types for SolusVM operations.
//!
//! Every failure a caller can observe is surfaced through [`Error`]: transport problems while
//! talking to the panel, undecodable response bodies, API-level failures reported by the panel
//! and malformed resource-usage figures.

use thiserror::Error;

/// Main error type for SolusVM operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The HTTP exchange failed.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The HTTP exchange timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The panel could not be reached.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The response body is not well-formed XML.
    #[error("Failed to decode SolusVM response: {0}")]
    Decode(String),

    /// The panel answered, but reported that the operation failed.
    ///
    /// Displays as the panel's status message, verbatim.
    #[error("{message}")]
    Remote {
        /// Value of the `status` element (usually `error`)
        status: String,
        /// Value of the `statusmsg` element
        message: String,
    },

    /// A `total,used,free,percent` usage string could not be parsed.
    #[error("Malformed {field} usage `{value}`: {reason}")]
    MalformedUsage {
        /// Name of the response element (`hdd`, `mem` or `bw`)
        field: String,
        /// Raw value as received
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Snapshot could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Specialized result type for SolusVM operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a [`Error::Remote`] from a decoded status/message pair.
    #[must_use]
    pub fn remote(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Builds a [`Error::MalformedUsage`].
    #[must_use]
    pub fn malformed_usage(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedUsage {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Remote { .. } => "REMOTE_OPERATION_FAILED",
            Self::MalformedUsage { .. } => "MALFORMED_USAGE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns true if the error happened while exchanging bytes with the panel.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }

    /// Returns true if this error should be logged as a serious error.
    ///
    /// Remote failures are ordinary answers from the panel (bad credentials, VM already
    /// running) and are left to the caller.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Timeout(_)
                | Self::ServiceUnavailable(_)
                | Self::Decode(_)
                | Self::MalformedUsage { .. }
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}
