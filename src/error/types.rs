//! Error types for the feedback submitter
//!
//! Authentication outcomes are a dedicated [`AuthFailure`] kind embedded in
//! the main [`Error`] enum so callers can tell an authentication failure
//! apart from a transport failure without downcasting.

use thiserror::Error;

/// Unrecoverable authentication outcomes raised by the session manager.
///
/// Transport-level problems (connection failures, timeouts) are *not*
/// authentication failures; they surface as [`Error::Http`] unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No usable credentials exist and refresh could not produce any,
    /// before any network call was attempted.
    #[error("no credentials available and refresh failed")]
    NoCredentials,

    /// A 401 was received and the refresh protocol could not obtain new
    /// usable credentials (headless blocked and no interactive attempt
    /// remained, or the interactive attempt itself failed).
    #[error("unable to refresh credentials automatically")]
    RefreshFailed,

    /// Refresh produced new credentials, but the retried call was still
    /// rejected with 401. The refreshed credentials are invalid or
    /// insufficiently scoped.
    #[error("credential refresh did not resolve the 401 rejection")]
    StillUnauthorized,
}

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport errors, propagated unchanged from reqwest
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failures from the session manager
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date/time parsing errors
    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Credential cache errors
    #[error("Credential cache error during {operation}: {details}")]
    Cache {
        /// The cache operation that failed
        operation: String,
        /// Detailed error description
        details: String,
    },

    /// Browser login helper errors
    #[error("Browser login failed: {reason}")]
    Browser {
        /// The reason the login helper could not run or produce credentials
        reason: String,
    },

    /// The remote service answered with a status the caller did not expect
    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code of the response
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a credential cache error
    pub fn cache<S: Into<String>>(operation: S, details: S) -> Self {
        Self::Cache {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// Create a browser login error
    pub fn browser(reason: impl Into<String>) -> Self {
        Self::Browser {
            reason: reason.into(),
        }
    }

    /// Create an unexpected-status error from a response status and body
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Check whether this error is one of the authentication kinds
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check whether this error is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Get the authentication failure kind, if any
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            Error::Auth(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "transport",
            Error::Auth(AuthFailure::NoCredentials) => "auth_no_credentials",
            Error::Auth(AuthFailure::RefreshFailed) => "auth_refresh_failed",
            Error::Auth(AuthFailure::StillUnauthorized) => "auth_still_unauthorized",
            Error::Json(..) => "json",
            Error::Toml(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::DateParse(..) => "date_parse",
            Error::Config { .. } => "config",
            Error::Cache { .. } => "cache",
            Error::Browser { .. } => "browser",
            Error::UnexpectedStatus { .. } => "unexpected_status",
        }
    }
}
