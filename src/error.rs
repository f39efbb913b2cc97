//! Error types for background removal API calls

use std::fmt;
use thiserror::Error;

/// Result type alias for background removal API operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Closed set of error kinds a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid API key (401)
    Authentication,
    /// The key is valid but not allowed to perform the operation (403)
    Permission,
    /// Not enough credits left on the account (402)
    PaymentRequired,
    /// Too many requests (429)
    RateLimit,
    /// The request or the submitted image was rejected
    Validation,
    /// The service or one of its upstreams failed
    Server,
    /// No response arrived within the configured timeout
    Timeout,
    /// Unknown error code or an error body that could not be parsed
    Unclassified,
}

impl ErrorKind {
    /// Whether repeating the same request later can reasonably succeed.
    ///
    /// The client itself never retries; this is a hint for callers that do.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Server | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Permission => write!(f, "permission"),
            Self::PaymentRequired => write!(f, "payment_required"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Validation => write!(f, "validation"),
            Self::Server => write!(f, "server"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Application-level error reported by (or on behalf of) the remote service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// Kind used for caller-side branching
    pub kind: ErrorKind,
    /// Human readable message
    pub message: String,
    /// Machine code as sent by the service (`unknown_error` / `timeout` for local ones)
    pub code: String,
    /// HTTP status of the failing response
    pub status: Option<u16>,
    /// Request id for support correlation
    pub request_id: Option<String>,
    /// Additional detail string sent by the service
    pub details: Option<String>,
}

impl ApiError {
    /// Code used when a failing response carried no parseable error body
    pub const UNKNOWN_CODE: &'static str = "unknown_error";

    /// Code used for requests that exceeded the client timeout
    pub const TIMEOUT_CODE: &'static str = "timeout";

    /// Status reported for timed out requests
    pub const TIMEOUT_STATUS: u16 = 408;

    /// Reason text used for statuses without a canonical reason phrase
    pub const UNKNOWN_STATUS_TEXT: &'static str = "Unknown Status";

    /// Error for a failing response whose body was not a valid error payload
    pub fn unparseable(status: u16, status_text: &str) -> Self {
        let status_text = match status_text.trim() {
            "" => Self::UNKNOWN_STATUS_TEXT,
            text => text,
        };
        Self {
            kind: ErrorKind::Unclassified,
            message: format!("HTTP {}: {}", status, status_text),
            code: Self::UNKNOWN_CODE.to_string(),
            status: Some(status),
            request_id: None,
            details: None,
        }
    }

    /// Error for a request that got no response within `timeout`
    pub fn timeout(timeout: std::time::Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: format!("Request timed out after {}ms", timeout.as_millis()),
            code: Self::TIMEOUT_CODE.to_string(),
            status: Some(Self::TIMEOUT_STATUS),
            request_id: None,
            details: None,
        }
    }
}

/// Comprehensive error types for background removal API operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Error returned by the API, classified by kind
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Transport failure unrelated to the timeout (DNS, connection refused, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a path input failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input cannot be turned into an upload
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// The host lacks a capability the input needs (e.g. filesystem access)
    #[error("Environment error: {0}")]
    Environment(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BgRemovalError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported input error
    pub fn unsupported_input<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedInput(msg.into())
    }

    /// Create a new environment error
    pub fn environment<S: Into<String>>(msg: S) -> Self {
        Self::Environment(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// The classified API error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Kind of the API error, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        self.api_error().map(|err| err.kind)
    }

    /// HTTP status of the API error, if this is one
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(|err| err.status)
    }

    /// Request id of the API error, if the service sent one
    pub fn request_id(&self) -> Option<&str> {
        self.api_error().and_then(|err| err.request_id.as_deref())
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == Some(ErrorKind::Timeout)
    }
}
