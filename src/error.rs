//! Error types for the promodesk client.
//!
//! Every failure a workflow can surface maps to one variant here. The
//! workflows never retry: an error ends the user action that produced it and
//! becomes the status message shown to the operator.

/// Result type for promodesk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// A mutating call was attempted without a bearer credential.
    #[error("not authenticated: log in to obtain a token")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, connect, reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// The call did not complete within the configured bound.
    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// An edit operation was called with no edit session open.
    #[error("no image is being edited")]
    NoEditSession,

    /// The open edit session routes to the other commit path.
    #[error("cannot {attempted}: the edit session is {actual}")]
    WrongEditIntent {
        attempted: &'static str,
        actual: &'static str,
    },

    /// Another mutation on the same target is still in flight.
    #[error("{0} is already in progress")]
    Busy(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// True for failures the caller should answer with a login prompt.
    ///
    /// Covers a missing credential and a backend that rejected the one sent.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Http {
                status: 401 | 403,
                ..
            }
        )
    }

    /// Text shown to the operator for this failure.
    ///
    /// Validation messages are shown as-is; everything else is prefixed
    /// with `Error: `.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), status.canonical_reason().unwrap_or("request failed"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
