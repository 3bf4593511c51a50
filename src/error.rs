use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Insightly API operations
#[derive(Debug, Error)]
pub enum InsightlyError {
    /// Connection, DNS or TLS failure in the underlying HTTP client
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response status outside of 200, 201 and 202
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body was not the JSON we expected
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Upload source or download target could not be accessed
    #[error("file error on {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid request construction or client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl InsightlyError {
    /// Create a new HTTP status error
    pub fn http(status: u16, body: String) -> Self {
        InsightlyError::HttpStatus { status, body }
    }

    /// Create a new file error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InsightlyError::File {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, InsightlyError::HttpStatus { status: 404, .. })
    }

    /// Get the HTTP status code if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            InsightlyError::HttpStatus { status, .. } => Some(*status),
            InsightlyError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for InsightlyError {
    fn from(e: url::ParseError) -> Self {
        InsightlyError::Config(format!("invalid URL: {}", e))
    }
}

/// Result type for Insightly operations
pub type Result<T> = std::result::Result<T, InsightlyError>;
