//! Error types for the Pulsedesk client

use thiserror::Error;

/// Result type alias for Pulsedesk operations
pub type PulseResult<T> = Result<T, PulseError>;

/// Main error type for the Pulsedesk client
///
/// Per-message problems (undecodable payloads, malformed legacy toast text,
/// unknown services) never surface here; they are handled where they occur.
/// This type covers the failures that are allowed to change component state:
/// transport drops, HTTP failures, and configuration mistakes.
#[derive(Error, Debug, Clone)]
pub enum PulseError {
    /// Push-channel transport errors (stream dropped, reconnects exhausted)
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PulseError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for PulseError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<std::io::Error> for PulseError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PulseError::transport("stream closed");
        assert_eq!(err.to_string(), "Transport error: stream closed");

        let err = PulseError::config("missing base URL");
        assert_eq!(err.to_string(), "Configuration error: missing base URL");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PulseError = json_err.into();
        assert!(matches!(err, PulseError::Json(_)));
    }
}
