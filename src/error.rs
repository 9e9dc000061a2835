//! Error types and handling for Argus
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Argus operations
pub type Result<T> = std::result::Result<T, ArgusError>;

/// Errors produced while decoding a charging feed frame.
///
/// Decode failures are recoverable by contract: the feed swallows them with
/// a diagnostic and keeps the connection alive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame was not syntactically valid JSON
    #[error("malformed frame: {detail}")]
    Malformed { detail: String },

    /// The frame parsed but a required field was missing or invalid
    #[error("invalid schema: field '{field}' - {detail}")]
    InvalidSchema { field: String, detail: String },
}

impl DecodeError {
    /// Create a new malformed-frame error
    pub fn malformed<S: Into<String>>(detail: S) -> Self {
        DecodeError::Malformed {
            detail: detail.into(),
        }
    }

    /// Create a new invalid-schema error for a specific field
    pub fn invalid_schema<S: Into<String>>(field: S, detail: S) -> Self {
        DecodeError::InvalidSchema {
            field: field.into(),
            detail: detail.into(),
        }
    }
}

/// Main error type for Argus
#[derive(Debug, Error)]
pub enum ArgusError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// WebSocket transport errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Feed frame decode errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// View projection misuse (programming error, fails loudly)
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// REST API errors (user-visible, retryable)
    #[error("API error: {message}")]
    Api { message: String },

    /// Authentication/authorization errors
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl ArgusError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ArgusError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        ArgusError::Transport {
            message: message.into(),
        }
    }

    /// Create a new projection error
    pub fn projection<S: Into<String>>(message: S) -> Self {
        ArgusError::Projection {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        ArgusError::Api {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        ArgusError::Auth {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        ArgusError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ArgusError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        ArgusError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        ArgusError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ArgusError {
    fn from(err: std::io::Error) -> Self {
        ArgusError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ArgusError {
    fn from(err: serde_yaml::Error) -> Self {
        ArgusError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ArgusError {
    fn from(err: serde_json::Error) -> Self {
        ArgusError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ArgusError {
    fn from(err: reqwest::Error) -> Self {
        ArgusError::api(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ArgusError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ArgusError::transport(err.to_string())
    }
}

impl From<chrono::ParseError> for ArgusError {
    fn from(err: chrono::ParseError) -> Self {
        ArgusError::validation("datetime", &err.to_string())
    }
}
