//! Error types for the outer surfaces of `AeroWx`
//!
//! The decoding core never fails: malformed fields degrade to `None`.
//! These errors cover the layers around it (markup, configuration, I/O).

use thiserror::Error;

/// Main error type for the `AeroWx` crate
#[derive(Error, Debug)]
pub enum AeroWxError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Markup that cannot be turned into a navigable tree
    #[error("Document error: {message}")]
    Document { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON rendering errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl AeroWxError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new document error
    pub fn document<S: Into<String>>(message: S) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AeroWxError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and environment.")
            }
            AeroWxError::Document { message } => {
                format!("The report document could not be read: {message}")
            }
            AeroWxError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AeroWxError::Io { .. } => {
                "File operation failed. Please check the path and permissions.".to_string()
            }
            AeroWxError::Json { .. } => "Failed to render the result as JSON.".to_string(),
        }
    }
}
