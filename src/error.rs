//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    /// Credentials could not be loaded or the token handshake failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Vertex AI error: {0}")]
    AiProvider(String),

    /// The remote call succeeded but returned nothing usable. Any text the
    /// model sent back alongside is kept so it can be shown instead.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
        text: Option<String>,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            text: None,
        }
    }

    /// Text returned by the model when no media could be extracted.
    pub fn fallback_text(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { text, .. } => text.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_text_only_for_malformed() {
        let err = Error::MalformedResponse {
            message: "no image".to_string(),
            text: Some("I can't do that".to_string()),
        };
        assert_eq!(err.fallback_text(), Some("I can't do that"));
        assert_eq!(Error::Validation("x".to_string()).fallback_text(), None);
        assert_eq!(Error::malformed("empty").fallback_text(), None);
    }
}
