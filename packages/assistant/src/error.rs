//! Error types for the assistant layer.
//!
//! Only configuration, input and transport/remote failures are errors.
//! Malformed model output is never an error: the decoder replaces it with an
//! empty value (see [`crate::decode`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    /// Missing or unusable configuration, e.g. no API key in the environment.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller input rejected before any request was built or sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered 2xx but the envelope itself was unreadable.
    #[error("failed to parse model response envelope: {0}")]
    ResponseParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssistantError {
    /// Whether this failure is a configuration problem rather than a remote one.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
