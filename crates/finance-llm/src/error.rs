//! Errors returned by chat-completion providers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

/// Failure of a single completion request
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The provider answered, but not in the chat-completions shape
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Missing key or unusable provider settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LLMError::ModelNotFound("llama3-70b-8192".to_string());
        assert_eq!(err.to_string(), "Model not found: llama3-70b-8192");

        let err = LLMError::ConfigurationError("GROQ_API_KEY not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: GROQ_API_KEY not set");
    }
}
