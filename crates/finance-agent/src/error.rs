//! Error types for finance-agent operations

use thiserror::Error;

/// Finance agent errors
#[derive(Debug, Error)]
pub enum StockError {
    /// The provider has no data for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Transient connectivity problem; a retry may succeed
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The language-model call failed or produced nothing usable
    #[error("AI analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller supplied unusable input (empty symbol list, unknown preset, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Prompt template failed to render
    #[error("Template error: {0}")]
    Template(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StockError {
    /// Shorthand for [`StockError::DataUnavailable`]
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkFailure(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for finance-agent operations
pub type Result<T> = std::result::Result<T, StockError>;

/// LLM failures only ever block the AI summary step
impl From<finance_llm::LLMError> for StockError {
    fn from(err: finance_llm::LLMError) -> Self {
        match err {
            finance_llm::LLMError::ConfigurationError(msg) => StockError::ConfigError(msg),
            other => StockError::AnalysisUnavailable(other.to_string()),
        }
    }
}

impl From<minijinja::Error> for StockError {
    fn from(err: minijinja::Error) -> Self {
        StockError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::unavailable("ZZZZINVALID", "No data found");
        assert_eq!(err.to_string(), "Data not available for ZZZZINVALID: No data found");

        let err = StockError::AnalysisUnavailable("empty response".to_string());
        assert_eq!(err.to_string(), "AI analysis unavailable: empty response");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StockError::NetworkFailure("reset".to_string()).is_transient());
        assert!(!StockError::unavailable("X", "unknown").is_transient());
        assert!(!StockError::ConfigError("missing".to_string()).is_transient());
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: StockError = finance_llm::LLMError::AuthenticationFailed.into();
        assert!(matches!(err, StockError::AnalysisUnavailable(_)));

        let err: StockError =
            finance_llm::LLMError::ConfigurationError("GROQ_API_KEY not set".to_string()).into();
        match err {
            StockError::ConfigError(msg) => assert!(msg.contains("GROQ_API_KEY")),
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }
}
