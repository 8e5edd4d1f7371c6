//! Completion request and response types

use crate::Message;
use serde::{Deserialize, Serialize};

/// Token budget used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One chat-completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    pub messages: Vec<Message>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Empty request for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    /// Request holding a single user message
    pub fn user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(model).with_message(Message::user(prompt))
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Characters across every message
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.text().chars().count()).sum()
    }
}

/// The provider's reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// True when generation stopped at the token limit
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    /// Output withheld by the provider's content filter
    ContentFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_construction() {
        let request = CompletionRequest::user("llama3-70b-8192", "Summarize AAPL")
            .with_message(Message::assistant("Apple Inc"))
            .with_max_tokens(2048)
            .with_temperature(0.2);

        assert_eq!(request.model, "llama3-70b-8192");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].text(), "Summarize AAPL");
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.prompt_chars(), 14 + 9);
    }

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("m");
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
        assert!(request.messages.is_empty());
        assert_eq!(request.prompt_chars(), 0);
    }

    #[test]
    fn test_truncated_response() {
        let response = CompletionResponse {
            message: Message::assistant("partial"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
        };
        assert!(response.is_truncated());
        assert_eq!(response.text(), "partial");
        assert_eq!(response.usage.total(), 150);
    }
}
