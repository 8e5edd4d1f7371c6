//! The seam between analysis code and a chat-completion backend

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend such as Groq or any OpenAI-compatible server
///
/// One call to [`complete`](LLMProvider::complete) is one network request.
/// Implementations do not retry or cache.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short backend name used in logs, e.g. "groq"
    fn name(&self) -> &str;
}
