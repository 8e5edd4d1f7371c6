//! Chat-completion layer for finance-agent
//!
//! Provider-neutral request/response types and the [`LLMProvider`] trait.
//! The `openai` feature adds an OpenAI-compatible HTTP provider, which is
//! how Groq (`/openai/v1`) is reached.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

pub use completion::{
    CompletionRequest, CompletionResponse, DEFAULT_MAX_TOKENS, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(feature = "openai")]
pub mod providers;
