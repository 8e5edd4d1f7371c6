//! OpenAI-compatible chat-completions provider
//!
//! Speaks the `/chat/completions` wire format, which Groq serves under
//! `https://api.groq.com/openai/v1`.
//! See: https://console.groq.com/docs/openai
//!
//! # Examples
//!
//! ## Groq from environment variables
//!
//! ```no_run
//! use finance_llm::{CompletionRequest, LLMProvider};
//! use finance_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY (and GROQ_API_BASE if set)
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::groq_from_env()?)?;
//!
//!     let request = CompletionRequest::user("llama3-70b-8192", "Hello!").with_max_tokens(100);
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Other OpenAI-compatible APIs
//!
//! ```no_run
//! use finance_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let local_config = OpenAIConfig::new("not-needed")
//!     .with_api_base("http://localhost:8000/v1")
//!     .with_timeout(Duration::from_secs(180));
//!
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
/// Groq's OpenAI-compatible endpoint
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Endpoint, credentials and timeout for one backend
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,

    /// Base URL of the API, without the `/chat/completions` suffix
    pub api_base: String,

    pub timeout: Duration,

    /// Name reported by [`LLMProvider::name`]
    pub provider_name: String,
}

impl OpenAIConfig {
    /// OpenAI itself, with a 120s timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: OPENAI_API_BASE.to_string(),
            timeout: Duration::from_secs(120),
            provider_name: "openai".to_string(),
        }
    }

    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new(api_key)
            .with_api_base(GROQ_API_BASE)
            .with_provider_name("groq")
    }

    /// Groq, keyed by `GROQ_API_KEY`
    ///
    /// A blank key counts as missing. `GROQ_API_BASE` overrides the endpoint.
    pub fn groq_from_env() -> Result<Self> {
        let non_blank = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GROQ_API_KEY").ok_or_else(|| {
            LLMError::ConfigurationError("GROQ_API_KEY environment variable not set".to_string())
        })?;

        let config = Self::groq(api_key);
        Ok(match non_blank("GROQ_API_BASE") {
            Some(base) => config.with_api_base(base),
            None => config,
        })
    }

    /// Trailing slashes are dropped
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }
}

/// Sends [`CompletionRequest`]s to `{api_base}/chat/completions`
pub struct OpenAIProvider {
    http: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// OpenAI with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(
        skip(self, request),
        fields(model = %request.model, api_base = %self.config.api_base)
    )]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let wire_request = ChatRequest::from_request(request);
        debug!(
            "Sending {} message(s) to {}",
            wire_request.messages.len(),
            self.config.api_base
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(wire_request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        into_completion(body)
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }
}

// Chat-completions wire format

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatRequest {
    fn from_request(request: CompletionRequest) -> Self {
        let messages = request
            .messages
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();

        Self {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

fn into_completion(body: ChatResponse) -> Result<CompletionResponse> {
    // Only the first choice is used
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let usage = body.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}
