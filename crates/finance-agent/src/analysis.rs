//! Natural-language analysis through a chat-completion provider

use crate::config::AnalysisConfig;
use crate::error::{Result, StockError};
use crate::model::{ComparisonTable, TickerData};
use crate::prompts::{build_comparison_prompt, build_single_prompt};
use finance_llm::{CompletionRequest, LLMProvider};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Sends analysis prompts to an [`LLMProvider`]
///
/// Every call goes to the provider; nothing is cached.
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn LLMProvider>,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    /// Send `prompt` as a single user message and return the reply text
    ///
    /// Prompts over `max_prompt_chars` are rejected before any request is
    /// made. A provider failure or a blank reply is
    /// [`StockError::AnalysisUnavailable`].
    #[instrument(skip_all, fields(provider = self.provider.name(), model = %self.config.model))]
    pub async fn request(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest::user(&self.config.model, prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let length = request.prompt_chars();
        if length > self.config.max_prompt_chars {
            return Err(StockError::AnalysisUnavailable(format!(
                "prompt is {length} characters, limit is {}",
                self.config.max_prompt_chars
            )));
        }

        debug!("Requesting analysis ({} prompt chars)", length);
        let response = self.provider.complete(request).await.map_err(|e| {
            warn!("Analysis request failed: {}", e);
            StockError::from(e)
        })?;

        if response.message.is_blank() {
            return Err(StockError::AnalysisUnavailable(
                "provider returned an empty response".to_string(),
            ));
        }
        if response.is_truncated() {
            warn!("Analysis was cut off at {} tokens", self.config.max_tokens);
        }

        info!("Received analysis ({} tokens)", response.usage.total());
        Ok(response.text().trim().to_string())
    }

    /// Analyze a single ticker
    pub async fn analyze_stock(&self, data: &TickerData) -> Result<String> {
        let prompt = build_single_prompt(&data.metrics, &data.history)?;
        self.request(&prompt).await
    }

    /// Comparative analysis of every ticker in `table`
    pub async fn compare(&self, table: &ComparisonTable) -> Result<String> {
        if table.available().next().is_none() {
            return Err(StockError::AnalysisUnavailable(
                "no ticker data to compare".to_string(),
            ));
        }
        let prompt = build_comparison_prompt(table)?;
        self.request(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonRow, Metric, PriceSeries, TickerMetrics};
    use async_trait::async_trait;
    use finance_llm::{CompletionResponse, LLMError, Message, StopReason, TokenUsage};

    mockall::mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> finance_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 120,
                output_tokens: 40,
            },
        }
    }

    fn provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.expect_name().return_const("mock".to_string());
        provider
    }

    fn client(provider: MockProvider) -> AnalysisClient {
        AnalysisClient::new(Arc::new(provider), AnalysisConfig::default())
    }

    #[tokio::test]
    async fn test_request_sends_configured_parameters() {
        let mut provider = provider();
        provider
            .expect_complete()
            .withf(|request| {
                request.model == "llama3-70b-8192"
                    && request.max_tokens == 2048
                    && request.temperature == Some(0.2)
                    && request.messages.len() == 1
                    && request.messages[0].text() == "Summarize AAPL"
            })
            .times(1)
            .returning(|_| Ok(reply("  Apple looks solid.\n")));

        let analysis = client(provider).request("Summarize AAPL").await.unwrap();
        assert_eq!(analysis, "Apple looks solid.");
    }

    #[tokio::test]
    async fn test_blank_response_is_unavailable() {
        let mut provider = provider();
        provider.expect_complete().returning(|_| Ok(reply(" \n\t")));

        let result = client(provider).request("Summarize AAPL").await;
        assert!(matches!(result, Err(StockError::AnalysisUnavailable(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_unavailable() {
        let mut provider = provider();
        provider
            .expect_complete()
            .returning(|_| Err(LLMError::RequestFailed("timed out".to_string())));

        let result = client(provider).request("Summarize AAPL").await;
        assert!(matches!(
            result,
            Err(StockError::AnalysisUnavailable(msg)) if msg.contains("timed out")
        ));
    }

    #[test]
    fn test_oversized_prompt_rejected_without_call() {
        let mut provider = provider();
        provider.expect_complete().never();

        let client = AnalysisClient::new(
            Arc::new(provider),
            AnalysisConfig::default().with_max_prompt_chars(10),
        );
        let result = tokio_test::block_on(client.request("this prompt is far too long"));
        assert!(matches!(result, Err(StockError::AnalysisUnavailable(_))));
    }

    #[tokio::test]
    async fn test_identical_prompts_are_not_cached() {
        let mut provider = provider();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok(reply("analysis")));

        let client = client(provider);
        client.request("same prompt").await.unwrap();
        client.request("same prompt").await.unwrap();
    }

    #[tokio::test]
    async fn test_analyze_stock_uses_single_prompt() {
        let mut provider = provider();
        provider
            .expect_complete()
            .withf(|request| {
                let text = request.messages[0].text();
                text.contains("Apple Inc (AAPL)") && text.contains("- P/E Ratio: 29.80")
            })
            .times(1)
            .returning(|_| Ok(reply("Apple analysis")));

        let data = TickerData {
            metrics: TickerMetrics::new("AAPL", 189.5)
                .with_company_name("Apple Inc")
                .with_metric(Metric::PeRatio, 29.8),
            history: PriceSeries::default(),
        };
        assert_eq!(client(provider).analyze_stock(&data).await.unwrap(), "Apple analysis");
    }

    #[tokio::test]
    async fn test_compare_requires_available_rows() {
        let mut provider = provider();
        provider.expect_complete().never();

        let table =
            ComparisonTable::new(vec![ComparisonRow::unavailable("ZZZZINVALID", "no data")]);
        let result = client(provider).compare(&table).await;
        assert!(matches!(result, Err(StockError::AnalysisUnavailable(_))));
    }
}
