//! Stock analysis and multi-ticker comparison
//!
//! This crate gathers market data for one or more tickers and turns it into
//! analyst prompts for a chat-completion model. It includes:
//!
//! - Data fetching (Yahoo Finance prices, optional Alpha Vantage fundamentals)
//! - Comparison assembly: per-ticker metrics plus price histories aligned on
//!   their common dates and rebased to 100
//! - Prompt building for single-stock and comparison analysis
//! - Analysis requests through any [`finance_llm::LLMProvider`]
//! - Terminal tables for the assembled data
//!
//! # Example
//!
//! ```rust,ignore
//! use finance_agent::{
//!     AnalysisClient, AnalysisConfig, ComparisonAssembler, MarketDataFetcher, StockConfig,
//! };
//! use finance_llm::providers::{OpenAIConfig, OpenAIProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = MarketDataFetcher::new(&StockConfig::default().with_env_api_key())?;
//!     let assembler = ComparisonAssembler::new(Arc::new(fetcher));
//!     let comparison = assembler.assemble(["AAPL", "MSFT", "GOOGL"]).await?;
//!
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::groq_from_env()?)?;
//!     let client = AnalysisClient::new(Arc::new(provider), AnalysisConfig::from_env());
//!     println!("{}", client.compare(&comparison.table).await?);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod compare;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod presets;
pub mod prompts;
pub mod render;
pub mod retry;

// Re-export main types for convenience
pub use analysis::AnalysisClient;
pub use compare::ComparisonAssembler;
pub use config::{AnalysisConfig, StockConfig};
pub use error::{Result, StockError};
pub use fetcher::{MarketDataFetcher, MarketDataProvider};
pub use model::{
    Comparison, ComparisonRow, ComparisonTable, Metric, MetricValue, NormalizedSeries,
    PricePoint, PriceSeries, RowStatus, TickerData, TickerMetrics,
};
pub use presets::Preset;
pub use prompts::{build_comparison_prompt, build_single_prompt};
