//! API clients for market-data providers

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use yahoo::{CompanyProfile, PriceHistory, YahooFinanceClient};

use crate::error::Result;
use async_trait::async_trait;

/// Prices and company details keyed by ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Daily closes over `range`, with the details the chart metadata carries
    async fn history(&self, symbol: &str, range: &str) -> Result<PriceHistory>;

    async fn latest_price(&self, symbol: &str) -> Result<f64>;

    /// Name, valuation and analyst consensus
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile>;
}

/// Optional second source of company fundamentals
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn overview(&self, symbol: &str) -> Result<CompanyOverview>;
}
