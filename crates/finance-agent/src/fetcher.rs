//! Ticker data fetcher: price history, current price and key metrics for one symbol

use crate::api::{
    AlphaVantageClient, CompanyOverview, CompanyProfile, FundamentalsSource, PriceHistory,
    QuoteSource, YahooFinanceClient,
};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::model::{Metric, PriceSeries, TickerData, TickerMetrics};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Source of per-ticker market data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch metrics and price history for `symbol`
    ///
    /// Fails with [`StockError::DataUnavailable`] when the symbol is unknown or
    /// the provider has no data for it.
    async fn fetch(&self, symbol: &str) -> Result<TickerData>;
}

/// Yahoo Finance for prices and company details, Alpha Vantage (when
/// configured) for whatever Yahoo leaves out
pub struct MarketDataFetcher {
    quotes: Arc<dyn QuoteSource>,
    fundamentals: Option<Arc<dyn FundamentalsSource>>,
    retry: RetryPolicy,
    range: String,
}

impl MarketDataFetcher {
    pub fn new(config: &StockConfig) -> Result<Self> {
        let fundamentals = match &config.alpha_vantage_api_key {
            Some(key) => {
                let client = AlphaVantageClient::new(key.clone(), config.request_timeout)?;
                Some(Arc::new(client) as Arc<dyn FundamentalsSource>)
            }
            None => {
                debug!("ALPHA_VANTAGE_API_KEY not set, fundamentals come from Yahoo only");
                None
            }
        };

        let quotes = Arc::new(YahooFinanceClient::new(config.request_timeout));
        Self::with_sources(config, quotes, fundamentals)
    }

    pub fn with_sources(
        config: &StockConfig,
        quotes: Arc<dyn QuoteSource>,
        fundamentals: Option<Arc<dyn FundamentalsSource>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            quotes,
            fundamentals,
            retry: RetryPolicy::from_config(config),
            range: config.history_range.clone(),
        })
    }

    /// Company details are optional; a failure only leaves metrics missing
    async fn profile(&self, symbol: &str) -> CompanyProfile {
        self.retry
            .execute("yahoo profile", || self.quotes.profile(symbol))
            .await
            .unwrap_or_else(|e| {
                warn!("No Yahoo company profile for {}: {}", symbol, e);
                CompanyProfile::default()
            })
    }

    async fn overview(&self, symbol: &str) -> Option<CompanyOverview> {
        let source = self.fundamentals.as_ref()?;
        match self
            .retry
            .execute("alpha vantage overview", || source.overview(symbol))
            .await
        {
            Ok(overview) => Some(overview),
            Err(e) => {
                warn!("No fundamentals for {}: {}", symbol, e);
                None
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str) -> Result<TickerData> {
        let PriceHistory {
            series: history,
            profile: chart,
        } = self
            .retry
            .execute("yahoo history", || self.quotes.history(symbol, &self.range))
            .await?;

        let last_close = history
            .last()
            .map(|p| p.close)
            .ok_or_else(|| StockError::unavailable(symbol, "no price history returned"))?;

        let (latest, summary, overview) = futures::future::join3(
            self.retry
                .execute("yahoo quote", || self.quotes.latest_price(symbol)),
            self.profile(symbol),
            self.overview(symbol),
        )
        .await;

        let current_price = latest.unwrap_or_else(|e| {
            warn!("Latest quote for {} failed ({}), using last close", symbol, e);
            last_close
        });

        let profile = summary.or(chart);
        Ok(TickerData {
            metrics: build_metrics(symbol, current_price, &profile, overview.as_ref(), &history),
            history,
        })
    }
}

/// Combine provider details with metrics derived from the price history
///
/// Yahoo's profile wins over the Alpha Vantage overview field by field. The
/// 1-year change always comes from the history, and the history fills in a
/// 52-week range neither provider reported.
pub fn build_metrics(
    symbol: &str,
    current_price: f64,
    profile: &CompanyProfile,
    overview: Option<&CompanyOverview>,
    history: &PriceSeries,
) -> TickerMetrics {
    let mut metrics = TickerMetrics::new(symbol, current_price);

    let name = profile
        .long_name
        .as_deref()
        .or_else(|| overview.and_then(CompanyOverview::company_name));
    if let Some(name) = name {
        metrics = metrics.with_company_name(name);
    }

    metrics = metrics
        .with_fallback(Metric::MarketCap, profile.market_cap)
        .with_fallback(Metric::PeRatio, profile.pe_ratio)
        .with_fallback(Metric::Eps, profile.eps)
        .with_fallback(Metric::FiftyTwoWeekHigh, profile.week_52_high)
        .with_fallback(Metric::FiftyTwoWeekLow, profile.week_52_low)
        .with_fallback(Metric::TargetPrice, profile.target_price);

    if let Some(overview) = overview {
        metrics = metrics
            .with_fallback(Metric::MarketCap, overview.market_cap())
            .with_fallback(Metric::PeRatio, overview.pe_ratio())
            .with_fallback(Metric::Eps, overview.eps())
            .with_fallback(Metric::FiftyTwoWeekHigh, overview.week_52_high())
            .with_fallback(Metric::FiftyTwoWeekLow, overview.week_52_low())
            .with_fallback(Metric::TargetPrice, overview.target_price());
    }

    let recommendation = profile
        .recommendation
        .clone()
        .or_else(|| overview.and_then(CompanyOverview::recommendation).map(str::to_string));
    if let Some(rating) = recommendation {
        metrics = metrics.with_metric(Metric::Recommendation, rating);
    }

    metrics
        .with_fallback(Metric::FiftyTwoWeekHigh, history.high())
        .with_fallback(Metric::FiftyTwoWeekLow, history.low())
        .with_fallback(Metric::PriceChange1y, history.change_percent())
}

/// Upper-case, trim and de-duplicate symbols, keeping first-seen order
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for symbol in symbols {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}
