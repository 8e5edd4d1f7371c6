//! Yahoo Finance API client

use super::QuoteSource;
use crate::error::{Result, StockError};
use crate::model::{PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Company details Yahoo reports next to prices
///
/// Every field is optional: Yahoo leaves them out for funds, fresh listings
/// and some foreign exchanges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyProfile {
    pub long_name: Option<String>,
    pub market_cap: Option<f64>,
    /// Trailing P/E
    pub pe_ratio: Option<f64>,
    /// Trailing EPS
    pub eps: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    /// Mean analyst target
    pub target_price: Option<f64>,
    /// Yahoo's `recommendationKey`, e.g. "buy"
    pub recommendation: Option<String>,
}

impl CompanyProfile {
    /// Keep every field set here and take the rest from `other`
    pub fn or(self, other: CompanyProfile) -> Self {
        Self {
            long_name: self.long_name.or(other.long_name),
            market_cap: self.market_cap.or(other.market_cap),
            pe_ratio: self.pe_ratio.or(other.pe_ratio),
            eps: self.eps.or(other.eps),
            week_52_high: self.week_52_high.or(other.week_52_high),
            week_52_low: self.week_52_low.or(other.week_52_low),
            target_price: self.target_price.or(other.target_price),
            recommendation: self.recommendation.or(other.recommendation),
        }
    }
}

/// Daily closes from the chart endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    pub series: PriceSeries,
    /// Name and 52-week range from the chart metadata
    pub profile: CompanyProfile,
}

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn with_timeout<F, T>(&self, symbol: &str, call: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.timeout, call).await.map_err(|_| {
            StockError::NetworkFailure(format!(
                "Yahoo Finance request for {symbol} timed out after {:?}",
                self.timeout
            ))
        })
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    /// Daily closes for `range` (e.g. "1mo", "1y", "ytd")
    #[instrument(skip(self))]
    async fn history(&self, symbol: &str, range: &str) -> Result<PriceHistory> {
        let end = Utc::now();
        let start = range_start(end, range)?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::InvalidInput(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::InvalidInput(format!("Invalid end timestamp: {e}")))?;

        let provider = connector()?;
        let response = self
            .with_timeout(symbol, provider.get_quote_history(symbol, start_odt, end_odt))
            .await?
            .map_err(|e| map_yahoo_error(symbol, e))?;

        let quotes = response.quotes().map_err(|e| map_yahoo_error(symbol, e))?;

        let (gmtoffset, profile) = match response.metadata() {
            Ok(meta) => (meta.gmtoffset, chart_profile(&meta)),
            Err(e) => {
                debug!("No chart metadata for {}: {}", symbol, e);
                (0, CompanyProfile::default())
            }
        };

        let series = PriceSeries::new(quotes.iter().filter_map(|q| {
            let date = quote_date(q.timestamp, gmtoffset)?;
            // Adjusted close keeps the series continuous across splits and dividends
            let close = if q.adjclose > 0.0 { q.adjclose } else { q.close };
            Some(PricePoint::new(date, close))
        }));

        debug!("Fetched {} daily closes for {}", series.len(), symbol);

        if series.is_empty() {
            return Err(StockError::unavailable(symbol, "no price history returned"));
        }
        Ok(PriceHistory { series, profile })
    }

    #[instrument(skip(self))]
    async fn latest_price(&self, symbol: &str) -> Result<f64> {
        let provider = connector()?;

        let response = self
            .with_timeout(symbol, provider.get_latest_quotes(symbol, "1d"))
            .await?
            .map_err(|e| map_yahoo_error(symbol, e))?;

        let quote = response
            .last_quote()
            .map_err(|e| map_yahoo_error(symbol, e))?;

        if quote.close.is_finite() && quote.close > 0.0 {
            Ok(quote.close)
        } else {
            Err(StockError::unavailable(symbol, "latest quote has no price"))
        }
    }

    #[instrument(skip(self))]
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let mut provider = connector()?;

        let summary = self
            .with_timeout(symbol, provider.get_ticker_info(symbol))
            .await?
            .map_err(|e| map_yahoo_error(symbol, e))?;

        summary_profile(symbol, summary)
    }
}

fn connector() -> Result<yahoo::YahooConnector> {
    yahoo::YahooConnector::new()
        .map_err(|e| StockError::ConfigError(format!("Failed to build Yahoo Finance client: {e}")))
}

/// Trading date of a bar in exchange time
///
/// Daily bars are stamped at the local open, which for exchanges east of UTC
/// falls on the previous UTC day.
fn quote_date(timestamp: i64, gmtoffset: i32) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + i64::from(gmtoffset), 0).map(|dt| dt.date_naive())
}

fn chart_profile(meta: &yahoo::YMetaData) -> CompanyProfile {
    CompanyProfile {
        long_name: meta.long_name.clone().or_else(|| meta.short_name.clone()),
        week_52_high: meta.fifty_two_week_high.filter(|p| *p > 0.0),
        week_52_low: meta.fifty_two_week_low.filter(|p| *p > 0.0),
        ..CompanyProfile::default()
    }
}

fn summary_profile(symbol: &str, summary: yahoo::YQuoteSummary) -> Result<CompanyProfile> {
    let data = summary
        .quote_summary
        .and_then(|s| s.result)
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| StockError::unavailable(symbol, "no quote summary returned"))?;

    let detail = data.summary_detail.as_ref();
    let financial = data.financial_data.as_ref();

    Ok(CompanyProfile {
        long_name: data
            .quote_type
            .as_ref()
            .and_then(|q| q.long_name.clone().or_else(|| q.short_name.clone())),
        market_cap: detail.and_then(|d| d.market_cap).map(|cap| cap as f64),
        // Yahoo sends "Infinity" for a non-positive trailing EPS
        pe_ratio: detail
            .and_then(|d| d.trailing_pe)
            .filter(|pe| pe.is_finite() && *pe < f64::MAX),
        eps: data.default_key_statistics.as_ref().and_then(|k| k.trailing_eps),
        week_52_high: detail.and_then(|d| d.fifty_two_week_high),
        week_52_low: detail.and_then(|d| d.fifty_two_week_low),
        target_price: financial.and_then(|f| f.target_mean_price),
        recommendation: financial
            .and_then(|f| f.recommendation_key.clone())
            .filter(|key| !key.is_empty() && key != "none"),
    })
}

/// Rate limiting and dropped connections are transient; every other Yahoo
/// error means there is no usable data for the symbol
fn map_yahoo_error(symbol: &str, error: yahoo::YahooError) -> StockError {
    match error {
        yahoo::YahooError::ConnectionFailed(e) => StockError::NetworkFailure(e.to_string()),
        e @ (yahoo::YahooError::TooManyRequests(_) | yahoo::YahooError::NoResponse) => {
            StockError::NetworkFailure(e.to_string())
        }
        other => StockError::unavailable(symbol, other.to_string()),
    }
}

/// Start of the window covered by `range`, counting back from `end`
pub fn range_start(end: DateTime<Utc>, range: &str) -> Result<DateTime<Utc>> {
    let days = match range {
        "1d" => 1,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        "2y" => 730,
        "5y" => 1825,
        "10y" => 3650,
        "max" => 36500,
        "ytd" => {
            return NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| StockError::InvalidInput(format!("Invalid year {}", end.year())));
        }
        _ => return Err(StockError::InvalidInput(format!("Invalid range: {range}"))),
    };

    Ok(end - ChronoDuration::days(days))
}
