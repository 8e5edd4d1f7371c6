//! Alpha Vantage API client (company fundamentals)

use super::FundamentalsSource;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
}

/// Company overview data
///
/// Alpha Vantage reports every number as a string and uses "None" or "-" for
/// gaps; read values through the accessor methods rather than the raw fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "MarketCapitalization", default)]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio", default)]
    pub pe_ratio: Option<String>,
    #[serde(rename = "TrailingPE", default)]
    pub trailing_pe: Option<String>,
    #[serde(rename = "EPS", default)]
    pub eps: Option<String>,
    #[serde(rename = "52WeekHigh", default)]
    pub week_52_high: Option<String>,
    #[serde(rename = "52WeekLow", default)]
    pub week_52_low: Option<String>,
    #[serde(default)]
    pub analyst_target_price: Option<String>,
    #[serde(default)]
    pub analyst_rating_strong_buy: Option<String>,
    #[serde(default)]
    pub analyst_rating_buy: Option<String>,
    #[serde(default)]
    pub analyst_rating_hold: Option<String>,
    #[serde(default)]
    pub analyst_rating_sell: Option<String>,
    #[serde(default)]
    pub analyst_rating_strong_sell: Option<String>,
}

/// Parse an Alpha Vantage numeric string
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None" && *s != "-")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

impl CompanyOverview {
    pub fn company_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != "None")
    }

    pub fn market_cap(&self) -> Option<f64> {
        parse_number(self.market_cap.as_deref())
    }

    /// Trailing P/E, falling back to the `PERatio` field
    pub fn pe_ratio(&self) -> Option<f64> {
        parse_number(self.trailing_pe.as_deref()).or_else(|| parse_number(self.pe_ratio.as_deref()))
    }

    pub fn eps(&self) -> Option<f64> {
        parse_number(self.eps.as_deref())
    }

    pub fn week_52_high(&self) -> Option<f64> {
        parse_number(self.week_52_high.as_deref())
    }

    pub fn week_52_low(&self) -> Option<f64> {
        parse_number(self.week_52_low.as_deref())
    }

    pub fn target_price(&self) -> Option<f64> {
        parse_number(self.analyst_target_price.as_deref())
    }

    /// Rating bucket with the most analyst votes, used when Yahoo has no
    /// recommendation
    ///
    /// Ties go to the more conservative bucket. `None` when nobody voted.
    pub fn recommendation(&self) -> Option<&'static str> {
        // Ordered from most conservative to most bullish so that ties keep the
        // earlier entry
        let buckets = [
            ("strong_sell", &self.analyst_rating_strong_sell),
            ("sell", &self.analyst_rating_sell),
            ("hold", &self.analyst_rating_hold),
            ("buy", &self.analyst_rating_buy),
            ("strong_buy", &self.analyst_rating_strong_buy),
        ];

        let mut best: Option<(&'static str, f64)> = None;
        for (key, raw) in buckets {
            let votes = parse_number(raw.as_deref()).unwrap_or(0.0);
            if votes > best.map_or(0.0, |(_, v)| v) {
                best = Some((key, votes));
            }
        }
        best.map(|(key, _)| key)
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Get the company overview (fundamentals and analyst ratings)
    #[instrument(skip(self))]
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let params = [
            ("function", "OVERVIEW"),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(if status.is_server_error() {
                StockError::NetworkFailure(format!("Alpha Vantage HTTP {status}"))
            } else {
                StockError::unavailable(symbol, format!("Alpha Vantage HTTP {status}"))
            });
        }

        let data: serde_json::Value = response.json().await?;
        debug!("Received Alpha Vantage overview for {}", symbol);
        parse_overview(symbol, data)
    }
}

#[async_trait]
impl FundamentalsSource for AlphaVantageClient {
    async fn overview(&self, symbol: &str) -> Result<CompanyOverview> {
        self.get_company_overview(symbol).await
    }
}

fn parse_overview(symbol: &str, data: serde_json::Value) -> Result<CompanyOverview> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::unavailable(symbol, error.to_string()));
    }

    // Quota notices come back as 200 responses
    if let Some(note) = data.get("Note").or_else(|| data.get("Information")) {
        return Err(StockError::unavailable(
            symbol,
            format!("Alpha Vantage: {note}"),
        ));
    }

    // An empty object means the symbol is unknown
    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(StockError::unavailable(symbol, "no company overview"));
    }

    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "MarketCapitalization": "2950000000000",
            "PERatio": "29.5",
            "TrailingPE": "29.8",
            "EPS": "6.43",
            "52WeekHigh": "199.62",
            "52WeekLow": "164.08",
            "AnalystTargetPrice": "205.5",
            "AnalystRatingStrongBuy": "11",
            "AnalystRatingBuy": "21",
            "AnalystRatingHold": "12",
            "AnalystRatingSell": "2",
            "AnalystRatingStrongSell": "None"
        })
    }

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_parse_overview() {
        let overview = parse_overview("AAPL", sample()).unwrap();
        assert_eq!(overview.company_name(), Some("Apple Inc"));
        assert_eq!(overview.market_cap(), Some(2.95e12));
        assert_eq!(overview.pe_ratio(), Some(29.8));
        assert_eq!(overview.eps(), Some(6.43));
        assert_eq!(overview.week_52_high(), Some(199.62));
        assert_eq!(overview.target_price(), Some(205.5));
        assert_eq!(overview.recommendation(), Some("buy"));
    }

    #[test]
    fn test_missing_values() {
        let overview = parse_overview(
            "XYZ",
            json!({"Symbol": "XYZ", "PERatio": "None", "EPS": "-", "TrailingPE": ""}),
        )
        .unwrap();
        assert_eq!(overview.pe_ratio(), None);
        assert_eq!(overview.eps(), None);
        assert_eq!(overview.company_name(), None);
        assert_eq!(overview.recommendation(), None);
    }

    #[test]
    fn test_recommendation_tie_is_conservative() {
        let overview = CompanyOverview {
            analyst_rating_buy: Some("5".to_string()),
            analyst_rating_hold: Some("5".to_string()),
            ..Default::default()
        };
        assert_eq!(overview.recommendation(), Some("hold"));
    }

    #[test]
    fn test_unknown_symbol_and_notes() {
        assert!(matches!(
            parse_overview("ZZZZINVALID", json!({})),
            Err(StockError::DataUnavailable { .. })
        ));
        assert!(matches!(
            parse_overview("AAPL", json!({"Note": "Thank you for using Alpha Vantage!"})),
            Err(StockError::DataUnavailable { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_get_company_overview() {
        let key = std::env::var("ALPHA_VANTAGE_API_KEY").unwrap();
        let client = AlphaVantageClient::new(key, Duration::from_secs(30)).unwrap();
        let overview = client.get_company_overview("AAPL").await.unwrap();
        assert_eq!(overview.symbol, "AAPL");
    }
}
