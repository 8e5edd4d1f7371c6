//! Market data types shared by the fetcher, the comparison assembler and the
//! prompt builder

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The fixed set of metrics collected for every ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MarketCap,
    PeRatio,
    Eps,
    FiftyTwoWeekHigh,
    FiftyTwoWeekLow,
    Recommendation,
    TargetPrice,
    #[serde(rename = "price_change_1y")]
    PriceChange1y,
}

impl Metric {
    /// Every metric, in display order
    pub const ALL: [Metric; 8] = [
        Metric::MarketCap,
        Metric::PeRatio,
        Metric::Eps,
        Metric::FiftyTwoWeekHigh,
        Metric::FiftyTwoWeekLow,
        Metric::Recommendation,
        Metric::TargetPrice,
        Metric::PriceChange1y,
    ];

    /// Human-readable column label
    pub fn label(self) -> &'static str {
        match self {
            Metric::MarketCap => "Market Cap",
            Metric::PeRatio => "P/E Ratio",
            Metric::Eps => "EPS",
            Metric::FiftyTwoWeekHigh => "52W High",
            Metric::FiftyTwoWeekLow => "52W Low",
            Metric::Recommendation => "Recommendation",
            Metric::TargetPrice => "Target Price",
            Metric::PriceChange1y => "1Y Change",
        }
    }

    /// Format a value the way this metric is displayed everywhere
    pub fn format(self, value: &MetricValue) -> String {
        let MetricValue::Number(n) = value else {
            return value.to_string();
        };
        match self {
            Metric::MarketCap => format_market_cap(*n),
            Metric::Eps
            | Metric::FiftyTwoWeekHigh
            | Metric::FiftyTwoWeekLow
            | Metric::TargetPrice => format_price(*n),
            Metric::PriceChange1y => format!("{n:.2}%"),
            Metric::PeRatio => format!("{n:.2}"),
            Metric::Recommendation => n.to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A metric value as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

/// Marker printed wherever a metric is missing
pub const MISSING: &str = "N/A";

/// Marker printed for every cell of a ticker that could not be fetched
pub const UNAVAILABLE: &str = "unavailable";

/// Format a dollar amount with two decimals
pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

/// Format a market capitalization with a T/B/M suffix
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${value:.0}")
    }
}

/// Snapshot of one ticker's current price and key metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub symbol: String,
    pub company_name: Option<String>,
    pub current_price: f64,
    pub metrics: BTreeMap<Metric, MetricValue>,
}

impl TickerMetrics {
    pub fn new(symbol: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: None,
            current_price,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_metric(mut self, metric: Metric, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(metric, value.into());
        self
    }

    /// Insert a metric only when no value is present yet
    pub fn with_fallback(mut self, metric: Metric, value: Option<f64>) -> Self {
        if let Some(value) = value {
            self.metrics.entry(metric).or_insert(MetricValue::Number(value));
        }
        self
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.metrics.get(&metric)
    }

    /// Formatted value, or [`MISSING`]
    pub fn formatted(&self, metric: Metric) -> String {
        self.get(metric)
            .map_or_else(|| MISSING.to_string(), |value| metric.format(value))
    }

    pub fn formatted_price(&self) -> String {
        format_price(self.current_price)
    }

    /// "Apple Inc (AAPL)", or just the symbol when the name is unknown
    pub fn display_name(&self) -> String {
        match &self.company_name {
            Some(name) => format!("{name} ({})", self.symbol),
            None => self.symbol.clone(),
        }
    }
}

/// One closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes in ascending date order, one point per date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date
    ///
    /// Non-finite and non-positive closes are dropped. When a date repeats the
    /// later point wins.
    pub fn new(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> = points
            .into_iter()
            .filter(|p| p.close.is_finite() && p.close > 0.0)
            .map(|p| (p.date, p.close))
            .collect();

        Self {
            points: by_date
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// The last `n` points
    pub fn recent(&self, n: usize) -> &[PricePoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// Percentage change from the first to the last close
    ///
    /// `None` unless the series has at least two points.
    pub fn change_percent(&self) -> Option<f64> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => {
                Some((last.close / first.close - 1.0) * 100.0)
            }
            _ => None,
        }
    }

    pub fn high(&self) -> Option<f64> {
        self.points.iter().map(|p| p.close).reduce(f64::max)
    }

    pub fn low(&self) -> Option<f64> {
        self.points.iter().map(|p| p.close).reduce(f64::min)
    }

    /// Keep only the points whose date is in `dates`
    pub fn restricted_to(&self, dates: &BTreeSet<NaiveDate>) -> PriceSeries {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| dates.contains(&p.date))
                .copied()
                .collect(),
        }
    }

    /// Rescale so the first observation is 100
    ///
    /// `None` for an empty series.
    pub fn normalized(&self) -> Option<NormalizedSeries> {
        let base = self.points.first()?.close;
        Some(NormalizedSeries {
            points: self
                .points
                .iter()
                .map(|p| NormalizedPoint {
                    date: p.date,
                    value: 100.0 * p.close / base,
                })
                .collect(),
        })
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// One point of a normalized series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A price series rebased to 100 at its first observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSeries {
    points: Vec<NormalizedPoint>,
}

impl NormalizedSeries {
    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&NormalizedPoint> {
        self.points.last()
    }

    /// Percentage change relative to the baseline (`value - 100`)
    pub fn percent_change(&self) -> Vec<NormalizedPoint> {
        self.points
            .iter()
            .map(|p| NormalizedPoint {
                date: p.date,
                value: p.value - 100.0,
            })
            .collect()
    }
}

/// Everything fetched for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerData {
    pub metrics: TickerMetrics,
    pub history: PriceSeries,
}

/// Whether a requested ticker made it into the comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Available(TickerMetrics),
    Unavailable { reason: String },
}

/// One row of a [`ComparisonTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub symbol: String,
    pub status: RowStatus,
}

impl ComparisonRow {
    pub fn available(metrics: TickerMetrics) -> Self {
        Self {
            symbol: metrics.symbol.clone(),
            status: RowStatus::Available(metrics),
        }
    }

    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            status: RowStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn metrics(&self) -> Option<&TickerMetrics> {
        match &self.status {
            RowStatus::Available(metrics) => Some(metrics),
            RowStatus::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.metrics().is_some()
    }

    /// Company label for the first column
    pub fn display_name(&self) -> String {
        self.metrics()
            .map_or_else(|| self.symbol.clone(), TickerMetrics::display_name)
    }

    pub fn formatted_price(&self) -> String {
        self.metrics()
            .map_or_else(|| UNAVAILABLE.to_string(), TickerMetrics::formatted_price)
    }

    /// Formatted cell; [`UNAVAILABLE`] for failed rows, [`MISSING`] for gaps
    pub fn formatted(&self, metric: Metric) -> String {
        self.metrics()
            .map_or_else(|| UNAVAILABLE.to_string(), |m| m.formatted(metric))
    }
}

/// Metrics for every requested ticker, in request order
///
/// Every requested symbol has exactly one row, whether or not its data could
/// be fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn new(rows: Vec<ComparisonRow>) -> Self {
        Self { rows }
    }

    /// Shared column set
    pub fn columns(&self) -> &'static [Metric] {
        &Metric::ALL
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.symbol.as_str())
    }

    pub fn get(&self, symbol: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    pub fn available(&self) -> impl Iterator<Item = &TickerMetrics> {
        self.rows.iter().filter_map(ComparisonRow::metrics)
    }

    /// `(symbol, reason)` for every row that could not be fetched
    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows.iter().filter_map(|r| match &r.status {
            RowStatus::Unavailable { reason } => Some((r.symbol.as_str(), reason.as_str())),
            RowStatus::Available(_) => None,
        })
    }
}

/// Output of the comparison assembler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub table: ComparisonTable,
    /// Normalized series for every available ticker, on `common_dates`
    pub normalized: BTreeMap<String, NormalizedSeries>,
    /// Dates shared by every available ticker's history
    pub common_dates: Vec<NaiveDate>,
}
