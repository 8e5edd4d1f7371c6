//! Multi-ticker comparison assembly
//!
//! Fetches every requested ticker independently, aligns the available price
//! histories on the dates they all share, rebases each aligned series to 100
//! and collects one metrics row per requested ticker.
//!
//! A ticker that cannot be fetched still gets a row, marked unavailable with
//! the reason; it never aborts the rest of the batch.

use crate::error::{Result, StockError};
use crate::fetcher::{MarketDataProvider, normalize_symbols};
use crate::model::{
    Comparison, ComparisonRow, ComparisonTable, NormalizedSeries, PriceSeries, TickerData,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builds [`Comparison`]s from a market-data provider
#[derive(Clone)]
pub struct ComparisonAssembler {
    provider: Arc<dyn MarketDataProvider>,
}

impl ComparisonAssembler {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Assemble a comparison for `symbols`
    ///
    /// Symbols are trimmed, upper-cased and de-duplicated; the table holds
    /// exactly one row per resulting symbol, in first-seen order. Fails only
    /// when no symbol is left after normalization.
    #[instrument(skip_all, fields(count))]
    pub async fn assemble<I, S>(&self, symbols: I) -> Result<Comparison>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = normalize_symbols(symbols);
        if symbols.is_empty() {
            return Err(StockError::InvalidInput(
                "at least one ticker symbol is required".to_string(),
            ));
        }
        tracing::Span::current().record("count", symbols.len());

        let fetches = symbols.iter().map(|symbol| {
            let provider = Arc::clone(&self.provider);
            async move { provider.fetch(symbol).await }
        });
        let results = futures::future::join_all(fetches).await;

        let mut rows = Vec::with_capacity(symbols.len());
        let mut histories = Vec::new();

        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(TickerData { mut metrics, history }) => {
                    // Rows are keyed by the requested symbol
                    metrics.symbol.clone_from(symbol);
                    rows.push(ComparisonRow::available(metrics));
                    histories.push((symbol.clone(), history));
                }
                Err(e) => {
                    warn!("Excluding {} from comparison: {}", symbol, e);
                    rows.push(ComparisonRow::unavailable(symbol.clone(), unavailable_reason(&e)));
                }
            }
        }

        let (common_dates, normalized) = align(&histories);
        if !histories.is_empty() && common_dates.is_empty() {
            warn!("Price histories share no common dates, performance chart will be empty");
        }

        info!(
            "Assembled comparison: {} available, {} unavailable, {} common dates",
            histories.len(),
            rows.len() - histories.len(),
            common_dates.len()
        );

        Ok(Comparison {
            table: ComparisonTable::new(rows),
            normalized,
            common_dates,
        })
    }
}

fn unavailable_reason(error: &StockError) -> String {
    match error {
        StockError::DataUnavailable { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

/// Dates present in every series, ascending
pub fn common_dates<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> BTreeSet<NaiveDate> {
    let mut iter = series.into_iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };

    let mut common: BTreeSet<NaiveDate> = first.dates().collect();
    for series in iter {
        let dates: BTreeSet<NaiveDate> = series.dates().collect();
        common.retain(|d| dates.contains(d));
    }
    common
}

/// Restrict each history to the common dates and rebase it to 100
pub fn align(
    histories: &[(String, PriceSeries)],
) -> (Vec<NaiveDate>, BTreeMap<String, NormalizedSeries>) {
    let common = common_dates(histories.iter().map(|(_, h)| h));

    let normalized = histories
        .iter()
        .filter_map(|(symbol, history)| {
            history
                .restricted_to(&common)
                .normalized()
                .map(|series| (symbol.clone(), series))
        })
        .collect();

    (common.into_iter().collect(), normalized)
}
