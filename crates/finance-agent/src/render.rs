//! Terminal tables for ticker metrics and comparisons

use crate::model::{Comparison, ComparisonTable, Metric, PriceSeries, TickerMetrics, format_price};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Two-column metric/value table for one ticker
pub fn metrics_table(metrics: &TickerMetrics) -> Table {
    let mut table = table();
    table.set_header(vec![Cell::new(metrics.display_name()), Cell::new("Value")]);
    table.add_row(vec!["Current Price".to_string(), metrics.formatted_price()]);
    for metric in Metric::ALL {
        table.add_row(vec![metric.label().to_string(), metrics.formatted(metric)]);
    }
    table
}

/// One-line description of a price history
pub fn history_summary(history: &PriceSeries) -> String {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => format!(
            "{} daily closes from {} ({}) to {} ({})",
            history.len(),
            first.date,
            format_price(first.close),
            last.date,
            format_price(last.close)
        ),
        _ => "No price history".to_string(),
    }
}

/// Company, price and every metric, one row per requested ticker
pub fn comparison_table(comparison: &ComparisonTable) -> Table {
    let mut header = vec!["Company".to_string(), "Price".to_string()];
    header.extend(comparison.columns().iter().map(|m| m.label().to_string()));

    let mut table = table();
    table.set_header(header);
    for row in comparison.rows() {
        let mut cells = vec![row.display_name(), row.formatted_price()];
        cells.extend(comparison.columns().iter().map(|&m| row.formatted(m)));
        table.add_row(cells);
    }
    table
}

/// Normalized performance over the common dates
///
/// `None` when no series could be aligned.
pub fn performance_table(comparison: &Comparison) -> Option<Table> {
    let (start, end) = (comparison.common_dates.first()?, comparison.common_dates.last()?);

    let mut table = table();
    table.set_header(vec![
        "Ticker".to_string(),
        format!("{start}"),
        format!("{end}"),
        "Change".to_string(),
        "Low".to_string(),
        "High".to_string(),
    ]);

    for (symbol, series) in &comparison.normalized {
        let values = series.values();
        let (Some(first), Some(last)) = (values.first(), values.last()) else {
            continue;
        };
        let low = values.iter().copied().fold(f64::INFINITY, f64::min);
        let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        table.add_row(vec![
            symbol.clone(),
            format!("{first:.2}"),
            format!("{last:.2}"),
            format!("{:+.2}%", last - 100.0),
            format!("{low:.2}"),
            format!("{high:.2}"),
        ]);
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::align;
    use crate::model::{ComparisonRow, PricePoint};
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + chrono::Days::new(i as u64), c)),
        )
    }

    #[test]
    fn test_metrics_table() {
        let metrics = TickerMetrics::new("AAPL", 189.5)
            .with_company_name("Apple Inc")
            .with_metric(Metric::PeRatio, 29.8);
        let rendered = metrics_table(&metrics).to_string();

        assert!(rendered.contains("Apple Inc (AAPL)"));
        assert!(rendered.contains("$189.50"));
        assert!(rendered.contains("29.80"));
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_comparison_table_keeps_unavailable() {
        let table = ComparisonTable::new(vec![
            ComparisonRow::available(TickerMetrics::new("MSFT", 410.0)),
            ComparisonRow::unavailable("ZZZZINVALID", "no data"),
        ]);
        let rendered = comparison_table(&table).to_string();

        assert!(rendered.contains("MSFT"));
        assert!(rendered.contains("ZZZZINVALID"));
        assert!(rendered.contains("unavailable"));
    }

    #[test]
    fn test_performance_table() {
        let histories = vec![
            ("AAPL".to_string(), series(&[150.0, 155.0, 160.0])),
            ("MSFT".to_string(), series(&[300.0, 290.0, 310.0])),
        ];
        let (common_dates, normalized) = align(&histories);
        let comparison = Comparison {
            table: ComparisonTable::default(),
            normalized,
            common_dates,
        };

        let rendered = performance_table(&comparison).unwrap().to_string();
        assert!(rendered.contains("2024-02-01"));
        assert!(rendered.contains("106.67"));
        assert!(rendered.contains("+6.67%"));
        assert!(rendered.contains("96.67"));

        assert!(performance_table(&Comparison::default()).is_none());
    }

    #[test]
    fn test_history_summary() {
        assert_eq!(
            history_summary(&series(&[10.0, 12.5])),
            "2 daily closes from 2024-02-01 ($10.00) to 2024-02-02 ($12.50)"
        );
        assert_eq!(history_summary(&PriceSeries::default()), "No price history");
    }
}
