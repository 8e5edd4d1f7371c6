//! Analyst prompts for single-stock and comparison analysis
//!
//! Both prompts are rendered from MiniJinja templates over already-formatted
//! values, so the text the model sees matches the tables printed to the
//! terminal cell for cell. Rendering is deterministic and never truncates.

use crate::error::Result;
use crate::model::{ComparisonTable, Metric, PriceSeries, TickerMetrics, format_price};
use minijinja::{Environment, context};
use serde::Serialize;
use std::collections::BTreeMap;

/// Closes listed in the PRICE HISTORY section
pub const RECENT_CLOSES: usize = 10;

const SINGLE_TEMPLATE: &str = r#"As a financial analyst, provide a comprehensive analysis of {{ name }} with the following data:

MARKET OVERVIEW:
- Current Price: {{ price }}
- 52-Week Range: {{ metrics.fifty_two_week_low }} - {{ metrics.fifty_two_week_high }}
- Market Cap: {{ metrics.market_cap }}

FINANCIAL METRICS:
- P/E Ratio: {{ metrics.pe_ratio }}
- EPS: {{ metrics.eps }}
- 1-Year Price Change: {{ metrics.price_change_1y }}

ANALYST INSIGHTS:
- Recommendation: {{ metrics.recommendation }}
- Target Price: {{ metrics.target_price }}

PRICE HISTORY:
{% if history %}
- Observations: {{ history.observations }}
- Date Range: {{ history.start }} to {{ history.end }}
- First Close: {{ history.first_close }}
- Last Close: {{ history.last_close }}
- Most Recent Closes:
{% for point in history.recent %}
  - {{ point.date }}: {{ point.close }}
{% endfor %}
{% else %}
- No price history available.
{% endif %}

Follow this structure:
1. Executive Summary (2-3 sentences)
2. Financial Performance Analysis
3. Market Position
4. Future Outlook & Risks
5. Investment Perspective

Keep the analysis professional but easy to understand for regular investors.
Use bullet points for key insights.
"#;

const COMPARISON_TEMPLATE: &str = r#"As a financial analyst, compare these companies: {{ companies | join(", ") }}

Here are their key metrics:

| {{ header | join(" | ") }} |
{{ separator }}
{% for row in rows %}
| {{ row | join(" | ") }} |
{% endfor %}
{% if unavailable %}

No data could be retrieved for the following tickers. Their cells are marked "unavailable"; do not guess their figures:
{% for item in unavailable %}
- {{ item.symbol }}: {{ item.reason }}
{% endfor %}
{% endif %}

Provide a comparative analysis with:
1. Industry Overview (brief)
2. Company-by-Company Performance
3. Investment Outlook

Keep the analysis simple, clear and accessible for regular investors.
Highlight key strengths and weaknesses for each company.
"#;

#[derive(Serialize)]
struct HistoryContext {
    observations: usize,
    start: String,
    end: String,
    first_close: String,
    last_close: String,
    recent: Vec<CloseContext>,
}

#[derive(Serialize)]
struct CloseContext {
    date: String,
    close: String,
}

#[derive(Serialize)]
struct UnavailableContext<'a> {
    symbol: &'a str,
    reason: &'a str,
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
}

fn history_context(history: &PriceSeries) -> Option<HistoryContext> {
    let (first, last) = (history.first()?, history.last()?);
    Some(HistoryContext {
        observations: history.len(),
        start: first.date.to_string(),
        end: last.date.to_string(),
        first_close: format_price(first.close),
        last_close: format_price(last.close),
        recent: history
            .recent(RECENT_CLOSES)
            .iter()
            .map(|p| CloseContext {
                date: p.date.to_string(),
                close: format_price(p.close),
            })
            .collect(),
    })
}

/// Single-stock analysis prompt
///
/// Missing metrics render as `N/A`.
pub fn build_single_prompt(metrics: &TickerMetrics, history: &PriceSeries) -> Result<String> {
    // Serialized keys are the metrics' snake_case names
    let formatted: BTreeMap<Metric, String> = Metric::ALL
        .iter()
        .map(|&m| (m, metrics.formatted(m)))
        .collect();

    let ctx = context! {
        name => metrics.display_name(),
        price => metrics.formatted_price(),
        metrics => formatted,
        history => history_context(history),
    };

    Ok(environment().render_str(SINGLE_TEMPLATE, ctx)?)
}

/// Multi-ticker comparison prompt
///
/// One table row per ticker in `table`, one column per metric. Unavailable
/// tickers stay in the table with every cell marked `unavailable` and are
/// listed with the reason underneath.
pub fn build_comparison_prompt(table: &ComparisonTable) -> Result<String> {
    let mut header = vec!["Company", "Price"];
    header.extend(table.columns().iter().map(|m| m.label()));

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![row.display_name(), row.formatted_price()];
            cells.extend(table.columns().iter().map(|&m| row.formatted(m)));
            cells
        })
        .collect();

    let companies: Vec<String> = table.rows().iter().map(|r| r.display_name()).collect();
    let unavailable: Vec<UnavailableContext<'_>> = table
        .unavailable()
        .map(|(symbol, reason)| UnavailableContext { symbol, reason })
        .collect();

    let separator = format!("|{}", " --- |".repeat(header.len()));

    let ctx = context! {
        companies => companies,
        header => header,
        separator => separator,
        rows => rows,
        unavailable => unavailable,
    };

    Ok(environment().render_str(COMPARISON_TEMPLATE, ctx)?)
}
