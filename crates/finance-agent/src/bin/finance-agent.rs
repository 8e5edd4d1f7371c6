//! Finance Agent CLI
//!
//! Stock analysis and multi-ticker comparison from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables (or put them in .env)
//! export GROQ_API_KEY="gsk_..."
//! export ALPHA_VANTAGE_API_KEY="..."   # optional, enables fundamentals
//!
//! cargo run --bin finance-agent -- analyze AAPL
//! cargo run --bin finance-agent -- compare AAPL MSFT GOOGL
//! cargo run --bin finance-agent -- compare --preset semiconductors
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use finance_agent::fetcher::normalize_symbols;
use finance_agent::render::{comparison_table, history_summary, metrics_table, performance_table};
use finance_agent::{
    AnalysisClient, AnalysisConfig, Comparison, ComparisonAssembler, MarketDataFetcher,
    MarketDataProvider, Preset, StockConfig, TickerData,
};
use finance_llm::providers::{OpenAIConfig, OpenAIProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "finance-agent", version, about = "Your personal AI-powered stock analyst")]
struct Cli {
    /// Price history window (5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(long, global = true, default_value = "1y")]
    range: String,

    /// Print the assembled data (and analysis) as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Skip the AI summary
    #[arg(long, global = true)]
    no_ai: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single stock
    Analyze {
        /// Ticker symbol, e.g. AAPL
        symbol: String,
    },
    /// Compare two or more stocks
    Compare {
        /// Ticker symbols, added to the preset's when both are given
        symbols: Vec<String>,

        /// Start from a built-in industry group
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
    /// List the built-in industry groups
    Presets,
}

#[derive(Serialize)]
struct StockReport<'a> {
    #[serde(flatten)]
    data: &'a TickerData,
    analysis: Option<String>,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    analysis: Option<String>,
}

/// The AI client, or the reason it cannot be used
fn analysis_client(cli: &Cli) -> Result<AnalysisClient, String> {
    if cli.no_ai {
        return Err("disabled with --no-ai".to_string());
    }
    let provider = OpenAIConfig::groq_from_env()
        .and_then(OpenAIProvider::with_config)
        .map_err(|e| e.to_string())?;
    Ok(AnalysisClient::new(Arc::new(provider), AnalysisConfig::from_env()))
}

fn stock_config(cli: &Cli) -> anyhow::Result<StockConfig> {
    StockConfig::builder()
        .history_range(cli.range.as_str())
        .with_env_api_key()
        .build()
        .context("Invalid configuration")
}

fn unavailable(reason: impl std::fmt::Display) -> Option<String> {
    eprintln!("AI analysis unavailable: {reason}");
    None
}

fn finished(result: finance_agent::Result<String>) -> Option<String> {
    result
        .inspect_err(|e| warn!("Analysis failed: {}", e))
        .map_or_else(unavailable, Some)
}

async fn analyze(cli: &Cli, symbol: &str) -> anyhow::Result<()> {
    let Some(symbol) = normalize_symbols([symbol]).into_iter().next() else {
        bail!("A ticker symbol is required");
    };

    let fetcher = MarketDataFetcher::new(&stock_config(cli)?)?;
    let data = fetcher
        .fetch(&symbol)
        .await
        .with_context(|| format!("Could not retrieve data for {symbol}"))?;
    info!("Fetched {} ({} closes)", symbol, data.history.len());

    if !cli.json {
        println!("{}", metrics_table(&data.metrics));
        println!("{}\n", history_summary(&data.history));
    }

    let analysis = match analysis_client(cli) {
        Ok(client) => finished(client.analyze_stock(&data).await),
        Err(reason) => unavailable(reason),
    };

    if cli.json {
        let report = StockReport {
            data: &data,
            analysis,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(analysis) = analysis {
        println!("Analysis\n\n{analysis}");
    }
    Ok(())
}

async fn compare(cli: &Cli, symbols: &[String], preset: Option<Preset>) -> anyhow::Result<()> {
    let requested: Vec<&str> = preset
        .map(Preset::symbols)
        .unwrap_or_default()
        .iter()
        .copied()
        .chain(symbols.iter().map(String::as_str))
        .collect();

    let symbols = normalize_symbols(requested);
    if symbols.len() < 2 {
        bail!("Enter at least two ticker symbols to compare");
    }

    let fetcher = MarketDataFetcher::new(&stock_config(cli)?)?;
    let assembler = ComparisonAssembler::new(Arc::new(fetcher));
    let comparison = assembler.assemble(&symbols).await?;

    if !cli.json {
        if let Some(preset) = preset {
            println!("{}: {}\n", preset, symbols.join(", "));
        }
        println!("{}\n", comparison_table(&comparison.table));
        match performance_table(&comparison) {
            Some(table) => println!("Normalized performance (start = 100)\n{table}\n"),
            None => println!("No common trading dates, performance comparison unavailable\n"),
        }
        for (symbol, reason) in comparison.table.unavailable() {
            println!("Could not retrieve data for {symbol}: {reason}");
        }
    }

    let analysis = match analysis_client(cli) {
        Ok(client) => finished(client.compare(&comparison.table).await),
        Err(reason) => unavailable(reason),
    };

    if cli.json {
        let report = ComparisonReport {
            comparison: &comparison,
            analysis,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(analysis) = analysis {
        println!("\nComparative Analysis\n\n{analysis}");
    }
    Ok(())
}

fn list_presets() {
    for preset in Preset::ALL {
        println!("{:<16} {:<16} {}", preset.slug(), preset.name(), preset.symbols().join(", "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finance_utils::load_env();
    finance_utils::init_tracing();

    let cli = Cli::parse();

    match &cli.command {
        Command::Analyze { symbol } => analyze(&cli, symbol).await,
        Command::Compare { symbols, preset } => compare(&cli, symbols, *preset).await,
        Command::Presets => {
            list_presets();
            Ok(())
        }
    }
}
