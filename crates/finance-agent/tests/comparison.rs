//! End-to-end comparison pipeline against in-memory providers

use async_trait::async_trait;
use chrono::NaiveDate;
use finance_agent::{
    AnalysisClient, AnalysisConfig, ComparisonAssembler, MarketDataProvider, Metric, PricePoint,
    PriceSeries, StockError, TickerData, TickerMetrics, build_comparison_prompt,
};
use finance_llm::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves fixed ticker data; unknown symbols are unavailable
struct StaticMarket {
    tickers: HashMap<&'static str, TickerData>,
}

impl StaticMarket {
    fn new() -> Self {
        let mut tickers = HashMap::new();
        tickers.insert(
            "AAPL",
            ticker("AAPL", "Apple Inc", &[(1, 150.0), (2, 155.0), (3, 160.0)]),
        );
        tickers.insert(
            "MSFT",
            ticker("MSFT", "Microsoft Corporation", &[(1, 300.0), (2, 290.0), (3, 310.0)]),
        );
        tickers.insert(
            "GOOGL",
            ticker("GOOGL", "Alphabet Inc", &[(2, 140.0), (3, 147.0), (4, 150.0)]),
        );
        Self { tickers }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarket {
    async fn fetch(&self, symbol: &str) -> finance_agent::Result<TickerData> {
        self.tickers
            .get(symbol)
            .cloned()
            .ok_or_else(|| StockError::unavailable(symbol, "No data found, symbol may be delisted"))
    }
}

/// Records every prompt and answers with a canned analysis
#[derive(Default)]
struct RecordingModel {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LLMProvider for RecordingModel {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> finance_llm::Result<CompletionResponse> {
        let prompt = request.messages[0].text().to_string();
        self.prompts.lock().unwrap().push(prompt);
        Ok(CompletionResponse {
            message: Message::assistant("Industry Overview: steady growth."),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn ticker(symbol: &str, name: &str, closes: &[(u32, f64)]) -> TickerData {
    let history = PriceSeries::new(closes.iter().map(|&(d, c)| PricePoint::new(day(d), c)));
    let price = history.last().map_or(0.0, |p| p.close);
    TickerData {
        metrics: TickerMetrics::new(symbol, price)
            .with_company_name(name)
            .with_metric(Metric::Recommendation, "buy")
            .with_fallback(Metric::FiftyTwoWeekHigh, history.high())
            .with_fallback(Metric::FiftyTwoWeekLow, history.low())
            .with_fallback(Metric::PriceChange1y, history.change_percent()),
        history,
    }
}

fn round2(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| (v * 100.0).round() / 100.0).collect()
}

#[tokio::test]
async fn test_full_comparison_pipeline() {
    let assembler = ComparisonAssembler::new(Arc::new(StaticMarket::new()));
    let comparison = assembler
        .assemble(["aapl", "MSFT", "ZZZZINVALID"])
        .await
        .unwrap();

    assert_eq!(
        comparison.table.symbols().collect::<Vec<_>>(),
        vec!["AAPL", "MSFT", "ZZZZINVALID"]
    );
    assert_eq!(
        round2(comparison.normalized["AAPL"].values()),
        vec![100.0, 103.33, 106.67]
    );
    assert_eq!(
        round2(comparison.normalized["MSFT"].values()),
        vec![100.0, 96.67, 103.33]
    );
    assert!(!comparison.normalized.contains_key("ZZZZINVALID"));

    let model = Arc::new(RecordingModel::default());
    let client = AnalysisClient::new(model.clone(), AnalysisConfig::default());
    let analysis = client.compare(&comparison.table).await.unwrap();
    assert_eq!(analysis, "Industry Overview: steady growth.");

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], build_comparison_prompt(&comparison.table).unwrap());
    assert!(prompts[0].contains("Apple Inc (AAPL), Microsoft Corporation (MSFT), ZZZZINVALID"));
    assert!(prompts[0].contains("- ZZZZINVALID: No data found, symbol may be delisted"));
}

#[tokio::test]
async fn test_partial_overlap_uses_shared_dates() {
    let assembler = ComparisonAssembler::new(Arc::new(StaticMarket::new()));
    let comparison = assembler.assemble(["AAPL", "GOOGL"]).await.unwrap();

    assert_eq!(comparison.common_dates, vec![day(2), day(3)]);
    assert_eq!(
        round2(comparison.normalized["AAPL"].values()),
        vec![100.0, 103.23]
    );
    assert_eq!(comparison.normalized["GOOGL"].values(), vec![100.0, 105.0]);

    // Metrics keep the full history
    let googl = comparison.table.get("GOOGL").unwrap();
    assert_eq!(googl.formatted(Metric::FiftyTwoWeekHigh), "$150.00");
}

#[tokio::test]
async fn test_json_output_round_trips() {
    let assembler = ComparisonAssembler::new(Arc::new(StaticMarket::new()));
    let comparison = assembler.assemble(["MSFT", "NOPE"]).await.unwrap();

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["normalized"]["MSFT"][0]["value"], 100.0);
    assert_eq!(json["table"]["rows"][1]["status"]["status"], "unavailable");
}
