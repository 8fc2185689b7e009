use async_trait::async_trait;
use equity_report::{generate_report, AppConfig};
use report_core::{MarketDataSource, MarketSnapshot, ReportError, TickerBundle};
use std::path::PathBuf;

/// Offline source: serves one canned bundle for the primary ticker and fails
/// every peer fetch.
struct StubSource {
    bundle: TickerBundle,
}

#[async_trait]
impl MarketDataSource for StubSource {
    async fn fetch(&self, symbol: &str) -> Result<TickerBundle, ReportError> {
        if symbol == self.bundle.symbol {
            Ok(self.bundle.clone())
        } else {
            Err(ReportError::Api(format!("stub has no data for {symbol}")))
        }
    }
}

fn temp_config(name: &str) -> AppConfig {
    let dir = std::env::temp_dir();
    AppConfig {
        ticker: "LLY".to_string(),
        output_path: dir.join(format!("{}_{}.pdf", name, std::process::id())),
        chart_path: dir.join(format!("{}_{}.png", name, std::process::id())),
    }
}

fn populated_bundle() -> TickerBundle {
    TickerBundle {
        symbol: "LLY".to_string(),
        snapshot: MarketSnapshot {
            company_name: Some("Eli Lilly and Company".to_string()),
            current_price: Some(1030.05),
            market_cap: Some(980e9),
            beta: Some(0.8),
            forward_eps: Some(22.66),
            trailing_eps: Some(20.45),
            ..MarketSnapshot::default()
        },
        history: Vec::new(),
        statements: None,
        targets: None,
    }
}

#[tokio::test]
async fn pipeline_completes_without_statements_and_emits_a_document() {
    let source = StubSource {
        bundle: populated_bundle(),
    };
    let config = temp_config("pipeline");

    let summary = generate_report(&source, &config).await.unwrap();

    // No financial statements: base revenue falls back to the guidance
    // constant.
    assert_eq!(summary.model.revenue.base_revenue_source, "model default");
    assert!(
        (summary.model.revenue.year(0).total_revenue - 45.0).abs() < 1e-9
    );

    let target = summary.model.valuation.final_target_price;
    assert!(target.is_finite() && target > 0.0);
    assert!(summary.model.valuation.upside_percent.is_finite());

    // Non-empty multi-page artifact.
    assert!(summary.document.pages > 3, "pages: {}", summary.document.pages);
    let bytes = std::fs::metadata(&summary.document.path).unwrap().len();
    assert!(bytes > 0);

    let _ = std::fs::remove_file(&summary.document.path);
}

#[tokio::test]
async fn failed_peer_fetches_do_not_abort_the_run() {
    // StubSource rejects every peer symbol; the run must still succeed.
    let source = StubSource {
        bundle: populated_bundle(),
    };
    let config = temp_config("peer_isolation");

    let summary = generate_report(&source, &config).await.unwrap();
    assert!(summary.model.valuation.final_target_price.is_finite());

    let _ = std::fs::remove_file(&summary.document.path);
}

#[tokio::test]
async fn failed_primary_fetch_falls_back_to_hardcoded_run() {
    struct AlwaysFailing;

    #[async_trait]
    impl MarketDataSource for AlwaysFailing {
        async fn fetch(&self, _symbol: &str) -> Result<TickerBundle, ReportError> {
            Err(ReportError::Api("offline".to_string()))
        }
    }

    let config = temp_config("full_fallback");
    let summary = generate_report(&AlwaysFailing, &config).await.unwrap();

    assert!((summary.model.valuation.current_price - 1030.05).abs() < 1e-9);
    assert!(summary.model.valuation.final_target_price.is_finite());

    let _ = std::fs::remove_file(&summary.document.path);
}

#[tokio::test]
async fn history_produces_chart_and_performance_lines() {
    let mut bundle = populated_bundle();
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    bundle.history = (0..300)
        .map(|i| report_core::PricePoint {
            date: start + chrono::Days::new(i as u64),
            close: 700.0 + i as f64,
        })
        .collect();
    bundle.snapshot.current_price = None;

    let source = StubSource { bundle };
    let config = temp_config("with_chart");

    let summary = generate_report(&source, &config).await.unwrap();

    // Current price resolved from the last close.
    assert!((summary.model.valuation.current_price - 999.0).abs() < 1e-9);
    assert!(std::fs::metadata(&config.chart_path).unwrap().len() > 0);

    let _ = std::fs::remove_file(&summary.document.path);
    let _ = std::fs::remove_file(&config.chart_path);
}
