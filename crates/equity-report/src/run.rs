//! Batch orchestration: fetch, model, render.

use anyhow::{Context, Result};
use report_core::{defaults, MarketDataSource, PeerSnapshot, ValuationReport};
use report_renderer::{render_pdf, render_price_chart, RenderedDocument};
use std::path::PathBuf;
use valuation_engine::ValuationEngine;

use crate::config::AppConfig;
use crate::narrative;

pub struct RunSummary {
    pub document: RenderedDocument,
    pub model: ValuationReport,
}

/// One full report run.
///
/// A failed primary fetch switches the whole run to the hardcoded fallback
/// bundle (no retries). Peer fetches are failure-isolated: a failed peer is
/// logged and omitted from the comparison table. Render failures are fatal.
pub async fn generate_report(
    source: &dyn MarketDataSource,
    config: &AppConfig,
) -> Result<RunSummary> {
    tracing::info!(ticker = %config.ticker, "fetching market data");
    let bundle = match source.fetch(&config.ticker).await {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!(error = %e, "primary fetch failed; using fallback data for the run");
            defaults::fallback_bundle(&config.ticker)
        }
    };

    let mut peers = Vec::new();
    for symbol in narrative::PEER_TICKERS {
        match source.fetch(symbol).await {
            Ok(peer) => peers.push(PeerSnapshot {
                symbol: peer.symbol,
                snapshot: peer.snapshot,
                history: peer.history,
            }),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "peer fetch failed; omitting from comparison")
            }
        }
    }

    let engine = ValuationEngine::new();
    let model = engine.run(&bundle);
    if let Some(reason) = &model.valuation.dcf_degenerate {
        tracing::warn!(reason = %reason, "DCF leg is degenerate; blending without it");
    }
    tracing::info!(
        final_target = model.valuation.final_target_price,
        upside_percent = model.valuation.upside_percent,
        base_revenue_source = model.revenue.base_revenue_source,
        "valuation model complete"
    );

    let chart_path: Option<PathBuf> = if bundle.history.is_empty() {
        tracing::warn!("no price history; skipping chart");
        None
    } else {
        render_price_chart(&bundle.history, &config.chart_path)
            .context("price chart rendering failed")?;
        Some(config.chart_path.clone())
    };

    let report_date = chrono::Utc::now().date_naive();
    let sections = narrative::build_report(
        &bundle,
        &peers,
        &model,
        engine.assumptions(),
        chart_path.as_deref(),
        report_date,
    );

    let title = format!("{} Equity Research Report", config.ticker);
    let document = render_pdf(&title, &sections, &config.output_path)
        .context("document assembly failed")?;

    tracing::info!(
        pages = document.pages,
        path = %document.path.display(),
        "report rendered"
    );

    Ok(RunSummary { document, model })
}
