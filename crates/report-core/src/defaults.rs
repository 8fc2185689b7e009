//! Documented defaults for absent market data.
//!
//! Two layers, matching the error-handling design: per-field defaults cover a
//! single missing field on an otherwise live snapshot, and
//! [`fallback_bundle`] replaces the whole fetch when the primary request
//! fails (one-shot, no retries).

use crate::types::{MarketSnapshot, TickerBundle};

/// Last traded price when the quote is unavailable.
pub const CURRENT_PRICE: f64 = 1030.05;
/// Market capitalization in dollars.
pub const MARKET_CAP: f64 = 980e9;
/// Base-year total revenue in billions, from company guidance.
pub const BASE_REVENUE_BILLIONS: f64 = 45.0;
/// Trailing twelve-month EPS.
pub const TRAILING_EPS: f64 = 20.45;
/// Consensus forward EPS.
pub const FORWARD_EPS: f64 = 22.66;
/// Reported beta.
pub const BETA: f64 = 0.8;
/// Year-over-year revenue growth.
pub const REVENUE_GROWTH: f64 = 0.32;
/// Quarterly earnings growth.
pub const EARNINGS_GROWTH: f64 = 1.0;
/// Trailing P/E multiple.
pub const TRAILING_PE: f64 = 52.0;
/// Return on equity.
pub const RETURN_ON_EQUITY: f64 = 0.85;
/// Net profit margin.
pub const PROFIT_MARGIN: f64 = 0.22;

/// Complete stand-in bundle used when the primary fetch fails outright.
/// Carries the last reviewed quote and EPS figures; history, statements and
/// analyst targets stay empty so downstream stages take their own defaults.
pub fn fallback_bundle(symbol: &str) -> TickerBundle {
    TickerBundle {
        symbol: symbol.to_string(),
        snapshot: MarketSnapshot {
            current_price: Some(CURRENT_PRICE),
            market_cap: Some(MARKET_CAP),
            // TTM EPS as of the last full-fallback review, not the per-field
            // default above.
            trailing_eps: Some(19.80),
            forward_eps: Some(FORWARD_EPS),
            ..MarketSnapshot::default()
        },
        history: Vec::new(),
        statements: None,
        targets: None,
    }
}
