use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Single close-price observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Point-in-time view of a ticker. Every field is optional; consumers resolve
/// absent fields through the documented defaults in [`crate::defaults`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub company_name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_revenue: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub operating_margin: Option<f64>,
    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub interest_expense: Option<f64>,
    pub number_of_analysts: Option<i32>,
}

/// One annual income-statement line. Statements arrive most recent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnualStatement {
    pub end_date: Option<NaiveDate>,
    pub total_revenue: Option<f64>,
    pub interest_expense: Option<f64>,
}

/// Sell-side analyst price-target consensus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalystTargets {
    pub mean: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

/// Everything one `fetch` returns for a symbol.
#[derive(Debug, Clone, Default)]
pub struct TickerBundle {
    pub symbol: String,
    pub snapshot: MarketSnapshot,
    pub history: Vec<PricePoint>,
    pub statements: Option<Vec<AnnualStatement>>,
    pub targets: Option<AnalystTargets>,
}

/// Peer row for the comparison table. Carries its own history so the table
/// can show live figures, but peers never feed the valuation math.
#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    pub symbol: String,
    pub snapshot: MarketSnapshot,
    pub history: Vec<PricePoint>,
}

/// One projected revenue year. Revenue figures are in billions of dollars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RevenueYear {
    pub year: i32,
    pub total_revenue: f64,
    /// Year-over-year growth in percent; `None` for the base year.
    pub growth_percent: Option<f64>,
    pub segment_revenue: f64,
    pub segment_share: f64,
}

/// Four-year revenue projection (base year + three forward years).
/// Invariants: `total_revenue` strictly increasing, `segment_share`
/// non-decreasing across the rows.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueForecast {
    pub years: Vec<RevenueYear>,
    /// Which fallback tier supplied the base-year revenue.
    pub base_revenue_source: &'static str,
}

impl RevenueForecast {
    pub fn base(&self) -> &RevenueYear {
        &self.years[0]
    }

    pub fn year(&self, offset: usize) -> &RevenueYear {
        &self.years[offset]
    }
}

/// One projected earnings year. Free cash flow is in dollars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EarningsYear {
    pub year: i32,
    pub eps: f64,
    pub operating_margin: f64,
    pub free_cash_flow: f64,
}

/// Four-year EPS/margin/FCF projection plus the five-entry cash-flow series
/// the DCF discounts (forward years 1..3, a synthetic terminal-adjacent year,
/// and that year grown once more). EPS is non-decreasing by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsForecast {
    pub years: Vec<EarningsYear>,
    pub dcf_cashflows: Vec<f64>,
    pub shares_outstanding: f64,
    /// True when the naive revenue-times-margin path dipped and fallback
    /// growth rates were applied (whole-path regeneration or per-year
    /// floors).
    pub repaired: bool,
}

impl EarningsForecast {
    pub fn year(&self, offset: usize) -> &EarningsYear {
        &self.years[offset]
    }
}

/// DCF output. Dollar amounts; `equity_price` is per share.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DcfValuation {
    pub enterprise_value: f64,
    pub pv_explicit: f64,
    pub pv_terminal: f64,
    pub equity_price: f64,
}

/// Final output of the valuation pipeline. Derived entirely from the
/// forecasts and the snapshot; recomputed fresh each run, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub wacc: f64,
    pub current_price: f64,
    pub dcf: Option<DcfValuation>,
    /// Reason the DCF leg was rejected, when it was.
    pub dcf_degenerate: Option<String>,
    pub pe_target_price: f64,
    pub base_price: f64,
    pub bull_price: f64,
    pub bear_price: f64,
    pub weighted_target: f64,
    pub final_target_price: f64,
    pub upside_percent: f64,
    pub consensus_mean: Option<f64>,
}

/// Full model output consumed by the report builder.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationReport {
    pub revenue: RevenueForecast,
    pub earnings: EarningsForecast,
    pub valuation: ValuationResult,
}
