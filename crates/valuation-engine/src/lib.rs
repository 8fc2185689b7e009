//! Deterministic single-name valuation pipeline: revenue projection, margin
//! and EPS modeling, WACC, DCF, multiple-based pricing, and probability-
//! weighted scenario blending. All assumptions are fixed named constants in
//! [`assumptions::ModelAssumptions`].

pub mod assumptions;
pub mod dcf;
pub mod earnings;
pub mod multiple;
pub mod revenue;
pub mod scenario;
pub mod wacc;

use report_core::fallback::{positive_finite, resolve};
use report_core::{
    defaults, DcfValuation, TickerBundle, ValuationReport, ValuationResult,
};

pub use assumptions::ModelAssumptions;

pub struct ValuationEngine {
    assumptions: ModelAssumptions,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self {
            assumptions: ModelAssumptions::default(),
        }
    }

    pub fn with_assumptions(assumptions: ModelAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &ModelAssumptions {
        &self.assumptions
    }

    /// Run the full model over one fetched bundle.
    ///
    /// Never fails: missing data degrades through documented defaults, and a
    /// degenerate DCF is recorded on the result (and excluded from blending)
    /// rather than raised.
    pub fn run(&self, bundle: &TickerBundle) -> ValuationReport {
        let a = &self.assumptions;
        let snapshot = &bundle.snapshot;

        let wacc = wacc::estimate_wacc(snapshot, a);
        let revenue = revenue::project_revenue(bundle.statements.as_deref(), snapshot, a);
        let earnings = earnings::project_earnings(bundle, &revenue, a);

        let current_price = resolve(
            &[
                ("snapshot.current_price", snapshot.current_price),
                (
                    "history.last_close",
                    bundle.history.last().map(|p| p.close),
                ),
            ],
            positive_finite,
            ("default", defaults::CURRENT_PRICE),
        )
        .value;

        let net_debt =
            snapshot.total_debt.unwrap_or(0.0) - snapshot.total_cash.unwrap_or(0.0);

        let (dcf, dcf_degenerate) = match dcf::value_enterprise(
            &earnings.dcf_cashflows,
            wacc,
            a,
        )
        .and_then(|ev| {
            dcf::equity_price(ev.enterprise_value, net_debt, earnings.shares_outstanding)
                .map(|price| DcfValuation {
                    enterprise_value: ev.enterprise_value,
                    pv_explicit: ev.pv_explicit,
                    pv_terminal: ev.pv_terminal,
                    equity_price: price,
                })
        }) {
            Ok(v) => (Some(v), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let consensus_mean = bundle
            .targets
            .as_ref()
            .and_then(|t| t.mean)
            .filter(|m| m.is_finite() && *m > 0.0);

        let prices = scenario::blend_scenarios(
            &scenario::ScenarioInputs {
                eps_anchor_year: earnings.year(2).eps,
                dcf_price: dcf.map(|d| d.equity_price),
                consensus_mean,
            },
            a,
        );

        let upside_percent =
            (prices.final_target - current_price) / current_price * 100.0;

        ValuationReport {
            revenue,
            earnings,
            valuation: ValuationResult {
                wacc,
                current_price,
                dcf,
                dcf_degenerate,
                pe_target_price: prices.pe_target,
                base_price: prices.base,
                bull_price: prices.bull,
                bear_price: prices.bear,
                weighted_target: prices.weighted,
                final_target_price: prices.final_target,
                upside_percent,
                consensus_mean,
            },
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
