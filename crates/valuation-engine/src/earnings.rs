//! EPS and free-cash-flow projection.

use report_core::fallback::{positive_finite, resolve};
use report_core::{defaults, EarningsForecast, EarningsYear, RevenueForecast, TickerBundle};

use crate::assumptions::ModelAssumptions;

/// Normalize the reported operating margin to a modelable starting point.
/// Elevated margins may include one-time items and are pulled down to the
/// sustainable base; implausibly low or missing margins default to it.
pub(crate) fn normalize_margin(raw: Option<f64>, a: &ModelAssumptions) -> f64 {
    match raw {
        Some(m) if m > a.margin_normalization_ceiling => a.sustainable_margin,
        Some(m) if m > a.margin_floor => m,
        _ => a.sustainable_margin,
    }
}

/// Post-condition check on the naive revenue-times-margin EPS path.
///
/// The model must never emit an EPS dip. If the first forward year falls
/// below the base year, the whole path is regenerated from fixed growth
/// multipliers; otherwise only the violating years are floored at minimum
/// growth over the prior year. Returns the repaired path and whether any
/// repair was applied.
pub(crate) fn repair_monotonic(
    base_eps: f64,
    naive: [f64; 3],
    a: &ModelAssumptions,
) -> ([f64; 3], bool) {
    if naive[0] < base_eps {
        let y1 = base_eps * (1.0 + a.fallback_eps_growth[0]);
        let y2 = y1 * (1.0 + a.fallback_eps_growth[1]);
        let y3 = y2 * (1.0 + a.fallback_eps_growth[2]);
        return ([y1, y2, y3], true);
    }

    let mut path = naive;
    let mut repaired = false;
    if path[1] < path[0] {
        path[1] = path[0] * (1.0 + a.min_eps_growth_year2);
        repaired = true;
    }
    if path[2] < path[1] {
        path[2] = path[1] * (1.0 + a.min_eps_growth_year3);
        repaired = true;
    }
    (path, repaired)
}

/// Project EPS, operating margins, and free cash flow over the forecast
/// horizon, and assemble the five-entry cash-flow series the DCF discounts.
pub fn project_earnings(
    bundle: &TickerBundle,
    revenue: &RevenueForecast,
    a: &ModelAssumptions,
) -> EarningsForecast {
    let snapshot = &bundle.snapshot;

    let price = resolve(
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
    let market_cap = resolve(
        &[("snapshot.market_cap", snapshot.market_cap)],
        positive_finite,
        ("default", defaults::MARKET_CAP),
    )
    .value;
    let shares_outstanding = market_cap / price;

    let base_eps = resolve(
        &[
            ("snapshot.forward_eps", snapshot.forward_eps),
            ("snapshot.trailing_eps", snapshot.trailing_eps),
        ],
        positive_finite,
        ("default", defaults::FORWARD_EPS),
    )
    .value;

    let base_margin = normalize_margin(snapshot.operating_margin, a);
    let margins = [
        base_margin,
        base_margin + a.margin_step_ups[0],
        base_margin + a.margin_step_ups[0] + a.margin_step_ups[1],
        base_margin + a.margin_step_ups[0] + a.margin_step_ups[1] + a.margin_step_ups[2],
    ];

    let naive = [1, 2, 3].map(|i| {
        revenue.year(i).total_revenue * margins[i] * 1e9 / shares_outstanding
    });
    let (forward_eps, repaired) = repair_monotonic(base_eps, naive, a);
    let eps = [base_eps, forward_eps[0], forward_eps[1], forward_eps[2]];

    let fcf = [0, 1, 2, 3].map(|i| {
        revenue.year(i).total_revenue * margins[i] * a.fcf_conversion[i] * 1e9
    });

    let years = (0..4)
        .map(|i| EarningsYear {
            year: revenue.year(i).year,
            eps: eps[i],
            operating_margin: margins[i],
            free_cash_flow: fcf[i],
        })
        .collect();

    // Synthetic terminal-adjacent year: revenue grows once more at the
    // terminal-adjacent rate with the final margin and peak conversion, and
    // its cash flow is extended once again to fill the five-year horizon.
    let terminal_adjacent_revenue =
        revenue.year(3).total_revenue * (1.0 + a.terminal_adjacent_growth);
    let terminal_adjacent_fcf =
        terminal_adjacent_revenue * margins[3] * a.terminal_fcf_conversion * 1e9;
    let dcf_cashflows = vec![
        fcf[1],
        fcf[2],
        fcf[3],
        terminal_adjacent_fcf,
        terminal_adjacent_fcf * (1.0 + a.terminal_adjacent_growth),
    ];

    EarningsForecast {
        years,
        dcf_cashflows,
        shares_outstanding,
        repaired,
    }
}
