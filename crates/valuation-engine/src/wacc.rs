//! Weighted average cost of capital.

use report_core::{defaults, MarketSnapshot};

use crate::assumptions::ModelAssumptions;

/// Estimate the discount rate from the snapshot's capital structure.
///
/// Never fails: any missing or unusable input short-circuits to the default
/// WACC. The reported beta is floored because defensive single-name betas
/// understate product-concentration and policy risk.
pub fn estimate_wacc(snapshot: &MarketSnapshot, a: &ModelAssumptions) -> f64 {
    let raw_beta = snapshot.beta.unwrap_or(defaults::BETA);
    let beta = if raw_beta < a.low_beta_cutoff {
        a.low_beta_replacement
    } else {
        raw_beta.max(a.beta_floor)
    };

    let cost_of_equity = a.risk_free_rate + beta * a.market_risk_premium;

    let total_debt = snapshot.total_debt.unwrap_or(0.0);
    let total_cash = snapshot.total_cash.unwrap_or(0.0);
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let cost_of_debt = match snapshot.interest_expense {
        Some(interest) if total_debt > 0.0 => interest.abs() / total_debt,
        _ => a.risk_free_rate + a.debt_spread,
    };

    let net_debt = total_debt - total_cash;
    let total_value = market_cap + net_debt;

    if total_value <= 0.0 {
        return a.default_wacc;
    }

    let equity_weight = market_cap / total_value;
    let debt_weight = net_debt / total_value;
    let wacc = equity_weight * cost_of_equity
        + debt_weight * cost_of_debt * (1.0 - a.corporate_tax_rate);

    // Adversarial inputs (e.g. an outsized interest expense against a tiny
    // total value) can push the formula outside any usable range; treat the
    // result like a missing input.
    if wacc.is_finite() && wacc > 0.0 && wacc < 0.5 {
        wacc
    } else {
        a.default_wacc
    }
}
