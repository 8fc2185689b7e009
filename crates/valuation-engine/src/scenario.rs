//! Bull/base/bear scenario construction and blending.

use crate::assumptions::ModelAssumptions;
use crate::multiple::price_from_multiple;

/// Inputs the blender needs from the rest of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioInputs {
    /// Projected EPS for forward year 2, the multiple anchor year.
    pub eps_anchor_year: f64,
    /// DCF-derived equity price, when the DCF leg is valid.
    pub dcf_price: Option<f64>,
    /// Analyst consensus mean target, when available.
    pub consensus_mean: Option<f64>,
}

/// Scenario prices and the blended targets derived from them.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioPrices {
    pub pe_target: f64,
    pub base: f64,
    pub bull: f64,
    pub bear: f64,
    pub weighted: f64,
    pub final_target: f64,
}

/// Probability-weighted target across the three scenarios.
pub fn probability_weighted(bull: f64, base: f64, bear: f64, a: &ModelAssumptions) -> f64 {
    bull * a.prob_bull + base * a.prob_base + bear * a.prob_bear
}

/// Final target: the probability-weighted target re-blended toward the bull
/// case. The extra bull weighting is a conviction overlay beyond the stated
/// probabilities.
pub fn final_target(weighted: f64, bull: f64, a: &ModelAssumptions) -> f64 {
    weighted * a.weighted_leg_weight + bull * a.bull_leg_weight
}

/// Build all three scenarios and blend them into one target.
///
/// Each scenario blends its P/E-derived price 50/50 with the (scaled) DCF
/// price when a DCF is available, else uses the P/E price alone. The base
/// case is additionally re-anchored toward analyst consensus when present.
pub fn blend_scenarios(inputs: &ScenarioInputs, a: &ModelAssumptions) -> ScenarioPrices {
    let pe_target = price_from_multiple(inputs.eps_anchor_year, a.base_pe);

    let mut base = match inputs.dcf_price {
        Some(dcf) => pe_target * 0.5 + dcf * 0.5,
        None => pe_target,
    };
    if let Some(mean) = inputs.consensus_mean {
        base = base * (1.0 - a.consensus_weight) + mean * a.consensus_weight;
    }

    let bull_pe_price =
        price_from_multiple(inputs.eps_anchor_year * a.bull_eps_scale, a.bull_pe);
    let bull = match inputs.dcf_price {
        Some(dcf) => bull_pe_price * 0.5 + dcf * a.bull_eps_scale * 0.5,
        None => bull_pe_price,
    };

    let bear_pe_price =
        price_from_multiple(inputs.eps_anchor_year * a.bear_eps_scale, a.bear_pe);
    let bear = match inputs.dcf_price {
        Some(dcf) => bear_pe_price * 0.5 + dcf * a.bear_eps_scale * 0.5,
        None => bear_pe_price,
    };

    let weighted = probability_weighted(bull, base, bear, a);
    let final_price = final_target(weighted, bull, a);

    ScenarioPrices {
        pe_target,
        base,
        bull,
        bear,
        weighted,
        final_target: final_price,
    }
}
