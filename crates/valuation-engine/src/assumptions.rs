//! Fixed model assumptions.
//!
//! Every constant the pipeline uses lives here as a named field so each one
//! is independently testable and swappable, instead of being scattered as
//! inline literals through the math.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAssumptions {
    // --- Discount rate (CAPM / WACC) ---
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    pub corporate_tax_rate: f64,
    /// Spread over the risk-free rate when cost of debt cannot be derived.
    pub debt_spread: f64,
    /// WACC used whenever the capital structure cannot support the formula.
    pub default_wacc: f64,
    /// Betas below this are treated as understating single-name risk.
    pub low_beta_cutoff: f64,
    /// Replacement for betas below the cutoff.
    pub low_beta_replacement: f64,
    /// Minimum beta applied otherwise.
    pub beta_floor: f64,

    // --- Revenue projection ---
    /// Calendar label of the base model year.
    pub base_year: i32,
    /// Year+1 total revenue in billions, from company guidance midpoint.
    pub guidance_next_year_revenue: f64,
    /// Growth applied for year+2.
    pub revenue_growth_year2: f64,
    /// Growth applied for year+3.
    pub revenue_growth_year3: f64,
    /// Segment share of total revenue for years 0..3.
    pub segment_share_schedule: [f64; 4],

    // --- Margin and EPS projection ---
    /// Sustainable operating margin used when the reported one is elevated
    /// or missing.
    pub sustainable_margin: f64,
    /// Reported margins above this are normalized down to sustainable.
    pub margin_normalization_ceiling: f64,
    /// Reported margins at or below this are replaced by sustainable.
    pub margin_floor: f64,
    /// Per-year margin step-ups for years 1..3.
    pub margin_step_ups: [f64; 3],
    /// Growth multipliers used to regenerate the whole EPS path when the
    /// first forward year dips below the base year.
    pub fallback_eps_growth: [f64; 3],
    /// Minimum growth floors for individually repaired years 2 and 3.
    pub min_eps_growth_year2: f64,
    pub min_eps_growth_year3: f64,

    // --- Free cash flow ---
    /// FCF conversion ratios for years 0..3.
    pub fcf_conversion: [f64; 4],
    /// Conversion ratio for the synthetic terminal-adjacent year.
    pub terminal_fcf_conversion: f64,
    /// Revenue growth used for the synthetic terminal-adjacent year and for
    /// extending its cash flow once more to fill the five-year DCF horizon.
    pub terminal_adjacent_growth: f64,

    // --- DCF ---
    pub terminal_growth: f64,
    pub dcf_horizon_years: u32,

    // --- Multiples and scenarios ---
    pub base_pe: f64,
    pub bull_pe: f64,
    pub bear_pe: f64,
    pub bull_eps_scale: f64,
    pub bear_eps_scale: f64,
    /// Weight given to analyst consensus when re-blending the base case.
    pub consensus_weight: f64,
    pub prob_bull: f64,
    pub prob_base: f64,
    pub prob_bear: f64,
    /// Final target = weighted_leg_weight x probability-weighted target
    /// + bull_leg_weight x bull price. The extra bull weighting is a
    /// deliberate conviction overlay on top of the stated probabilities,
    /// not derived from them; preserved as-is for behavioral fidelity.
    pub weighted_leg_weight: f64,
    pub bull_leg_weight: f64,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,
            market_risk_premium: 0.06,
            corporate_tax_rate: 0.21,
            debt_spread: 0.015,
            default_wacc: 0.085,
            low_beta_cutoff: 0.5,
            low_beta_replacement: 0.75,
            beta_floor: 0.7,

            base_year: 2024,
            guidance_next_year_revenue: 59.5,
            revenue_growth_year2: 0.28,
            revenue_growth_year3: 0.22,
            segment_share_schedule: [0.45, 0.55, 0.60, 0.62],

            sustainable_margin: 0.38,
            margin_normalization_ceiling: 0.40,
            margin_floor: 0.30,
            margin_step_ups: [0.01, 0.01, 0.005],
            fallback_eps_growth: [0.10, 0.25, 0.20],
            min_eps_growth_year2: 0.20,
            min_eps_growth_year3: 0.15,

            fcf_conversion: [0.87, 0.89, 0.91, 0.92],
            terminal_fcf_conversion: 0.93,
            terminal_adjacent_growth: 0.15,

            terminal_growth: 0.035,
            dcf_horizon_years: 5,

            base_pe: 45.0,
            bull_pe: 52.0,
            bear_pe: 28.0,
            bull_eps_scale: 1.15,
            bear_eps_scale: 0.85,
            consensus_weight: 0.2,
            prob_bull: 0.35,
            prob_base: 0.45,
            prob_bear: 0.20,
            weighted_leg_weight: 0.6,
            bull_leg_weight: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_probabilities_sum_to_one() {
        let a = ModelAssumptions::default();
        assert!((a.prob_bull + a.prob_base + a.prob_bear - 1.0).abs() < 1e-12);
        assert!((a.weighted_leg_weight + a.bull_leg_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn segment_share_schedule_is_non_decreasing() {
        let a = ModelAssumptions::default();
        assert!(a
            .segment_share_schedule
            .windows(2)
            .all(|w| w[1] >= w[0]));
    }
}
