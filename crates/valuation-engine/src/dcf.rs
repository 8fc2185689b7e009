//! Discounted cash flow valuation.

use report_core::ReportError;

use crate::assumptions::ModelAssumptions;

/// Present value of the explicit cash flows plus a perpetuity-growth
/// terminal value, in dollars.
#[derive(Debug, Clone, Copy)]
pub struct EnterpriseValue {
    pub enterprise_value: f64,
    pub pv_explicit: f64,
    pub pv_terminal: f64,
}

/// Discount a cash-flow series to enterprise value.
///
/// A discount rate at or below the terminal growth rate makes the perpetuity
/// denominator non-positive; that is a degenerate valuation and is surfaced
/// as an error instead of a nonsensical number.
pub fn value_enterprise(
    cashflows: &[f64],
    wacc: f64,
    a: &ModelAssumptions,
) -> Result<EnterpriseValue, ReportError> {
    if cashflows.is_empty() {
        return Err(ReportError::InsufficientData(
            "empty cash-flow series".to_string(),
        ));
    }
    if wacc <= a.terminal_growth {
        return Err(ReportError::DegenerateValuation(format!(
            "wacc {:.4} does not exceed terminal growth {:.4}",
            wacc, a.terminal_growth
        )));
    }

    let pv_explicit: f64 = cashflows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + wacc).powi(i as i32 + 1))
        .sum();

    let terminal_cf = cashflows[cashflows.len() - 1] * (1.0 + a.terminal_growth);
    let terminal_value = terminal_cf / (wacc - a.terminal_growth);
    let pv_terminal = terminal_value / (1.0 + wacc).powi(a.dcf_horizon_years as i32);

    let enterprise_value = pv_explicit + pv_terminal;
    if !enterprise_value.is_finite() {
        return Err(ReportError::DegenerateValuation(
            "non-finite enterprise value".to_string(),
        ));
    }

    Ok(EnterpriseValue {
        enterprise_value,
        pv_explicit,
        pv_terminal,
    })
}

/// Convert enterprise value to an equity price per share.
pub fn equity_price(
    enterprise_value: f64,
    net_debt: f64,
    shares_outstanding: f64,
) -> Result<f64, ReportError> {
    if shares_outstanding <= 0.0 {
        return Err(ReportError::DegenerateValuation(format!(
            "non-positive shares outstanding: {}",
            shares_outstanding
        )));
    }
    let price = (enterprise_value - net_debt) / shares_outstanding;
    if !price.is_finite() {
        return Err(ReportError::DegenerateValuation(
            "non-finite equity price".to_string(),
        ));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enterprise_value_matches_direct_formula() {
        let a = ModelAssumptions::default();
        let cashflows: Vec<f64> =
            [10.0, 11.0, 12.0, 13.0, 14.0].iter().map(|v| v * 1e9).collect();
        let wacc = 0.095;

        let ev = value_enterprise(&cashflows, wacc, &a).unwrap();

        let mut pv = 0.0;
        for (i, cf) in cashflows.iter().enumerate() {
            pv += cf / (1.0_f64 + wacc).powi(i as i32 + 1);
        }
        let terminal = 14.0e9 * 1.035 / (wacc - 0.035);
        let pv_terminal = terminal / (1.0_f64 + wacc).powi(5);

        assert!((ev.pv_explicit - pv).abs() < 1.0);
        assert!((ev.pv_terminal - pv_terminal).abs() < 1.0);
        assert!((ev.enterprise_value - (pv + pv_terminal)).abs() < 1.0);
    }

    #[test]
    fn wacc_below_terminal_growth_is_degenerate() {
        let a = ModelAssumptions::default();
        let cashflows = vec![10e9, 11e9, 12e9, 13e9, 14e9];
        let err = value_enterprise(&cashflows, 0.03, &a).unwrap_err();
        assert!(err.is_degenerate(), "got {err}");
    }

    #[test]
    fn wacc_equal_to_terminal_growth_is_degenerate() {
        let a = ModelAssumptions::default();
        let err = value_enterprise(&[10e9], a.terminal_growth, &a).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn empty_series_is_rejected() {
        let a = ModelAssumptions::default();
        assert!(value_enterprise(&[], 0.095, &a).is_err());
    }

    #[test]
    fn equity_price_subtracts_net_debt() {
        let price = equity_price(1_000e9, 20e9, 1e9).unwrap();
        assert!((price - 980.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_shares_are_degenerate() {
        assert!(equity_price(1_000e9, 0.0, 0.0).unwrap_err().is_degenerate());
        assert!(equity_price(1_000e9, 0.0, -5.0).unwrap_err().is_degenerate());
    }
}
