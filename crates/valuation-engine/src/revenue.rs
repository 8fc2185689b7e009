//! Revenue and segment-mix projection.

use report_core::fallback::{resolve, Resolved, Tier};
use report_core::{defaults, AnnualStatement, MarketSnapshot, RevenueForecast, RevenueYear};

use crate::assumptions::ModelAssumptions;

/// Resolve the base-year total revenue in billions through the documented
/// fallback chain: most recent statement year, second most recent, the
/// snapshot's trailing revenue, then the guidance constant.
pub(crate) fn resolve_base_revenue(
    statements: Option<&[AnnualStatement]>,
    snapshot: &MarketSnapshot,
    a: &ModelAssumptions,
) -> Resolved<f64> {
    let stmt_revenue = |idx: usize| -> Option<f64> {
        statements
            .and_then(|s| s.get(idx))
            .and_then(|s| s.total_revenue)
            .map(|v| v / 1e9)
    };

    let tiers: [Tier<f64>; 3] = [
        ("statements[0]", stmt_revenue(0)),
        ("statements[1]", stmt_revenue(1)),
        ("snapshot.total_revenue", snapshot.total_revenue.map(|v| v / 1e9)),
    ];

    // A base year at or above the year+1 guidance would break the strictly
    // increasing revenue invariant; such a figure is stale for this model
    // and falls through to the next tier.
    resolve(
        &tiers,
        |v| v.is_finite() && *v > 0.0 && *v < a.guidance_next_year_revenue,
        ("model default", defaults::BASE_REVENUE_BILLIONS),
    )
}

/// Project four years of total revenue and segment mix.
///
/// Year+1 comes from guidance; years +2 and +3 apply the fixed growth rates.
/// The segment share schedule is applied multiplicatively.
pub fn project_revenue(
    statements: Option<&[AnnualStatement]>,
    snapshot: &MarketSnapshot,
    a: &ModelAssumptions,
) -> RevenueForecast {
    let base = resolve_base_revenue(statements, snapshot, a);

    let totals = [
        base.value,
        a.guidance_next_year_revenue,
        a.guidance_next_year_revenue * (1.0 + a.revenue_growth_year2),
        a.guidance_next_year_revenue
            * (1.0 + a.revenue_growth_year2)
            * (1.0 + a.revenue_growth_year3),
    ];

    let years = totals
        .iter()
        .enumerate()
        .map(|(i, &total)| RevenueYear {
            year: a.base_year + i as i32,
            total_revenue: total,
            growth_percent: (i > 0)
                .then(|| (total - totals[i - 1]) / totals[i - 1] * 100.0),
            segment_revenue: total * a.segment_share_schedule[i],
            segment_share: a.segment_share_schedule[i],
        })
        .collect();

    RevenueForecast {
        years,
        base_revenue_source: base.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(revenue: f64) -> AnnualStatement {
        AnnualStatement {
            total_revenue: Some(revenue),
            ..AnnualStatement::default()
        }
    }

    #[test]
    fn growth_path_matches_fixed_rates() {
        let a = ModelAssumptions::default();
        let statements = vec![stmt(45.0e9)];
        let f = project_revenue(Some(statements.as_slice()), &MarketSnapshot::default(), &a);

        assert_eq!(f.years.len(), 4);
        assert_eq!(f.base_revenue_source, "statements[0]");
        assert!((f.year(0).total_revenue - 45.0).abs() < 1e-9);
        assert!((f.year(1).total_revenue - 59.5).abs() < 1e-9);
        assert!((f.year(2).total_revenue - 76.16).abs() < 0.01);
        assert!((f.year(3).total_revenue - 92.92).abs() < 0.01);
    }

    #[test]
    fn revenue_is_strictly_increasing_and_share_non_decreasing() {
        let a = ModelAssumptions::default();
        let f = project_revenue(None, &MarketSnapshot::default(), &a);

        assert!(f
            .years
            .windows(2)
            .all(|w| w[1].total_revenue > w[0].total_revenue));
        assert!(f
            .years
            .windows(2)
            .all(|w| w[1].segment_share >= w[0].segment_share));
    }

    #[test]
    fn nan_base_year_falls_back_to_prior_statement() {
        let a = ModelAssumptions::default();
        let statements = vec![stmt(f64::NAN), stmt(41.0e9)];
        let f = project_revenue(Some(statements.as_slice()), &MarketSnapshot::default(), &a);
        assert_eq!(f.base_revenue_source, "statements[1]");
        assert!((f.year(0).total_revenue - 41.0).abs() < 1e-9);
    }

    #[test]
    fn missing_statements_use_snapshot_then_default() {
        let a = ModelAssumptions::default();
        let s = MarketSnapshot {
            total_revenue: Some(43.2e9),
            ..MarketSnapshot::default()
        };
        let f = project_revenue(None, &s, &a);
        assert_eq!(f.base_revenue_source, "snapshot.total_revenue");
        assert!((f.year(0).total_revenue - 43.2).abs() < 1e-9);

        let f = project_revenue(None, &MarketSnapshot::default(), &a);
        assert_eq!(f.base_revenue_source, "model default");
        assert!((f.year(0).total_revenue - 45.0).abs() < 1e-9);
    }

    #[test]
    fn stale_base_above_guidance_is_rejected() {
        let a = ModelAssumptions::default();
        let statements = vec![stmt(70.0e9)];
        let f = project_revenue(Some(statements.as_slice()), &MarketSnapshot::default(), &a);
        assert_eq!(f.base_revenue_source, "model default");
        assert!(f
            .years
            .windows(2)
            .all(|w| w[1].total_revenue > w[0].total_revenue));
    }

    #[test]
    fn growth_percent_is_relative_to_prior_year() {
        let a = ModelAssumptions::default();
        let statements = vec![stmt(45.0e9)];
        let f = project_revenue(Some(statements.as_slice()), &MarketSnapshot::default(), &a);
        let g1 = f.year(1).growth_percent.unwrap();
        assert!((g1 - (59.5 - 45.0) / 45.0 * 100.0).abs() < 1e-9);
        assert!(f.year(0).growth_percent.is_none());
        assert!((f.year(2).growth_percent.unwrap() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn segment_revenue_follows_the_schedule() {
        let a = ModelAssumptions::default();
        let f = project_revenue(None, &MarketSnapshot::default(), &a);
        for (i, y) in f.years.iter().enumerate() {
            let expected = y.total_revenue * a.segment_share_schedule[i];
            assert!((y.segment_revenue - expected).abs() < 1e-9);
        }
    }
}
