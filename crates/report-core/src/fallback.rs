//! Ordered fallback resolution.
//!
//! Missing market data never fails the pipeline; each input resolves through
//! an ordered list of tiers, taking the first value that exists and passes
//! the validity predicate, else a hardcoded default. Keeping the tiers as
//! data makes each one testable on its own.

/// A candidate value and the label of where it came from.
pub type Tier<T> = (&'static str, Option<T>);

/// Resolved value plus the label of the tier that supplied it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: &'static str,
}

/// Walk `tiers` in order and return the first value passing `valid`,
/// falling back to `default` when none does.
pub fn resolve<T: Copy>(
    tiers: &[Tier<T>],
    valid: impl Fn(&T) -> bool,
    default: (&'static str, T),
) -> Resolved<T> {
    for &(source, candidate) in tiers {
        if let Some(value) = candidate {
            if valid(&value) {
                return Resolved { value, source };
            }
        }
    }
    Resolved {
        value: default.1,
        source: default.0,
    }
}

/// Validity predicate for prices, caps, and revenue figures.
pub fn positive_finite(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_valid_tier() {
        let r = resolve(
            &[("a", None), ("b", Some(2.0)), ("c", Some(3.0))],
            positive_finite,
            ("default", 9.0),
        );
        assert_eq!(r.value, 2.0);
        assert_eq!(r.source, "b");
    }

    #[test]
    fn skips_invalid_values() {
        let r = resolve(
            &[("nan", Some(f64::NAN)), ("neg", Some(-1.0)), ("ok", Some(4.5))],
            positive_finite,
            ("default", 9.0),
        );
        assert_eq!(r.value, 4.5);
        assert_eq!(r.source, "ok");
    }

    #[test]
    fn falls_back_to_default_when_all_tiers_fail() {
        let r = resolve(&[("a", None::<f64>)], positive_finite, ("default", 9.0));
        assert_eq!(r.value, 9.0);
        assert_eq!(r.source, "default");
    }
}
