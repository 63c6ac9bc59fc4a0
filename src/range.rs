//! Declare-range classification.
//!
//! Responsibilities:
//! - Compute the score window inside which an attacker may declare on a
//!   target, and classify a target as in range, near range, or out of range.
//! - Report the signed score delta (in range) or the gap to the nearest
//!   window edge (near range).
//!
//! Non-responsibilities:
//! - Deciding whether a classification should gate an alert (pollers own
//!   that, since it depends on per-watch configuration).
//!
//! The upstream game community has circulated two upper multipliers for the
//! declare window (1.75x and 2.5x). This crate canonicalizes on 2.5x; if the
//! live game rules ever diverge, only the constant below changes and the
//! tests are written against the constants rather than literal bounds.

/// Lower edge of the declare window, as a multiple of the attacker's score.
pub const DECLARE_LOWER_MULT: f64 = 0.75;

/// Upper edge of the declare window, as a multiple of the attacker's score.
pub const DECLARE_UPPER_MULT: f64 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NearSide {
    Below,
    Above,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeClass {
    /// Target is inside the declare window. `delta_pct` is the signed
    /// difference of the target's score relative to the attacker's.
    InRange { delta_pct: f64 },
    /// Target is within the configured tolerance band just outside the
    /// window. `gap_pct` is the distance to the violated edge, as a
    /// percentage of that edge.
    NearRange { side: NearSide, gap_pct: f64 },
    OutOfRange,
}

impl RangeClass {
    /// In range or near range: close enough to be worth surfacing.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, RangeClass::OutOfRange)
    }
}

/// The `[min, max]` declare window for an attacker score, or `None` when the
/// score is missing/nonsensical (the upstream API sometimes omits scores).
pub fn declare_window(attacker_score: f64) -> Option<(f64, f64)> {
    if !attacker_score.is_finite() || attacker_score <= 0.0 {
        return None;
    }
    Some((
        attacker_score * DECLARE_LOWER_MULT,
        attacker_score * DECLARE_UPPER_MULT,
    ))
}

/// Classifies `target_score` against the attacker's declare window.
///
/// Both window edges are inclusive. `near_range_percent` widens the window
/// on both sides into an early-warning band; `0` disables the band.
///
/// Defensive on bad input: a non-positive or non-finite attacker score, or a
/// negative/non-finite target score, classifies as `OutOfRange` rather than
/// panicking. For the radar's reversed-role check, call this with the
/// subject as the attacker.
pub fn classify(attacker_score: f64, target_score: f64, near_range_percent: f64) -> RangeClass {
    let Some((min, max)) = declare_window(attacker_score) else {
        return RangeClass::OutOfRange;
    };
    if !target_score.is_finite() || target_score < 0.0 {
        return RangeClass::OutOfRange;
    }

    if target_score >= min && target_score <= max {
        let delta_pct = (target_score - attacker_score) / attacker_score * 100.0;
        return RangeClass::InRange { delta_pct };
    }

    let tolerance = if near_range_percent.is_finite() && near_range_percent > 0.0 {
        near_range_percent / 100.0
    } else {
        0.0
    };
    let below_band = min * (1.0 - tolerance);
    let above_band = max * (1.0 + tolerance);

    if target_score >= below_band && target_score < min {
        let gap_pct = (min - target_score) / min * 100.0;
        return RangeClass::NearRange {
            side: NearSide::Below,
            gap_pct,
        };
    }
    if target_score > max && target_score <= above_band {
        let gap_pct = (target_score - max) / max * 100.0;
        return RangeClass::NearRange {
            side: NearSide::Above,
            gap_pct,
        };
    }

    RangeClass::OutOfRange
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_edges_are_inclusive() {
        let s = 1000.0;
        assert!(matches!(
            classify(s, s * DECLARE_LOWER_MULT, 0.0),
            RangeClass::InRange { .. }
        ));
        assert!(matches!(
            classify(s, s * DECLARE_UPPER_MULT, 0.0),
            RangeClass::InRange { .. }
        ));
        assert_eq!(
            classify(s, s * DECLARE_LOWER_MULT - 0.001, 0.0),
            RangeClass::OutOfRange
        );
        assert_eq!(
            classify(s, s * DECLARE_UPPER_MULT + 0.001, 0.0),
            RangeClass::OutOfRange
        );
    }

    #[test]
    fn delta_pct_is_signed() {
        let RangeClass::InRange { delta_pct } = classify(1000.0, 800.0, 0.0) else {
            panic!("expected in range");
        };
        assert!((delta_pct - -20.0).abs() < 1e-9);

        let RangeClass::InRange { delta_pct } = classify(1000.0, 1500.0, 0.0) else {
            panic!("expected in range");
        };
        assert!((delta_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn near_band_below_window() {
        let s = 1000.0;
        let min = s * DECLARE_LOWER_MULT;

        // Just inside the 10% band below the lower edge.
        let target = min * 0.91;
        let RangeClass::NearRange { side, gap_pct } = classify(s, target, 10.0) else {
            panic!("expected near range");
        };
        assert_eq!(side, NearSide::Below);
        assert!((gap_pct - 9.0).abs() < 1e-9);

        // Just outside the band.
        assert_eq!(classify(s, min * 0.89, 10.0), RangeClass::OutOfRange);
    }

    #[test]
    fn near_band_above_window() {
        let s = 1000.0;
        let max = s * DECLARE_UPPER_MULT;

        let RangeClass::NearRange { side, .. } = classify(s, max * 1.05, 10.0) else {
            panic!("expected near range");
        };
        assert_eq!(side, NearSide::Above);

        assert_eq!(classify(s, max * 1.11, 10.0), RangeClass::OutOfRange);
    }

    #[test]
    fn bad_scores_classify_out_of_range() {
        assert_eq!(classify(0.0, 500.0, 5.0), RangeClass::OutOfRange);
        assert_eq!(classify(-10.0, 500.0, 5.0), RangeClass::OutOfRange);
        assert_eq!(classify(f64::NAN, 500.0, 5.0), RangeClass::OutOfRange);
        assert_eq!(classify(1000.0, -1.0, 5.0), RangeClass::OutOfRange);
        assert_eq!(classify(1000.0, f64::INFINITY, 5.0), RangeClass::OutOfRange);
        assert!(declare_window(0.0).is_none());
    }

    proptest! {
        #[test]
        fn classify_never_panics(a in any::<f64>(), t in any::<f64>(), p in any::<f64>()) {
            let _ = classify(a, t, p);
        }

        #[test]
        fn in_range_iff_inside_window(
            a in 1.0f64..1_000_000.0,
            t in 0.0f64..10_000_000.0,
        ) {
            let (min, max) = declare_window(a).unwrap();
            let inside = t >= min && t <= max;
            let classed_in = matches!(classify(a, t, 0.0), RangeClass::InRange { .. });
            prop_assert_eq!(inside, classed_in);
        }
    }
}
