//! Arc-plane geometry shared by `arc_feed` and the biarc spline fitter.

use std::f64::consts::PI;

/// `theta1`, `theta2` (normalized into the arc's winding direction),
/// `radius`, and the deviation/midpoint used by the chord-degrade check
/// (spec §4.5 "Chord deviation").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordDeviation {
    pub theta1: f64,
    pub theta2: f64,
    pub radius: f64,
    pub deviation: f64,
    pub midpoint: (f64, f64),
}

/// Normalize `theta2` into the winding direction implied by `rotation`:
/// positive rotation winds counter-clockwise (theta2 > theta1), negative
/// winds clockwise (theta2 < theta1). Two correction passes, each adding
/// or subtracting a full turn when the sign of the delta is wrong,
/// mirroring the source's goto-based retry (design note §9).
fn normalize_into_winding(theta1: f64, mut theta2: f64, rotation: i32) -> f64 {
    for _ in 0..2 {
        if rotation > 0 && theta2 < theta1 {
            theta2 += 2.0 * PI;
        } else if rotation < 0 && theta2 > theta1 {
            theta2 -= 2.0 * PI;
        }
    }
    theta2
}

/// Compute the chord deviation used to decide whether a near-straight arc
/// should degrade into two linked straight feeds (spec §4.5).
pub fn chord_deviation(
    start: (f64, f64),
    end: (f64, f64),
    center: (f64, f64),
    rotation: i32,
) -> ChordDeviation {
    let theta1 = (start.1 - center.1).atan2(start.0 - center.0);
    let theta2_raw = (end.1 - center.1).atan2(end.0 - center.0);
    let radius = (start.0 - center.0).hypot(start.1 - center.1);

    let theta2 = normalize_into_winding(theta1, theta2_raw, rotation);
    let half_span = (theta2 - theta1).abs() / 2.0;
    let deviation = radius * (1.0 - half_span.cos());
    let mid = (theta1 + theta2) / 2.0;
    let midpoint = (center.0 + radius * mid.cos(), center.1 + radius * mid.sin());

    ChordDeviation { theta1, theta2, radius, deviation, midpoint }
}

/// `turn` field for `CircularMove`, per spec's glossary: `rotation - 1` for
/// positive rotation (CCW), `rotation` for negative (CW, reverse winding).
pub fn turn_count(rotation: i32) -> i32 {
    if rotation > 0 {
        rotation - 1
    } else {
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_count_matches_glossary() {
        assert_eq!(turn_count(1), 0);
        assert_eq!(turn_count(2), 1);
        assert_eq!(turn_count(-1), -1);
        assert_eq!(turn_count(-3), -3);
    }

    #[test]
    fn half_circle_has_maximal_deviation() {
        // start=(1,0), end=(-1,0), center=(0,0): a half circle bulges a
        // full diameter away from its chord.
        let cd = chord_deviation((1.0, 0.0), (-1.0, 0.0), (0.0, 0.0), 1);
        assert!((cd.radius - 1.0).abs() < 1e-9);
        assert!((cd.deviation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn near_straight_arc_has_small_deviation() {
        // A tiny CCW angular step on a radius-1000 circle looks almost
        // straight.
        let center = (0.0, -1000.0);
        let radius = 1000.0;
        let theta1 = PI / 2.0;
        let theta2 = theta1 + 0.0001;
        let start = (center.0 + radius * theta1.cos(), center.1 + radius * theta1.sin());
        let end = (center.0 + radius * theta2.cos(), center.1 + radius * theta2.sin());
        let cd = chord_deviation(start, end, center, 1);
        assert!(cd.deviation < 0.01, "deviation={}", cd.deviation);
    }

    #[test]
    fn example_arc_matches_spec_scenario_four() {
        // spec.md §8 scenario 4: firstEnd=10, secondEnd=0, firstAxis=5 ->
        // center=(5,0), start=(0,0), end=(10,0), rotation=1.
        let cd = chord_deviation((0.0, 0.0), (10.0, 0.0), (5.0, 0.0), 1);
        assert!((cd.radius - 5.0).abs() < 1e-9);
    }
}
