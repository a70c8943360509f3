//! Kinematic envelope derivation.
//!
//! Given a proposed move expressed as a per-axis delta, computes the
//! largest velocity/acceleration/jerk triple that no participating axis
//! exceeds (spec §4.2). This is the conservative "min of per-axis maxima"
//! bound; time-based alternatives are an explicit non-goal (spec §9).

use crate::axis::{AxisLimits, AxisMask};
use crate::units::{Pose, ANGULAR_AXES, LINEAR_AXES, MOTION_EPSILON};
use serde::{Deserialize, Serialize};

/// Per-axis limit sentinel used when an axis does not participate in a
/// move — effectively "+infinity" without using a float that can't
/// round-trip through JSON.
pub const STATIONARY_SENTINEL: f64 = 1e9;

/// Classification of a proposed move, from spec §4.2's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionCategory {
    /// Only linear axes (x,y,z,u,v,w) move.
    Linear,
    /// Only angular axes (a,b,c) move.
    Angular,
    /// Both linear and angular axes move.
    Combined,
    /// No axis moves.
    Degenerate,
}

/// The derived kinematic envelope for a proposed move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
    pub category: MotionCategory,
}

fn axis_moves(delta: &Pose, mask: AxisMask, idx: usize) -> bool {
    mask.contains(idx) && delta.axis(idx).abs() >= MOTION_EPSILON
}

fn group_min(
    axes: &[usize],
    delta: &Pose,
    mask: AxisMask,
    limit: impl Fn(usize) -> f64,
) -> f64 {
    axes.iter()
        .map(|&idx| {
            if axis_moves(delta, mask, idx) {
                limit(idx)
            } else {
                STATIONARY_SENTINEL
            }
        })
        .fold(f64::INFINITY, f64::min)
}

fn classify(delta: &Pose, mask: AxisMask) -> MotionCategory {
    let linear_moves = LINEAR_AXES.iter().any(|&idx| axis_moves(delta, mask, idx));
    let angular_moves = ANGULAR_AXES.iter().any(|&idx| axis_moves(delta, mask, idx));
    match (linear_moves, angular_moves) {
        (true, false) => MotionCategory::Linear,
        (false, true) => MotionCategory::Angular,
        (true, true) => MotionCategory::Combined,
        (false, false) => MotionCategory::Degenerate,
    }
}

/// Compute the envelope for a move from the current end point to `target`.
///
/// `delta` must already be `target - end_point` in internal units; axes
/// outside `mask` and deltas smaller than [`crate::units::MOTION_EPSILON`]
/// are treated as stationary, per spec §4.2.
pub fn compute_envelope(delta: &Pose, mask: AxisMask, limits: &dyn AxisLimits) -> Envelope {
    let category = classify(delta, mask);

    let linear_vel = group_min(&LINEAR_AXES, delta, mask, |i| limits.max_velocity(i));
    let linear_acc = group_min(&LINEAR_AXES, delta, mask, |i| limits.max_acceleration(i));
    let linear_jerk = group_min(&LINEAR_AXES, delta, mask, |i| limits.max_jerk(i));

    let angular_vel = group_min(&ANGULAR_AXES, delta, mask, |i| limits.max_velocity(i));
    let angular_acc = group_min(&ANGULAR_AXES, delta, mask, |i| limits.max_acceleration(i));
    let angular_jerk = group_min(&ANGULAR_AXES, delta, mask, |i| limits.max_jerk(i));

    let (velocity, acceleration, jerk) = match category {
        MotionCategory::Linear => (linear_vel, linear_acc, linear_jerk),
        MotionCategory::Angular => (angular_vel, angular_acc, angular_jerk),
        MotionCategory::Combined => (
            linear_vel.min(angular_vel),
            linear_acc.min(angular_acc),
            linear_jerk.min(angular_jerk),
        ),
        MotionCategory::Degenerate => (0.0, 0.0, 0.0),
    };

    if category != MotionCategory::Degenerate {
        assert!(
            velocity > 0.0 && acceleration > 0.0 && jerk > 0.0,
            "envelope derivation produced a non-positive limit for a moving axis: \
             velocity={velocity} acceleration={acceleration} jerk={jerk} category={category:?}"
        );
    }

    Envelope { velocity, acceleration, jerk, category }
}

/// Clamp the envelope velocity by the programmed feed, per spec §4.2:
/// `linearFeedRate` for LINEAR/COMBINED, `angularFeedRate` for pure
/// ANGULAR. The degenerate case returns `linear_feed_rate` unconditionally
/// — an intentional, unasserted no-motion price (spec §9 open question).
pub fn clamp_feed(envelope: &Envelope, linear_feed_rate: f64, angular_feed_rate: f64) -> f64 {
    let programmed = match envelope.category {
        MotionCategory::Angular => angular_feed_rate,
        MotionCategory::Linear | MotionCategory::Combined | MotionCategory::Degenerate => {
            linear_feed_rate
        }
    };
    envelope.velocity.min(programmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::StaticAxisLimits;
    use crate::units::Pose;

    fn limits(v: f64, a: f64, j: f64) -> StaticAxisLimits {
        StaticAxisLimits::uniform(v, a, j, AxisMask::ALL)
    }

    #[test]
    fn pure_linear_move_classifies_linear() {
        let delta = Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        assert_eq!(env.category, MotionCategory::Linear);
        assert_eq!(env.velocity, 100.0);
    }

    #[test]
    fn pure_angular_move_classifies_angular() {
        let delta = Pose::new(0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        assert_eq!(env.category, MotionCategory::Angular);
    }

    #[test]
    fn combined_move_takes_conservative_min() {
        let mut lim = limits(100.0, 1000.0, 10000.0);
        lim.max_velocity[crate::units::AXIS_A] = 5.0;
        let delta = Pose::new(10.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::ALL, &lim);
        assert_eq!(env.category, MotionCategory::Combined);
        assert_eq!(env.velocity, 5.0);
    }

    #[test]
    fn degenerate_move_has_no_assertion() {
        let delta = Pose::ZERO;
        let env = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        assert_eq!(env.category, MotionCategory::Degenerate);
    }

    #[test]
    fn axes_outside_mask_are_ignored() {
        let delta = Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::XYZ, &limits(100.0, 1000.0, 10000.0));
        // U moves by 50 but is outside the mask, so this stays pure linear
        // through X alone and the envelope is unaffected by U's absence.
        assert_eq!(env.category, MotionCategory::Linear);
        assert_eq!(env.velocity, 100.0);
    }

    #[test]
    fn monotonicity_lower_limit_never_increases_envelope() {
        let delta = Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let high = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        let low = compute_envelope(&delta, AxisMask::ALL, &limits(40.0, 1000.0, 10000.0));
        assert!(low.velocity <= high.velocity);
    }

    #[test]
    fn feed_clamp_prefers_lower_of_envelope_and_programmed() {
        let delta = Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        assert_eq!(clamp_feed(&env, 10.0, 999.0), 10.0);
    }

    #[test]
    fn feed_clamp_uses_angular_feed_for_pure_angular() {
        let delta = Pose::new(0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let env = compute_envelope(&delta, AxisMask::ALL, &limits(100.0, 1000.0, 10000.0));
        assert_eq!(clamp_feed(&env, 10.0, 3.0), 3.0);
    }
}
