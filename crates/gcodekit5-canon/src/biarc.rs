//! Biarc fitting: approximate a curve segment between two tangent samples
//! with a pair of circular arcs sharing a tangent at their joint (spec
//! §4.5, §9 "goto-based biarc perturbation").
//!
//! The joining parameter `beta` solves `a*beta^2 + b*beta + c = 0` with
//! `a = 2r(ts.te - 1)`, `b = 2(v.(r*ts + te))`, `c = |v|^2`, `v = P0 - P4`,
//! `r = 1`, per spec. The joint point is the midpoint of the chord nudged
//! along `ts - te` by `beta`, not a point on either tangent ray: arc1 is
//! then the circle tangent to `ts` at `P0` passing through the joint, and
//! arc2 mirrors that construction from the joint's own (derived) tangent
//! through to `P4`, which fixes tangent continuity at the joint by
//! construction. `beta` is rejected (forcing the caller to halve its
//! sample step and retry) when the discriminant is negative.

use crate::curve::Point2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub start: Point2,
    pub end: Point2,
    pub center: Point2,
    pub radius: f64,
    /// `true` for counter-clockwise.
    pub ccw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biarc {
    pub joint: Point2,
    pub arc1: Arc,
    pub arc2: Arc,
}

fn dot(a: Point2, b: Point2) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

fn sub(a: Point2, b: Point2) -> Point2 {
    (a.0 - b.0, a.1 - b.1)
}

fn add(a: Point2, b: Point2) -> Point2 {
    (a.0 + b.0, a.1 + b.1)
}

fn scale(a: Point2, s: f64) -> Point2 {
    (a.0 * s, a.1 * s)
}

/// Rotate `v` by +90 degrees if `ccw`, else -90 degrees.
fn rotate90(v: Point2, ccw: bool) -> Point2 {
    if ccw {
        (-v.1, v.0)
    } else {
        (v.1, -v.0)
    }
}

/// Solve for the biarc joining parameter. Returns `None` when the fit
/// should be rejected (caller halves its step and retries).
///
/// As `a` shrinks toward zero, one root of the quadratic tends to the
/// finite linear solution `-c/b` while the other diverges to infinity —
/// an inherent feature of the degenerating conic, not a precision
/// artifact. The root of smaller magnitude is always the physically
/// meaningful one, so that is what gets returned rather than a root
/// picked by sign.
fn solve_beta(p0: Point2, t0: Point2, p4: Point2, t4: Point2) -> Option<f64> {
    let r = 1.0;
    let v = sub(p0, p4);
    let a = 2.0 * r * (dot(t0, t4) - 1.0);
    let b = 2.0 * dot(v, add(scale(t0, r), t4));
    let c = dot(v, v);

    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return None;
        }
        return Some(-c / b);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let r1 = (-b + sqrt_d) / (2.0 * a);
    let r2 = (-b - sqrt_d) / (2.0 * a);
    Some(if r1.abs() <= r2.abs() { r1 } else { r2 })
}

/// Build the circle through `b` that is tangent to `tangent_a` (unit) at
/// `a`. Returns `None` for the degenerate straight-line case (`a`, `b`
/// and the tangent are collinear).
fn circle_through(a: Point2, tangent_a: Point2, b: Point2) -> Option<(Point2, f64, bool)> {
    let d = sub(b, a);
    let n = rotate90(tangent_a, true);
    let denom = 2.0 * dot(d, n);
    if denom.abs() < 1e-12 {
        return None;
    }
    let r_signed = dot(d, d) / denom;
    let center = add(a, scale(n, r_signed));
    Some((center, r_signed.abs(), r_signed > 0.0))
}

/// Fit a biarc between `(p0, t0)` and `(p4, t4)` (unit tangents, in the
/// direction of travel). Returns `None` when the arc degenerates to a
/// straight segment (collinear tangents) rather than a genuine biarc —
/// callers fall back to two chained straight feeds through the midpoint
/// in that case.
pub fn fit_biarc(p0: Point2, t0: Point2, p4: Point2, t4: Point2) -> Option<Biarc> {
    let beta = solve_beta(p0, t0, p4, t4)?;
    // The joint is the midpoint of the chord, nudged along `t0 - t4` by
    // `beta`, not a point along either tangent ray — placing it on a
    // tangent ray would make the "circle tangent to that ray through the
    // joint" degenerate by construction.
    let joint = add(scale(add(p0, p4), 0.5), scale(sub(t0, t4), beta / 2.0));

    let (center1, radius1, ccw1) = circle_through(p0, t0, joint)?;
    let joint_tangent = rotate90(sub(joint, center1), ccw1);
    let (center2, radius2, ccw2) = circle_through(joint, joint_tangent, p4)?;

    Some(Biarc {
        joint,
        arc1: Arc { start: p0, end: joint, center: center1, radius: radius1, ccw: ccw1 },
        arc2: Arc { start: joint, end: p4, center: center2, radius: radius2, ccw: ccw2 },
    })
}
