//! 2D parametric curve evaluation for the spline/NURBS biarc fitter
//! (spec §4.5). Quadratic and cubic Bezier curves cover `SPLINE_FEED`;
//! [`Curve2D::Nurbs`] covers the 2D `NURBS_FEED` path. All three evaluate
//! to a point and a unit tangent at parameter `t ∈ [0,1]`.

pub type Point2 = (f64, f64);

fn sub(a: Point2, b: Point2) -> Point2 {
    (a.0 - b.0, a.1 - b.1)
}

fn scale(p: Point2, s: f64) -> Point2 {
    (p.0 * s, p.1 * s)
}

fn add(a: Point2, b: Point2) -> Point2 {
    (a.0 + b.0, a.1 + b.1)
}

fn normalize(v: Point2) -> Point2 {
    let len = (v.0 * v.0 + v.1 * v.1).sqrt();
    if len < 1e-12 {
        (0.0, 0.0)
    } else {
        (v.0 / len, v.1 / len)
    }
}

/// A curve this module can sample: quadratic/cubic Bezier, or a 2D NURBS.
pub enum Curve2D {
    Quadratic([Point2; 3]),
    Cubic([Point2; 4]),
    Nurbs {
        control_points: Vec<Point2>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        order: usize,
    },
}

impl Curve2D {
    pub fn control_point_count(&self) -> usize {
        match self {
            Curve2D::Quadratic(_) => 3,
            Curve2D::Cubic(_) => 4,
            Curve2D::Nurbs { control_points, .. } => control_points.len(),
        }
    }

    /// Point and unit tangent at parameter `t`.
    pub fn eval(&self, t: f64) -> (Point2, Point2) {
        match self {
            Curve2D::Quadratic([p0, p1, p2]) => {
                let one_minus_t = 1.0 - t;
                let point = add(
                    add(scale(*p0, one_minus_t * one_minus_t), scale(*p1, 2.0 * one_minus_t * t)),
                    scale(*p2, t * t),
                );
                let tangent = add(scale(sub(*p1, *p0), 2.0 * one_minus_t), scale(sub(*p2, *p1), 2.0 * t));
                (point, normalize(tangent))
            }
            Curve2D::Cubic([p0, p1, p2, p3]) => {
                let u = 1.0 - t;
                let point = add(
                    add(scale(*p0, u * u * u), scale(*p1, 3.0 * u * u * t)),
                    add(scale(*p2, 3.0 * u * t * t), scale(*p3, t * t * t)),
                );
                let tangent = add(
                    add(scale(sub(*p1, *p0), 3.0 * u * u), scale(sub(*p2, *p1), 6.0 * u * t)),
                    scale(sub(*p3, *p2), 3.0 * t * t),
                );
                (point, normalize(tangent))
            }
            Curve2D::Nurbs { control_points, weights, knots, order } => {
                nurbs_eval(control_points, weights, knots, *order, t)
            }
        }
    }
}

/// Cox-de Boor basis function `N_{i,p}(u)`, evaluated recursively. Fine
/// for the small, low-degree curves this core fits biarcs to.
fn basis(i: usize, degree: usize, knots: &[f64], u: f64) -> f64 {
    if degree == 0 {
        return if knots[i] <= u && u < knots[i + 1] { 1.0 } else { 0.0 };
    }
    let mut left = 0.0;
    let denom_left = knots[i + degree] - knots[i];
    if denom_left.abs() > 1e-12 {
        left = (u - knots[i]) / denom_left * basis(i, degree - 1, knots, u);
    }
    let mut right = 0.0;
    let denom_right = knots[i + degree + 1] - knots[i + 1];
    if denom_right.abs() > 1e-12 {
        right = (knots[i + degree + 1] - u) / denom_right * basis(i + 1, degree - 1, knots, u);
    }
    left + right
}

fn nurbs_eval(
    control_points: &[Point2],
    weights: &[f64],
    knots: &[f64],
    order: usize,
    t: f64,
) -> (Point2, Point2) {
    let degree = order.saturating_sub(1);
    let domain_lo = knots[degree];
    let domain_hi = knots[knots.len() - 1 - degree];
    let u = domain_lo + t * (domain_hi - domain_lo);
    let u = u.min(domain_hi - 1e-9).max(domain_lo);

    let n = control_points.len();
    let eval_at = |u: f64| -> Point2 {
        let mut numerator = (0.0, 0.0);
        let mut denominator = 0.0;
        for i in 0..n {
            let b = basis(i, degree, knots, u) * weights[i];
            numerator = add(numerator, scale(control_points[i], b));
            denominator += b;
        }
        if denominator.abs() < 1e-12 {
            control_points[0]
        } else {
            scale(numerator, 1.0 / denominator)
        }
    };

    let point = eval_at(u);
    let h = (domain_hi - domain_lo) * 1e-4;
    let ahead = eval_at((u + h).min(domain_hi - 1e-9));
    let tangent = normalize(sub(ahead, point));
    (point, tangent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_endpoints_match_control_points() {
        let curve = Curve2D::Quadratic([(0.0, 0.0), (5.0, 10.0), (10.0, 0.0)]);
        let (p0, _) = curve.eval(0.0);
        let (p1, _) = curve.eval(1.0);
        assert_eq!(p0, (0.0, 0.0));
        assert_eq!(p1, (10.0, 0.0));
    }

    #[test]
    fn cubic_midpoint_is_interior() {
        let curve = Curve2D::Cubic([(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let (mid, tangent) = curve.eval(0.5);
        assert!(mid.0 > 0.0 && mid.0 < 10.0);
        assert!((tangent.0 * tangent.0 + tangent.1 * tangent.1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nurbs_linear_segment_interpolates() {
        let curve = Curve2D::Nurbs {
            control_points: vec![(0.0, 0.0), (10.0, 0.0)],
            weights: vec![1.0, 1.0],
            knots: vec![0.0, 0.0, 1.0, 1.0],
            order: 2,
        };
        let (mid, _) = curve.eval(0.5);
        assert!((mid.0 - 5.0).abs() < 1e-3);
    }
}
