//! Affine geometry primitives and the ellipse math built on them.
//!
//! Angles in the public primitives are degrees, as in SVG attributes.
//! `rotate_about_point` turns clockwise in a y-up frame and rounds its result
//! to five decimals; the transform pipeline relies on both properties.

use glam::{DMat2, DVec2, dvec2};

use crate::defaults::{EPSILON, ROTATION_DECIMALS};
use crate::types::{Point, Vector};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // keep -0.0 out of results
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn translate(coord: f64, delta: f64) -> f64 {
    coord + delta
}

pub fn scale(coord: f64, factor: f64) -> f64 {
    coord * factor
}

/// Rotate `(x, y)` about `(cx, cy)` by `angle_deg`, clockwise with y pointing up.
pub fn rotate_about_point(x: f64, y: f64, angle_deg: f64, cx: f64, cy: f64) -> (f64, f64) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (
        round_to(cx + dx * cos + dy * sin, ROTATION_DECIMALS),
        round_to(cy - dx * sin + dy * cos, ROTATION_DECIMALS),
    )
}

pub fn skew_x(x: f64, y: f64, angle_deg: f64) -> f64 {
    x + y * angle_deg.to_radians().tan()
}

pub fn skew_y(x: f64, y: f64, angle_deg: f64) -> f64 {
    y + x * angle_deg.to_radians().tan()
}

/// Apply an SVG `matrix(a b c d e f)`.
pub fn matrix_transform(x: f64, y: f64, m: &[f64; 6]) -> (f64, f64) {
    let [a, b, c, d, e, f] = *m;
    (a * x + c * y + e, b * x + d * y + f)
}

pub fn euclidean_norm(v: Vector) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

pub fn scalar_product(a: Vector, b: Vector) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Unsigned angle between two vectors in radians, `None` for zero vectors.
pub fn angle_between_vectors(a: Vector, b: Vector) -> Option<f64> {
    let norms = euclidean_norm(a) * euclidean_norm(b);
    if norms == 0.0 || !norms.is_finite() {
        return None;
    }
    // clamp: rounding can push the cosine just past +-1
    Some((scalar_product(a, b) / norms).clamp(-1.0, 1.0).acos())
}

/// Angle from `a` to `b` in radians, positive when turning from +x towards +y.
pub fn signed_angle_between_vectors(a: Vector, b: Vector) -> Option<f64> {
    let angle = angle_between_vectors(a, b)?;
    Some(if a.perp_dot(b) < 0.0 { -angle } else { angle })
}

/// Whether two lengths agree up to the relative tolerance.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Whether two vectors are perpendicular up to the relative tolerance.
pub fn is_perpendicular(a: Vector, b: Vector) -> bool {
    scalar_product(a, b).abs() <= EPSILON * euclidean_norm(a) * euclidean_norm(b).max(1.0)
}

/// Principal semi-axes of the ellipse spanned by two conjugate semi-diameters.
///
/// The ellipse is `{u·cos t + v·sin t}`. Returns `(major, minor)` as
/// perpendicular vectors, `minor` a quarter turn counter-clockwise of
/// `major`, or `None` when both inputs are zero.
pub fn principal_axes(u: Vector, v: Vector) -> Option<(Vector, Vector)> {
    // eigen-decomposition of M·Mᵀ with M = [u v]
    let a = u.x * u.x + v.x * v.x;
    let b = u.x * u.y + v.x * v.y;
    let c = u.y * u.y + v.y * v.y;

    let mean = (a + c) / 2.0;
    let spread = (((a - c) / 2.0).powi(2) + b * b).sqrt();
    let major_sq = mean + spread;
    let minor_sq = (mean - spread).max(0.0);
    if major_sq <= 0.0 || !major_sq.is_finite() {
        return None;
    }

    let angle = 0.5 * (2.0 * b).atan2(a - c);
    let dir = dvec2(angle.cos(), angle.sin());
    Some((dir * major_sq.sqrt(), dir.perp() * minor_sq.sqrt()))
}

/// An ellipse described the way SVG arcs describe it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcEllipse {
    pub radii: DVec2,
    /// x-axis rotation in degrees, SVG orientation
    pub rotation: f64,
    /// Whether the mapping that produced this ellipse mirrored the plane
    pub mirrored: bool,
}

/// Push an SVG arc ellipse through a linear map.
///
/// The result is the principal-axis form of `linear · R(rotation) ·
/// diag(rx, ry)` with `rx` on the major axis.
pub fn transform_ellipse(linear: DMat2, radii: DVec2, rotation: f64) -> Option<ArcEllipse> {
    let (sin, cos) = rotation.to_radians().sin_cos();
    let u = linear * (dvec2(cos, sin) * radii.x);
    let v = linear * (dvec2(-sin, cos) * radii.y);
    let (major, minor) = principal_axes(u, v)?;
    Some(ArcEllipse {
        radii: dvec2(euclidean_norm(major), euclidean_norm(minor)),
        rotation: major.y.atan2(major.x).to_degrees(),
        mirrored: linear.determinant() < 0.0,
    })
}

/// Center form of an SVG elliptical arc, in the y-down frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCenter {
    pub center: Point,
    /// Radii after out-of-range correction
    pub radii: DVec2,
    /// Start angle in degrees
    pub theta: f64,
    /// Signed sweep in degrees, positive means clockwise on screen
    pub delta: f64,
}

/// Endpoint to center parameterization of an SVG arc (SVG 1.1, F.6.5).
///
/// Returns `None` when the endpoints coincide or a radius is zero; SVG draws
/// nothing and a straight line respectively in those cases.
pub fn arc_center_parameters(
    start: Point,
    end: Point,
    radii: DVec2,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
) -> Option<ArcCenter> {
    if start == end {
        return None;
    }
    let mut rx = radii.x.abs();
    let mut ry = radii.y.abs();
    if rx == 0.0 || ry == 0.0 {
        return None;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let half = (start - end) / 2.0;
    let x1 = cos * half.x + sin * half.y;
    let y1 = -sin * half.x + cos * half.y;

    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let grow = lambda.sqrt();
        rx *= grow;
        ry *= grow;
    }

    let numerator = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
    let denominator = rx * rx * y1 * y1 + ry * ry * x1 * x1;
    let mut coef = (numerator / denominator).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cx1 = coef * rx * y1 / ry;
    let cy1 = -coef * ry * x1 / rx;

    let mid = (start + end) / 2.0;
    let center = dvec2(cos * cx1 - sin * cy1 + mid.x, sin * cx1 + cos * cy1 + mid.y);

    let u = dvec2((x1 - cx1) / rx, (y1 - cy1) / ry);
    let v = dvec2((-x1 - cx1) / rx, (-y1 - cy1) / ry);
    let theta = signed_angle_between_vectors(DVec2::X, u)?.to_degrees();
    let mut delta = signed_angle_between_vectors(u, v)?.to_degrees();
    if !sweep && delta > 0.0 {
        delta -= 360.0;
    } else if sweep && delta < 0.0 {
        delta += 360.0;
    }

    Some(ArcCenter {
        center,
        radii: dvec2(rx, ry),
        theta,
        delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rotation_turns_clockwise_with_y_up() {
        assert_eq!(rotate_about_point(1.0, 0.0, 90.0, 0.0, 0.0), (0.0, -1.0));
        assert_eq!(rotate_about_point(1.0, 0.0, -90.0, 0.0, 0.0), (0.0, 1.0));
        assert_eq!(rotate_about_point(0.3, 0.25, 22.0, 0.0, 0.0), (0.37181, 0.11941));
    }

    #[test]
    fn rotation_by_zero_is_identity() {
        for &(x, y, cx, cy) in &[(1.0, 2.0, 0.0, 0.0), (-3.5, 7.25, 10.0, -4.0), (0.0, 0.0, 5.0, 5.0)] {
            assert_eq!(rotate_about_point(x, y, 0.0, cx, cy), (x, y));
        }
    }

    #[test]
    fn rotations_compose() {
        let (cx, cy) = (12.0, -7.0);
        for &(a, b) in &[(30.0, 45.0), (-120.0, 75.5), (200.0, 250.0), (13.7, -13.7)] {
            let (x1, y1) = rotate_about_point(40.0, 25.0, a, cx, cy);
            let (x2, y2) = rotate_about_point(x1, y1, b, cx, cy);
            let (x3, y3) = rotate_about_point(40.0, 25.0, (a + b) % 360.0, cx, cy);
            assert_close(x2, x3, 1e-4);
            assert_close(y2, y3, 1e-4);
        }
    }

    #[test]
    fn skews_and_matrix() {
        assert_close(skew_x(2.0, 2.0, 34.0), 3.34902, 1e-5);
        assert_close(skew_y(2.0, 2.0, -26.0), 1.02453, 1e-5);
        assert_eq!(skew_x(5.0, 0.0, 45.0), 5.0);
        assert_eq!(matrix_transform(10.0, 10.0, &[3.0, 1.0, -1.0, 3.0, 30.0, 40.0]), (50.0, 80.0));
        assert_eq!(matrix_transform(4.0, -2.0, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]), (4.0, -2.0));
        assert_eq!(translate(3.0, -5.0), -2.0);
        assert_eq!(scale(3.0, -5.0), -15.0);
    }

    #[test]
    fn norms_and_products() {
        assert_eq!(euclidean_norm(dvec2(3.0, 4.0)), 5.0);
        assert_eq!(euclidean_norm(dvec2(-3.0, -4.0)), 5.0);
        assert_eq!(euclidean_norm(DVec2::ZERO), 0.0);
        assert_eq!(scalar_product(dvec2(2.0, 8.0), dvec2(-3.0, 4.0)), 26.0);
        assert_eq!(scalar_product(dvec2(2.0, -8.0), dvec2(-3.0, 4.0)), -38.0);
    }

    #[test]
    fn angles_between_vectors() {
        let diagonal = dvec2(2f64.sqrt() / 2.0, 2f64.sqrt() / 2.0);
        assert_close(angle_between_vectors(DVec2::X, diagonal).unwrap(), FRAC_PI_4, 1e-12);
        assert_close(angle_between_vectors(DVec2::X, -DVec2::X).unwrap(), PI, 1e-12);
        assert_eq!(angle_between_vectors(DVec2::X, DVec2::ZERO), None);
        assert_close(signed_angle_between_vectors(DVec2::X, -DVec2::Y).unwrap(), -PI / 2.0, 1e-12);
    }

    #[test]
    fn principal_axes_of_perpendicular_radii() {
        let (major, minor) = principal_axes(dvec2(10.0, 0.0), dvec2(0.0, 5.0)).unwrap();
        assert_close(major.x.abs(), 10.0, 1e-9);
        assert_close(major.y, 0.0, 1e-9);
        assert_close(euclidean_norm(minor), 5.0, 1e-9);

        let (major, _) = principal_axes(dvec2(5.0, 0.0), dvec2(0.0, 10.0)).unwrap();
        assert_close(major.x, 0.0, 1e-9);
        assert_close(major.y.abs(), 10.0, 1e-9);

        assert_eq!(principal_axes(DVec2::ZERO, DVec2::ZERO), None);
    }

    #[test]
    fn skewed_circle_becomes_ellipse() {
        let skew = DMat2::from_cols(dvec2(1.0, 0.0), dvec2(24f64.to_radians().tan(), 1.0));
        let ellipse = transform_ellipse(skew, dvec2(50.0, 50.0), 0.0).unwrap();
        assert_close(ellipse.radii.x, 62.3547, 1e-4);
        assert_close(ellipse.radii.y, 40.0932, 1e-4);
        assert!(!ellipse.mirrored);

        let mirror = DMat2::from_cols(dvec2(1.0, 0.0), dvec2(0.0, -1.0));
        assert!(transform_ellipse(mirror, dvec2(5.0, 2.0), 30.0).unwrap().mirrored);
    }

    #[test]
    fn half_circle_arc_center() {
        // A50 50 0 0 1 600 100 from (500, 100)
        let arc = arc_center_parameters(
            dvec2(500.0, 100.0),
            dvec2(600.0, 100.0),
            dvec2(50.0, 50.0),
            0.0,
            false,
            true,
        )
        .unwrap();
        assert_close(arc.center.x, 550.0, 1e-9);
        assert_close(arc.center.y, 100.0, 1e-9);
        assert_close(arc.theta.abs(), 180.0, 1e-9);
        assert_close(arc.delta, 180.0, 1e-9);
    }

    #[test]
    fn undersized_radii_are_scaled_up() {
        let arc = arc_center_parameters(
            dvec2(0.0, 0.0),
            dvec2(100.0, 0.0),
            dvec2(10.0, 10.0),
            0.0,
            false,
            false,
        )
        .unwrap();
        assert_close(arc.radii.x, 50.0, 1e-9);
        assert_close(arc.center.x, 50.0, 1e-9);
        assert_close(arc.delta, -180.0, 1e-9);
    }

    #[test]
    fn degenerate_arcs_have_no_center() {
        let p = dvec2(3.0, 4.0);
        assert_eq!(arc_center_parameters(p, p, dvec2(1.0, 1.0), 0.0, false, false), None);
        assert_eq!(
            arc_center_parameters(p, DVec2::ZERO, dvec2(0.0, 1.0), 0.0, false, false),
            None
        );
    }
}
