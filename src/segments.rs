//! Path segments in drawing space and their conversion to DXF primitives.
//!
//! Lines map straight through. Bézier curves become open polylines within a
//! distance tolerance. Arcs are split into circular arcs (equal radii) and
//! elliptical arcs.

use glam::{DMat2, DVec2, dvec2};

use crate::coords::CoordinateSystem;
use crate::defaults::{FLATTEN_MAX_SEGMENTS, FLATTEN_MIN_SEGMENTS, FLATTEN_TOLERANCE};
use crate::emit::{EllipseArc, EntitySink};
use crate::errors::ConvertError;
use crate::geometry::{
    ArcCenter, arc_center_parameters, euclidean_norm, nearly_equal, rotate_about_point, transform_ellipse,
};
use crate::log::{debug, warn};
use crate::path_data::RawSegment;
use crate::transform::Transform;
use crate::types::{Point, ScaleFactors, positive};

// ============================================================================
// Bézier flattening
// ============================================================================

/// How closely polylines follow Bézier curves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Maximal distance between curve and polyline
    pub tolerance: f64,
    /// Fewest segments a curve is split into
    pub min_segments: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            tolerance: FLATTEN_TOLERANCE,
            min_segments: FLATTEN_MIN_SEGMENTS,
        }
    }
}

impl FlattenOptions {
    pub fn try_new(tolerance: f64, min_segments: usize) -> Result<Self, ConvertError> {
        let tolerance = positive(tolerance).map_err(|_| ConvertError::InvalidTolerance { value: tolerance })?;
        Ok(Self {
            tolerance,
            min_segments: min_segments.clamp(1, FLATTEN_MAX_SEGMENTS),
        })
    }

    /// Segments needed for a curve whose second derivative is bounded by `bound`.
    ///
    /// Chord deviation of a uniform split into `n` pieces is at most
    /// `bound / (8 n²)`.
    fn segment_count(&self, bound: f64) -> usize {
        let n = (bound / (8.0 * self.tolerance)).sqrt().ceil();
        if n.is_finite() {
            (n as usize).clamp(self.min_segments, FLATTEN_MAX_SEGMENTS)
        } else {
            FLATTEN_MAX_SEGMENTS
        }
    }
}

fn sample(count: usize, curve: impl Fn(f64) -> Point) -> Vec<Point> {
    (0..=count).map(|i| curve(i as f64 / count as f64)).collect()
}

/// Polyline through a quadratic Bézier, endpoints included.
pub fn flatten_quadratic(p0: Point, p1: Point, p2: Point, options: &FlattenOptions) -> Vec<Point> {
    let bound = 2.0 * euclidean_norm(p0 - 2.0 * p1 + p2);
    let count = options.segment_count(bound);
    let mut points = sample(count, |t| {
        let mt = 1.0 - t;
        p0 * (mt * mt) + p1 * (2.0 * mt * t) + p2 * (t * t)
    });
    // exact endpoints, whatever rounding did
    points[0] = p0;
    points[count] = p2;
    points
}

/// Polyline through a cubic Bézier, endpoints included.
pub fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, options: &FlattenOptions) -> Vec<Point> {
    let bound = 6.0 * euclidean_norm(p0 - 2.0 * p1 + p2).max(euclidean_norm(p1 - 2.0 * p2 + p3));
    let count = options.segment_count(bound);
    let mut points = sample(count, |t| {
        let mt = 1.0 - t;
        p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
    });
    points[0] = p0;
    points[count] = p3;
    points
}

// ============================================================================
// Arc conversion
// ============================================================================

/// A DXF arc: angles in degrees, direction explicit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counter_clockwise: bool,
}

impl CircularArc {
    /// The arc from `start` to `end` around `center`.
    ///
    /// A set sweep flag means clockwise as drawn.
    pub fn new(center: Point, radius: f64, start: Point, end: Point, sweep: bool) -> Self {
        let angle = |p: Point| (p.y - center.y).atan2(p.x - center.x).to_degrees();
        Self {
            center,
            radius,
            start_angle: angle(start),
            end_angle: angle(end),
            counter_clockwise: !sweep,
        }
    }

    pub fn emit(&self, sink: &mut dyn EntitySink) {
        sink.add_arc(
            self.center,
            self.radius,
            self.start_angle,
            self.end_angle,
            self.counter_clockwise,
        );
    }
}

/// A DXF ellipse for an elliptical arc in center form.
///
/// `theta` and `delta` are the SVG start angle and sweep in degrees; the
/// y flip negates them. Returns `None` for a zero radius.
pub fn elliptical_arc(
    center: Point,
    radii: DVec2,
    rotation: f64,
    theta: f64,
    delta: f64,
    sweep: bool,
) -> Option<EllipseArc> {
    let mut start = -theta.to_radians();
    let mut end = -(theta + delta).to_radians();
    if sweep {
        std::mem::swap(&mut start, &mut end);
    }
    let (ux, uy) = rotate_about_point(radii.x, 0.0, rotation, 0.0, 0.0);
    let (vx, vy) = rotate_about_point(0.0, radii.y, rotation, 0.0, 0.0);
    EllipseArc::from_radii(center, dvec2(ux, uy), dvec2(vx, vy), start, end)
}

// ============================================================================
// Segments
// ============================================================================

/// An SVG arc carried in drawing space
///
/// End points are Cartesian. Radii, rotation and flags keep their SVG
/// meaning, which is what the same arc looks like in the frame `(x, -y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub start: Point,
    pub end: Point,
    pub radii: DVec2,
    /// x-axis rotation in degrees
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

fn mirror(p: Point) -> Point {
    dvec2(p.x, -p.y)
}

impl ArcSegment {
    /// Center form of the arc, with a Cartesian center.
    pub fn center_parameters(&self) -> Option<ArcCenter> {
        let mut arc = arc_center_parameters(
            mirror(self.start),
            mirror(self.end),
            self.radii,
            self.rotation,
            self.large_arc,
            self.sweep,
        )?;
        arc.center = mirror(arc.center);
        Some(arc)
    }

    /// Push the ellipse through a linear map given in the `(x, -y)` frame.
    fn map_ellipse(&mut self, linear: DMat2) -> bool {
        match transform_ellipse(linear, self.radii, self.rotation) {
            Some(ellipse) => {
                self.radii = ellipse.radii;
                self.rotation = ellipse.rotation;
                self.sweep ^= ellipse.mirrored;
                true
            }
            None => false,
        }
    }

    fn emit(&self, sink: &mut dyn EntitySink) {
        let Some(arc) = self.center_parameters() else {
            warn!(
                start = ?(self.start.x, self.start.y),
                end = ?(self.end.x, self.end.y),
                "arc has no center, drawing a line"
            );
            sink.add_line(self.start, self.end);
            return;
        };

        if nearly_equal(arc.radii.x, arc.radii.y) {
            CircularArc::new(arc.center, arc.radii.x, self.start, self.end, self.sweep).emit(sink);
            return;
        }

        match elliptical_arc(arc.center, arc.radii, self.rotation, arc.theta, arc.delta, self.sweep) {
            Some(ellipse) => ellipse.emit(sink),
            None => warn!(radii = ?(arc.radii.x, arc.radii.y), "degenerate elliptical arc, not emitted"),
        }
    }
}

/// A path segment in drawing space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
    Arc(ArcSegment),
}

impl PathSegment {
    /// Apply the element transform and move into Cartesian coordinates.
    pub fn from_raw(raw: RawSegment, transform: &Transform, cs: &CoordinateSystem) -> Self {
        let place = |p: Point| cs.point(transform.apply_point(p));
        match raw {
            RawSegment::Line { start, end } => PathSegment::Line {
                start: place(start),
                end: place(end),
            },
            RawSegment::Quadratic { start, control, end } => PathSegment::Quadratic {
                start: place(start),
                control: place(control),
                end: place(end),
            },
            RawSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => PathSegment::Cubic {
                start: place(start),
                control1: place(control1),
                control2: place(control2),
                end: place(end),
            },
            RawSegment::Arc {
                start,
                end,
                radii,
                rotation,
                large_arc,
                sweep,
            } => {
                let mut arc = ArcSegment {
                    start: place(start),
                    end: place(end),
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                };
                if !transform.is_empty() && !arc.map_ellipse(transform.linear()) {
                    return PathSegment::Line {
                        start: arc.start,
                        end: arc.end,
                    };
                }
                PathSegment::Arc(arc)
            }
        }
    }

    pub fn scale(&mut self, factors: ScaleFactors) {
        let s = dvec2(factors.x, factors.y);
        match self {
            PathSegment::Line { start, end } => {
                *start *= s;
                *end *= s;
            }
            PathSegment::Quadratic { start, control, end } => {
                *start *= s;
                *control *= s;
                *end *= s;
            }
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => {
                *start *= s;
                *control1 *= s;
                *control2 *= s;
                *end *= s;
            }
            PathSegment::Arc(arc) => {
                arc.start *= s;
                arc.end *= s;
                if factors.is_uniform() {
                    arc.radii *= factors.x;
                } else {
                    // positive factors: the map never mirrors and never collapses
                    arc.map_ellipse(DMat2::from_diagonal(s));
                }
            }
        }
    }

    pub fn emit(&self, sink: &mut dyn EntitySink, options: &FlattenOptions) {
        match *self {
            PathSegment::Line { start, end } => sink.add_line(start, end),
            PathSegment::Quadratic { start, control, end } => {
                let points = flatten_quadratic(start, control, end, options);
                debug!(points = points.len(), "flattened quadratic curve");
                sink.add_lwpolyline(&points, false);
            }
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => {
                let points = flatten_cubic(start, control1, control2, end, options);
                debug!(points = points.len(), "flattened cubic curve");
                sink.add_lwpolyline(&points, false);
            }
            PathSegment::Arc(ref arc) => arc.emit(sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Entity;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn bezier_distance(points: &[Point], curve: impl Fn(f64) -> Point) -> f64 {
        // sample the curve densely, measure distance to the nearest polyline segment
        (0..=1000)
            .map(|i| {
                let p = curve(i as f64 / 1000.0);
                points
                    .windows(2)
                    .map(|w| {
                        let (a, b) = (w[0], w[1]);
                        let ab = b - a;
                        let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
                        (a + ab * t - p).length()
                    })
                    .fold(f64::INFINITY, f64::min)
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn straight_curves_use_the_minimum() {
        let options = FlattenOptions::default();
        let points = flatten_quadratic(DVec2::ZERO, dvec2(5.0, 0.0), dvec2(10.0, 0.0), &options);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], DVec2::ZERO);
        assert_eq!(points[3], dvec2(10.0, 0.0));
    }

    #[test]
    fn flattening_respects_tolerance() {
        let options = FlattenOptions::try_new(0.05, 3).unwrap();
        let (p0, p1, p2, p3) = (dvec2(50.0, 250.0), dvec2(200.0, 150.0), dvec2(300.0, 150.0), dvec2(350.0, 50.0));
        let points = flatten_cubic(p0, p1, p2, p3, &options);
        assert!(points.len() > 4);
        let deviation = bezier_distance(&points, |t| {
            let mt = 1.0 - t;
            p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
        });
        assert!(deviation <= 0.05, "deviation {deviation}");

        let points = flatten_quadratic(p0, p1, p3, &options);
        let deviation = bezier_distance(&points, |t| {
            let mt = 1.0 - t;
            p0 * (mt * mt) + p1 * (2.0 * mt * t) + p3 * (t * t)
        });
        assert!(deviation <= 0.05, "deviation {deviation}");
    }

    #[test]
    fn tolerance_must_be_positive() {
        assert!(matches!(
            FlattenOptions::try_new(0.0, 3),
            Err(ConvertError::InvalidTolerance { .. })
        ));
        assert!(FlattenOptions::try_new(f64::NAN, 3).is_err());
    }

    #[test]
    fn circular_arc_angles() {
        let s = FRAC_1_SQRT_2;
        let cases = [
            ((1.0, 0.0), (-1.0, 0.0), false, 0.0, 180.0),
            ((s, s), (-s, -s), false, 45.0, -135.0),
            ((s, -s), (-s, s), true, -45.0, 135.0),
            ((s, s), (-s, s), false, 45.0, 135.0),
            ((-s, -s), (s, -s), true, -135.0, -45.0),
            ((s, s), (s, -s), true, 45.0, -45.0),
            ((-s, s), (-s, -s), false, 135.0, -135.0),
        ];
        for ((sx, sy), (ex, ey), sweep, start, end) in cases {
            let arc = CircularArc::new(DVec2::ZERO, 1.0, dvec2(sx, sy), dvec2(ex, ey), sweep);
            assert_close(arc.start_angle, start, 1e-9);
            assert_close(arc.end_angle, end, 1e-9);
            assert_eq!(arc.counter_clockwise, !sweep);
        }
    }

    #[test]
    fn elliptical_arc_axis_aligned() {
        let radii = dvec2(90.0, 120.0);
        let (theta, delta) = (170.8528607762027, -87.965926260717367);

        let e = elliptical_arc(DVec2::ZERO, radii, 0.0, theta, delta, false).unwrap();
        assert_eq!(e.major_axis, dvec2(0.0, 120.0));
        assert_close(e.ratio, 0.75, 1e-12);
        assert_close(e.start_param, -4.552741283791109, 1e-9);
        assert_close(e.end_param, -3.0174462409750467, 1e-9);

        let e = elliptical_arc(DVec2::ZERO, radii, 0.0, theta, delta, true).unwrap();
        assert_close(e.start_param, -3.0174462409750467, 1e-9);
        assert_close(e.end_param, -4.552741283791109, 1e-9);
    }

    #[test]
    fn elliptical_arc_rotated() {
        let e = elliptical_arc(
            DVec2::ZERO,
            dvec2(90.0, 120.0),
            45.0,
            141.7830767038384,
            -103.5661534076767,
            false,
        )
        .unwrap();
        assert_close(e.major_axis.x, 84.85281, 1e-5);
        assert_close(e.major_axis.y, 84.85281, 1e-5);
        assert_close(e.start_param, -4.045377838884546, 1e-9);
        assert_close(e.end_param, -2.237807468295042, 1e-9);

        let e = elliptical_arc(
            DVec2::ZERO,
            dvec2(90.0, 120.0),
            136.0,
            34.775926232869779,
            -72.218308575467063,
            true,
        )
        .unwrap();
        assert_close(e.major_axis.x, 83.35900, 1e-5);
        assert_close(e.major_axis.y, -86.32078, 1e-5);
        assert_close(e.start_param, -0.9173034751259864, 1e-9);
        assert_close(e.end_param, -2.1777507399891425, 1e-9);

        let e = elliptical_arc(
            DVec2::ZERO,
            dvec2(145.0, 78.0),
            154.0,
            -49.231602624334684,
            -82.137486587315081,
            true,
        )
        .unwrap();
        assert_close(e.major_axis.x, -130.32514, 1e-5);
        assert_close(e.major_axis.y, -63.56382, 1e-5);
        assert_close(e.ratio, 0.5379310344827586, 1e-6);
        assert_close(e.start_param, 2.2928231420894503, 1e-9);
        assert_close(e.end_param, 0.8592535618281213, 1e-9);
    }

    #[test]
    fn half_circle_arc_in_drawing_space() {
        let cs = CoordinateSystem::new(1000.0);
        let raw = RawSegment::Arc {
            start: dvec2(500.0, 100.0),
            end: dvec2(600.0, 100.0),
            radii: dvec2(50.0, 50.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
        };
        let segment = PathSegment::from_raw(raw, &Transform::identity(), &cs);
        let PathSegment::Arc(arc) = segment else {
            panic!("expected an arc, got {segment:?}");
        };
        let center = arc.center_parameters().unwrap().center;
        assert_close(center.x, 550.0, 1e-9);
        assert_close(center.y, 900.0, 1e-9);

        let mut sink: Vec<Entity> = Vec::new();
        segment.emit(&mut sink, &FlattenOptions::default());
        let [Entity::Arc { start_angle, end_angle, counter_clockwise, .. }] = sink.as_slice() else {
            panic!("expected one arc, got {sink:?}");
        };
        // clockwise over the top, from the left end to the right end
        assert_close(*start_angle, 180.0, 1e-9);
        assert_close(end_angle.abs(), 0.0, 1e-9);
        assert!(!counter_clockwise);
    }

    #[test]
    fn skewed_arc_radii() {
        let cs = CoordinateSystem::new(500.0);
        let transform = Transform::parse(Some("skewX(24)")).unwrap();
        let raw = RawSegment::Arc {
            start: dvec2(0.0, 0.0),
            end: dvec2(100.0, 0.0),
            radii: dvec2(50.0, 50.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
        };
        let PathSegment::Arc(arc) = PathSegment::from_raw(raw, &transform, &cs) else {
            panic!("expected an arc");
        };
        assert_close(arc.radii.x, 62.3547, 1e-4);
        assert_close(arc.radii.y, 40.0932, 1e-4);
    }

    #[test]
    fn mirroring_transform_flips_sweep() {
        let cs = CoordinateSystem::new(100.0);
        let transform = Transform::parse(Some("scale(-1, 1)")).unwrap();
        let raw = RawSegment::Arc {
            start: dvec2(0.0, 0.0),
            end: dvec2(10.0, 0.0),
            radii: dvec2(5.0, 5.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
        };
        let PathSegment::Arc(arc) = PathSegment::from_raw(raw, &transform, &cs) else {
            panic!("expected an arc");
        };
        assert!(!arc.sweep);
        assert_eq!(arc.end, dvec2(-10.0, 100.0));
    }

    #[test]
    fn anisotropic_scale_stretches_arcs() {
        let mut segment = PathSegment::Arc(ArcSegment {
            start: dvec2(0.0, 0.0),
            end: dvec2(20.0, 0.0),
            radii: dvec2(10.0, 10.0),
            rotation: 0.0,
            large_arc: false,
            sweep: false,
        });
        segment.scale(ScaleFactors::try_new(2.0, 0.5).unwrap());
        let PathSegment::Arc(arc) = segment else {
            panic!("expected an arc");
        };
        assert_eq!(arc.end, dvec2(40.0, 0.0));
        assert_close(arc.radii.x, 20.0, 1e-9);
        assert_close(arc.radii.y, 5.0, 1e-9);

        let mut sink: Vec<Entity> = Vec::new();
        segment.emit(&mut sink, &FlattenOptions::default());
        assert!(matches!(sink.as_slice(), [Entity::Ellipse { .. }]));
    }
}
