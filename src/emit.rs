//! Writing geometry out as DXF entities.
//!
//! Shapes talk to an [`EntitySink`], never to the `dxf` crate directly. Two
//! sinks exist: [`DxfDocument`], which builds a real drawing, and
//! `Vec<Entity>`, which records what was emitted.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use crate::defaults::{AXIS_PERPENDICULARITY, EPSILON};
use crate::errors::ConvertError;
use crate::geometry::{euclidean_norm, principal_axes, scalar_product};
use crate::log::warn;
use crate::types::{Point, Vector};

// ============================================================================
// Sink interface
// ============================================================================

/// Receiver of DXF primitives, all in Cartesian millimetres
pub trait EntitySink {
    fn add_circle(&mut self, center: Point, radius: f64);

    fn add_line(&mut self, start: Point, end: Point);

    /// Angles in degrees.
    fn add_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    );

    /// `major_axis` is relative to `center`; parameters in radians.
    fn add_ellipse(
        &mut self,
        center: Point,
        major_axis: Vector,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    );

    fn add_lwpolyline(&mut self, points: &[Point], closed: bool);
}

/// One recorded call on an [`EntitySink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Circle {
        center: Point,
        radius: f64,
    },
    Line {
        start: Point,
        end: Point,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    },
    Ellipse {
        center: Point,
        major_axis: Vector,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    },
    LwPolyline {
        points: Vec<Point>,
        closed: bool,
    },
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Circle { .. } => "CIRCLE",
            Entity::Line { .. } => "LINE",
            Entity::Arc { .. } => "ARC",
            Entity::Ellipse { .. } => "ELLIPSE",
            Entity::LwPolyline { .. } => "LWPOLYLINE",
        }
    }
}

impl EntitySink for Vec<Entity> {
    fn add_circle(&mut self, center: Point, radius: f64) {
        self.push(Entity::Circle { center, radius });
    }

    fn add_line(&mut self, start: Point, end: Point) {
        self.push(Entity::Line { start, end });
    }

    fn add_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    ) {
        self.push(Entity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            counter_clockwise,
        });
    }

    fn add_ellipse(
        &mut self,
        center: Point,
        major_axis: Vector,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    ) {
        self.push(Entity::Ellipse {
            center,
            major_axis,
            ratio,
            start_param,
            end_param,
        });
    }

    fn add_lwpolyline(&mut self, points: &[Point], closed: bool) {
        self.push(Entity::LwPolyline {
            points: points.to_vec(),
            closed,
        });
    }
}

// ============================================================================
// DXF drawing
// ============================================================================

/// A DXF drawing under construction
pub struct DxfDocument {
    drawing: dxf::Drawing,
    entities: usize,
}

impl Default for DxfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DxfDocument {
    /// An empty R2010 drawing (LWPOLYLINE and ELLIPSE need more than R12).
    pub fn new() -> Self {
        let mut drawing = dxf::Drawing::new();
        drawing.header.version = dxf::enums::AcadVersion::R2010;
        Self {
            drawing,
            entities: 0,
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities
    }

    pub fn drawing(&self) -> &dxf::Drawing {
        &self.drawing
    }

    fn push(&mut self, specific: dxf::entities::EntityType) {
        self.drawing.add_entity(dxf::entities::Entity::new(specific));
        self.entities += 1;
    }

    /// Write the drawing to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConvertError> {
        self.drawing.save_file(path).map_err(|source| ConvertError::Dxf {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn dxf_point(p: Point) -> dxf::Point {
    dxf::Point::new(p.x, p.y, 0.0)
}

/// Bring an ellipse parameter range into `[0, 2π)` with the end after the start.
///
/// A full turn stays `(0, 2π)`.
pub fn normalize_params(start: f64, end: f64) -> (f64, f64) {
    if ((end - start).abs() - TAU).abs() <= EPSILON * TAU {
        return (0.0, TAU);
    }
    let start = start.rem_euclid(TAU);
    let mut end = end.rem_euclid(TAU);
    if end <= start {
        end += TAU;
    }
    (start, end)
}

impl EntitySink for DxfDocument {
    fn add_circle(&mut self, center: Point, radius: f64) {
        let mut circle = dxf::entities::Circle::default();
        circle.center = dxf_point(center);
        circle.radius = radius;
        self.push(dxf::entities::EntityType::Circle(circle));
    }

    fn add_line(&mut self, start: Point, end: Point) {
        let mut line = dxf::entities::Line::default();
        line.p1 = dxf_point(start);
        line.p2 = dxf_point(end);
        self.push(dxf::entities::EntityType::Line(line));
    }

    fn add_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    ) {
        // DXF arcs always run counter-clockwise
        let (start_angle, end_angle) = if counter_clockwise {
            (start_angle, end_angle)
        } else {
            (end_angle, start_angle)
        };
        let mut arc = dxf::entities::Arc::default();
        arc.center = dxf_point(center);
        arc.radius = radius;
        arc.start_angle = start_angle;
        arc.end_angle = end_angle;
        self.push(dxf::entities::EntityType::Arc(arc));
    }

    fn add_ellipse(
        &mut self,
        center: Point,
        major_axis: Vector,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    ) {
        let (start_param, end_param) = normalize_params(start_param, end_param);
        let mut ellipse = dxf::entities::Ellipse::default();
        ellipse.center = dxf_point(center);
        ellipse.major_axis = dxf::Vector::new(major_axis.x, major_axis.y, 0.0);
        ellipse.minor_axis_ratio = ratio;
        ellipse.start_parameter = start_param;
        ellipse.end_parameter = end_param;
        self.push(dxf::entities::EntityType::Ellipse(ellipse));
    }

    fn add_lwpolyline(&mut self, points: &[Point], closed: bool) {
        let mut polyline = dxf::entities::LwPolyline::default();
        polyline.vertices = points
            .iter()
            .map(|p| dxf::LwPolylineVertex {
                x: p.x,
                y: p.y,
                ..Default::default()
            })
            .collect();
        polyline.set_is_closed(closed);
        self.push(dxf::entities::EntityType::LwPolyline(polyline));
    }
}

// ============================================================================
// Ellipses from radius vectors
// ============================================================================

/// An ellipse (or a piece of one) in DXF terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseArc {
    pub center: Point,
    pub major_axis: Vector,
    pub ratio: f64,
    pub start_param: f64,
    pub end_param: f64,
}

impl EllipseArc {
    /// The DXF form of `center + u·cos t + v·sin t` for `t` in `[start, end]`.
    ///
    /// The larger of `u`, `v` becomes the major axis; when `v` wins the
    /// parameters shift by -π/2. Radius vectors that are no longer
    /// perpendicular are first reduced to their principal axes. Returns
    /// `None` for a degenerate ellipse (zero axis).
    pub fn from_radii(center: Point, u: Vector, v: Vector, start: f64, end: f64) -> Option<Self> {
        let (mut v, mut start, mut end) = (v, start, end);
        if u.perp_dot(v) < 0.0 {
            // mirrored: t -> -t turns the pair counter-clockwise again
            v = -v;
            (start, end) = (-end, -start);
        }

        let (norm_u, norm_v) = (euclidean_norm(u), euclidean_norm(v));
        if norm_u == 0.0 || norm_v == 0.0 || !norm_u.is_finite() || !norm_v.is_finite() {
            return None;
        }

        if scalar_product(u, v).abs() <= AXIS_PERPENDICULARITY * norm_u * norm_v {
            return Some(if norm_u >= norm_v {
                Self {
                    center,
                    major_axis: u,
                    ratio: norm_v / norm_u,
                    start_param: start,
                    end_param: end,
                }
            } else {
                Self {
                    center,
                    major_axis: v,
                    ratio: norm_u / norm_v,
                    start_param: start - FRAC_PI_2,
                    end_param: end - FRAC_PI_2,
                }
            });
        }

        let (major, minor) = principal_axes(u, v)?;
        let (major_len, minor_len) = (euclidean_norm(major), euclidean_norm(minor));
        if minor_len == 0.0 {
            return None;
        }
        // phase of u on the principal parameterization
        let phase = (scalar_product(u, minor) / (minor_len * minor_len))
            .atan2(scalar_product(u, major) / (major_len * major_len));
        Some(Self {
            center,
            major_axis: major,
            ratio: minor_len / major_len,
            start_param: start + phase,
            end_param: end + phase,
        })
    }

    pub fn emit(&self, sink: &mut dyn EntitySink) {
        sink.add_ellipse(
            self.center,
            self.major_axis,
            self.ratio,
            self.start_param,
            self.end_param,
        );
    }
}

/// Emit a full ellipse from two radius vectors, warning when it is degenerate.
pub fn emit_full_ellipse(sink: &mut dyn EntitySink, center: Point, u: Vector, v: Vector) {
    match EllipseArc::from_radii(center, u, v, 0.0, TAU) {
        Some(ellipse) => ellipse.emit(sink),
        None => warn!(
            center = ?(center.x, center.y),
            radius_x = ?(u.x, u.y),
            radius_y = ?(v.x, v.y),
            "degenerate ellipse, not emitted"
        ),
    }
}
