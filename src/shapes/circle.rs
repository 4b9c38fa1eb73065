use glam::dvec2;

use super::{EllipseShape, Geometry, Shape};
use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::{EntitySink, emit_full_ellipse};
use crate::errors::ParseError;
use crate::geometry::euclidean_norm;
use crate::log::{debug, warn};
use crate::segments::FlattenOptions;
use crate::types::{Point, ScaleFactors};

/// A circle shape
///
/// `radius_y` stays 0 for a true circle. An anisotropic rescale sets it,
/// after which the shape is drawn as an axis-aligned ellipse with radii
/// `radius` and `radius_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleShape {
    pub center: Point,
    pub radius: f64,
    pub radius_y: f64,
}

impl CircleShape {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            radius_y: 0.0,
        }
    }

    /// Read a `<circle>`. A transform that does not keep circles round
    /// yields an ellipse instead.
    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Shape, ParseError> {
        let cx = element.number_or_zero("cx")?;
        let cy = element.number_or_zero("cy")?;
        let r = element.required("r")?;
        if r < 0.0 {
            return Err(ParseError::InvalidNumber {
                attribute: "r".to_string(),
                value: r.to_string(),
            });
        }
        let transform = element.transform()?;
        let center = cs.point(transform.apply_point(dvec2(cx, cy)));

        if !transform.is_similarity() {
            debug!(cx, cy, r, "circle under a non-similarity transform becomes an ellipse");
            return Ok(EllipseShape::new(
                center,
                cs.vector(transform.apply_vector(dvec2(r, 0.0))),
                cs.vector(transform.apply_vector(dvec2(0.0, -r))),
            )
            .into());
        }

        let radius = euclidean_norm(transform.apply_vector(dvec2(r, 0.0)));
        Ok(Self::new(center, radius).into())
    }
}

impl Geometry for CircleShape {
    fn name(&self) -> &'static str {
        "circle"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        self.center *= dvec2(factors.x, factors.y);
        if self.radius_y == 0.0 && factors.is_uniform() {
            self.radius *= factors.x;
        } else {
            let radius_y = if self.radius_y == 0.0 { self.radius } else { self.radius_y };
            self.radius *= factors.x;
            self.radius_y = radius_y * factors.y;
        }
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        if self.radius_y != 0.0 {
            emit_full_ellipse(
                sink,
                self.center,
                dvec2(self.radius, 0.0),
                dvec2(0.0, self.radius_y),
            );
        } else if self.radius > 0.0 {
            sink.add_circle(self.center, self.radius);
        } else {
            warn!(center = ?(self.center.x, self.center.y), "circle with zero radius, not emitted");
        }
    }
}
