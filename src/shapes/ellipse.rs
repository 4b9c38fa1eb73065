use glam::dvec2;

use super::Geometry;
use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::{EntitySink, emit_full_ellipse};
use crate::errors::ParseError;
use crate::segments::FlattenOptions;
use crate::types::{Point, ScaleFactors, Vector};

/// An ellipse shape
///
/// The radii are kept as vectors: `radius_x` is the image of the local x
/// half axis, `radius_y` the image of the local upward half axis. Which one
/// is major is decided when drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub center: Point,
    pub radius_x: Vector,
    pub radius_y: Vector,
}

impl EllipseShape {
    pub fn new(center: Point, radius_x: Vector, radius_y: Vector) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    /// Read an `<ellipse>`. A missing radius takes the other one's value.
    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        let cx = element.number_or_zero("cx")?;
        let cy = element.number_or_zero("cy")?;
        let (rx, ry) = match (element.number("rx")?, element.number("ry")?) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => {
                return Err(ParseError::MissingAttribute {
                    element: element.tag.clone(),
                    attribute: "rx",
                });
            }
        };
        let transform = element.transform()?;
        Ok(Self::new(
            cs.point(transform.apply_point(dvec2(cx, cy))),
            cs.vector(transform.apply_vector(dvec2(rx, 0.0))),
            cs.vector(transform.apply_vector(dvec2(0.0, -ry))),
        ))
    }
}

impl Geometry for EllipseShape {
    fn name(&self) -> &'static str {
        "ellipse"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        let s = dvec2(factors.x, factors.y);
        self.center *= s;
        self.radius_x *= s;
        self.radius_y *= s;
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        emit_full_ellipse(sink, self.center, self.radius_x, self.radius_y);
    }
}
