//! Shape types for SVG to DXF conversion
//!
//! Each shape is its own type that knows how to:
//! - Build itself from an SVG element, transform and y flip applied once
//! - Rescale itself after construction
//! - Emit itself as DXF entities

use enum_dispatch::enum_dispatch;

use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::EntitySink;
use crate::errors::ParseError;
use crate::segments::FlattenOptions;
use crate::types::ScaleFactors;

mod circle;
mod ellipse;
mod line;
mod path;
mod poly;
mod rect;

pub use circle::CircleShape;
pub use ellipse::EllipseShape;
pub use line::LineShape;
pub use path::PathShape;
pub use poly::{PolygonShape, PolylineShape, parse_points};
pub use rect::{RectShape, ensure_applicable_radius};

/// Common behavior for all shapes
#[enum_dispatch]
pub trait Geometry {
    /// The SVG tag this shape came from
    fn name(&self) -> &'static str;

    /// Multiply every coordinate and vector component by the factors.
    fn scale(&mut self, factors: ScaleFactors);

    /// Write this shape as DXF entities
    fn emit(&self, sink: &mut dyn EntitySink, options: &FlattenOptions);
}

// ============================================================================
// Shape Enum
// ============================================================================

/// A shape enum wrapping all shape types
#[enum_dispatch(Geometry)]
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Line(LineShape),
    Rectangle(RectShape),
    Polygon(PolygonShape),
    Polyline(PolylineShape),
    Path(PathShape),
}

impl Shape {
    /// Build the shape for an element, `None` for tags that are not shapes.
    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Option<Self>, ParseError> {
        let shape = match element.tag.as_str() {
            "circle" => CircleShape::from_element(element, cs)?,
            "ellipse" => EllipseShape::from_element(element, cs)?.into(),
            "line" => LineShape::from_element(element, cs)?.into(),
            "rect" => RectShape::from_element(element, cs)?.into(),
            "polygon" => PolygonShape::from_element(element, cs)?.into(),
            "polyline" => PolylineShape::from_element(element, cs)?.into(),
            "path" => PathShape::from_element(element, cs)?.into(),
            _ => return Ok(None),
        };
        Ok(Some(shape))
    }
}
