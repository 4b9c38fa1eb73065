use glam::dvec2;

use super::Geometry;
use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::EntitySink;
use crate::errors::ParseError;
use crate::segments::FlattenOptions;
use crate::types::{Point, ScaleFactors};

/// A straight line shape
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub start: Point,
    pub end: Point,
}

impl LineShape {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        let start = dvec2(element.number_or_zero("x1")?, element.number_or_zero("y1")?);
        let end = dvec2(element.number_or_zero("x2")?, element.number_or_zero("y2")?);
        let transform = element.transform()?;
        Ok(Self::new(
            cs.point(transform.apply_point(start)),
            cs.point(transform.apply_point(end)),
        ))
    }
}

impl Geometry for LineShape {
    fn name(&self) -> &'static str {
        "line"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        let s = dvec2(factors.x, factors.y);
        self.start *= s;
        self.end *= s;
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        sink.add_line(self.start, self.end);
    }
}
