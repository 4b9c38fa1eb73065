use glam::dvec2;
use pest::Parser;

use super::Geometry;
use crate::coords::CoordinateSystem;
use crate::element::{SvgElement, parse_number};
use crate::emit::EntitySink;
use crate::errors::{ParseError, Syntax};
use crate::log::warn;
use crate::segments::FlattenOptions;
use crate::types::{Point, ScaleFactors};
use crate::{Rule, SvgParser};

/// Parse a `points` attribute into coordinate pairs.
///
/// A trailing odd coordinate is dropped with a warning.
pub fn parse_points(text: &str) -> Result<Vec<Point>, ParseError> {
    let pairs = SvgParser::parse(Rule::point_list, text)
        .map_err(|e| ParseError::syntax(Syntax::Points, text, e))?;

    let numbers = pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::number)
        .map(|p| parse_number(p.as_str(), "points"))
        .collect::<Result<Vec<_>, _>>()?;

    let coords = numbers.chunks_exact(2);
    if !coords.remainder().is_empty() {
        warn!(points = text, "odd number of coordinates, dropping the last one");
    }
    Ok(coords.map(|c| dvec2(c[0], c[1])).collect())
}

fn read_points(element: &SvgElement, cs: &CoordinateSystem) -> Result<Vec<Point>, ParseError> {
    let points = parse_points(element.attribute("points").unwrap_or(""))?;
    let transform = element.transform()?;
    Ok(points
        .into_iter()
        .map(|p| cs.point(transform.apply_point(p)))
        .collect())
}

fn scale_points(points: &mut [Point], factors: ScaleFactors) {
    let s = dvec2(factors.x, factors.y);
    for p in points {
        *p *= s;
    }
}

fn emit_points(name: &str, points: &[Point], closed: bool, sink: &mut dyn EntitySink) {
    if points.len() < 2 {
        warn!(shape = name, points = points.len(), "too few points, not emitted");
        return;
    }
    sink.add_lwpolyline(points, closed);
}

/// A closed polygon shape
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub points: Vec<Point>,
}

impl PolygonShape {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        Ok(Self::new(read_points(element, cs)?))
    }
}

impl Geometry for PolygonShape {
    fn name(&self) -> &'static str {
        "polygon"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        scale_points(&mut self.points, factors);
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        emit_points(self.name(), &self.points, true, sink);
    }
}

/// An open polyline shape
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineShape {
    pub points: Vec<Point>,
}

impl PolylineShape {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        Ok(Self::new(read_points(element, cs)?))
    }
}

impl Geometry for PolylineShape {
    fn name(&self) -> &'static str {
        "polyline"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        scale_points(&mut self.points, factors);
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        emit_points(self.name(), &self.points, false, sink);
    }
}
