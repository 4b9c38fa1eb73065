//! SVG (y down) to Cartesian (y up) conversion.

use glam::dvec2;

use crate::types::{Point, Vector};

/// Flip a y coordinate about the horizontal midline of a document of height `doc_height`.
#[inline]
pub fn to_cartesian(y_svg: f64, doc_height: f64) -> f64 {
    doc_height - y_svg
}

/// The coordinate converter for one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    pub height: f64,
}

impl CoordinateSystem {
    pub fn new(height: f64) -> Self {
        Self { height }
    }

    pub fn point(&self, p: Point) -> Point {
        dvec2(p.x, to_cartesian(p.y, self.height))
    }

    /// Directions have no origin, so only their orientation flips.
    pub fn vector(&self, v: Vector) -> Vector {
        dvec2(v.x, -v.y)
    }
}
