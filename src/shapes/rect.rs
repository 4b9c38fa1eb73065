use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::dvec2;

use super::Geometry;
use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::{EllipseArc, EntitySink};
use crate::errors::ParseError;
use crate::log::warn;
use crate::segments::FlattenOptions;
use crate::types::{Point, ScaleFactors, Vector};

/// Limit a corner radius to half the side it sits on.
pub fn ensure_applicable_radius(radius: f64, side: f64) -> f64 {
    radius.min(side / 2.0)
}

/// A rectangle shape, possibly with rounded corners
///
/// Every size is a vector so rotations and skews survive: `width` runs
/// along the top edge, `height` down the left edge, `rx` along the top
/// edge and `ry` up the left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub top_left: Point,
    pub width: Vector,
    pub height: Vector,
    pub rx: Vector,
    pub ry: Vector,
}

impl RectShape {
    pub fn new(top_left: Point, width: Vector, height: Vector) -> Self {
        Self {
            top_left,
            width,
            height,
            rx: Vector::ZERO,
            ry: Vector::ZERO,
        }
    }

    pub fn with_radii(mut self, rx: Vector, ry: Vector) -> Self {
        self.rx = rx;
        self.ry = ry;
        self
    }

    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        let x = element.number_or_zero("x")?;
        let y = element.number_or_zero("y")?;
        let width = non_negative(element, "width")?;
        let height = non_negative(element, "height")?;

        // negative radii count as absent
        let rx = element.number("rx")?.filter(|r| *r >= 0.0);
        let ry = element.number("ry")?.filter(|r| *r >= 0.0);
        let (rx, ry) = match (rx, ry) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => (0.0, 0.0),
        };
        let rx = ensure_applicable_radius(rx, width);
        let ry = ensure_applicable_radius(ry, height);

        let transform = element.transform()?;
        let vector = |v: Vector| cs.vector(transform.apply_vector(v));
        Ok(Self {
            top_left: cs.point(transform.apply_point(dvec2(x, y))),
            width: vector(dvec2(width, 0.0)),
            height: vector(dvec2(0.0, height)),
            rx: vector(dvec2(rx, 0.0)),
            ry: vector(dvec2(0.0, -ry)),
        })
    }

    pub fn is_rounded(&self) -> bool {
        self.rx != Vector::ZERO && self.ry != Vector::ZERO
    }

    pub fn corners(&self) -> [Point; 4] {
        let tl = self.top_left;
        [tl, tl + self.width, tl + self.width + self.height, tl + self.height]
    }

    fn emit_rounded(&self, sink: &mut dyn EntitySink) {
        let [tl, tr, br, bl] = self.corners();
        let (rx, ry) = (self.rx, self.ry);

        sink.add_line(tl + rx, tr - rx);
        sink.add_line(tr - ry, br + ry);
        sink.add_line(br - rx, bl + rx);
        sink.add_line(bl + ry, tl - ry);

        let corners = [
            (tr - rx - ry, 0.0, FRAC_PI_2),
            (br - rx + ry, 3.0 * FRAC_PI_2, TAU),
            (bl + rx + ry, PI, 3.0 * FRAC_PI_2),
            (tl + rx - ry, FRAC_PI_2, PI),
        ];
        for (center, start, end) in corners {
            match EllipseArc::from_radii(center, rx, ry, start, end) {
                Some(arc) => arc.emit(sink),
                None => warn!(
                    rx = ?(rx.x, rx.y),
                    ry = ?(ry.x, ry.y),
                    "degenerate rectangle corner, not emitted"
                ),
            }
        }
    }
}

fn non_negative(element: &SvgElement, name: &'static str) -> Result<f64, ParseError> {
    let value = element.required(name)?;
    if value < 0.0 {
        return Err(ParseError::InvalidNumber {
            attribute: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

impl Geometry for RectShape {
    fn name(&self) -> &'static str {
        "rect"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        let s = dvec2(factors.x, factors.y);
        self.top_left *= s;
        self.width *= s;
        self.height *= s;
        self.rx *= s;
        self.ry *= s;
    }

    fn emit(&self, sink: &mut dyn EntitySink, _options: &FlattenOptions) {
        if self.is_rounded() {
            self.emit_rounded(sink);
        } else {
            sink.add_lwpolyline(&self.corners(), true);
        }
    }
}
