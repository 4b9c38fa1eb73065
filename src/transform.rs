//! The `transform` attribute: parsing and application.
//!
//! A transform list is kept as the ordered functions that appeared in the
//! attribute. Application follows SVG semantics: the list composes to
//! `T1·T2·…·Tn`, so the rightmost function acts on a point first. All work
//! happens in the SVG (y down) frame; conversion to Cartesian coordinates
//! is a separate, later step.

use glam::{DAffine2, DMat2, DVec2, dvec2};
use pest::Parser;
use pest::iterators::Pair;

use crate::element::parse_number;
use crate::errors::{ParseError, Syntax};
use crate::geometry::{self, matrix_transform, rotate_about_point, skew_x, skew_y};
use crate::log::{debug, warn};
use crate::types::{Point, Vector};
use crate::{Rule, SvgParser};

/// One of the six SVG transform functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Translate,
    Rotate,
    Scale,
    SkewX,
    SkewY,
    Matrix,
}

impl TransformKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "translate" => Some(Self::Translate),
            "rotate" => Some(Self::Rotate),
            "scale" => Some(Self::Scale),
            "skewX" => Some(Self::SkewX),
            "skewY" => Some(Self::SkewY),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
            Self::Matrix => "matrix",
        }
    }

    /// Whether a function accepts `count` arguments.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Translate | Self::Scale => matches!(count, 1 | 2),
            Self::Rotate => matches!(count, 1 | 3),
            Self::SkewX | Self::SkewY => count == 1,
            Self::Matrix => count == 6,
        }
    }
}

/// A transform function with its arguments, arity already checked
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOp {
    pub kind: TransformKind,
    pub params: Vec<f64>,
}

impl TransformOp {
    pub fn new(kind: TransformKind, params: Vec<f64>) -> Self {
        Self { kind, params }
    }

    fn param(&self, index: usize) -> f64 {
        self.params.get(index).copied().unwrap_or(0.0)
    }

    fn apply_point(&self, p: Point) -> Point {
        match self.kind {
            TransformKind::Translate => dvec2(
                geometry::translate(p.x, self.param(0)),
                geometry::translate(p.y, self.param(1)),
            ),
            TransformKind::Rotate => {
                // y points down in SVG, so a positive angle turns clockwise on screen
                let (x, y) = rotate_about_point(p.x, p.y, -self.param(0), self.param(1), self.param(2));
                dvec2(x, y)
            }
            TransformKind::Scale => {
                let (sx, sy) = self.scale_factors();
                dvec2(geometry::scale(p.x, sx), geometry::scale(p.y, sy))
            }
            TransformKind::SkewX => dvec2(skew_x(p.x, p.y, self.param(0)), p.y),
            TransformKind::SkewY => dvec2(p.x, skew_y(p.x, p.y, self.param(0))),
            TransformKind::Matrix => {
                let (x, y) = matrix_transform(p.x, p.y, &self.matrix());
                dvec2(x, y)
            }
        }
    }

    fn apply_vector(&self, v: Vector) -> Vector {
        match self.kind {
            TransformKind::Translate => v,
            TransformKind::Rotate => {
                let (x, y) = rotate_about_point(v.x, v.y, -self.param(0), 0.0, 0.0);
                dvec2(x, y)
            }
            TransformKind::Matrix => {
                let [a, b, c, d, _, _] = self.matrix();
                let (x, y) = matrix_transform(v.x, v.y, &[a, b, c, d, 0.0, 0.0]);
                dvec2(x, y)
            }
            _ => self.apply_point(v),
        }
    }

    fn scale_factors(&self) -> (f64, f64) {
        let sx = self.param(0);
        let sy = self.params.get(1).copied().unwrap_or(sx);
        (sx, sy)
    }

    fn matrix(&self) -> [f64; 6] {
        std::array::from_fn(|i| self.param(i))
    }

    /// The exact affine map of this function.
    pub fn to_affine(&self) -> DAffine2 {
        match self.kind {
            TransformKind::Translate => DAffine2::from_translation(dvec2(self.param(0), self.param(1))),
            TransformKind::Rotate => {
                let center = dvec2(self.param(1), self.param(2));
                DAffine2::from_translation(center)
                    * DAffine2::from_angle(self.param(0).to_radians())
                    * DAffine2::from_translation(-center)
            }
            TransformKind::Scale => {
                let (sx, sy) = self.scale_factors();
                DAffine2::from_scale(dvec2(sx, sy))
            }
            TransformKind::SkewX => DAffine2::from_mat2(DMat2::from_cols(
                DVec2::X,
                dvec2(self.param(0).to_radians().tan(), 1.0),
            )),
            TransformKind::SkewY => DAffine2::from_mat2(DMat2::from_cols(
                dvec2(1.0, self.param(0).to_radians().tan()),
                DVec2::Y,
            )),
            TransformKind::Matrix => {
                let [a, b, c, d, e, f] = self.matrix();
                DAffine2::from_mat2_translation(DMat2::from_cols(dvec2(a, b), dvec2(c, d)), dvec2(e, f))
            }
        }
    }
}

/// An ordered transform list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transform {
    ops: Vec<TransformOp>,
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Parse a `transform` attribute. Absence is the identity.
    ///
    /// Unknown function names and malformed numbers are errors. A function
    /// with the wrong number of arguments is dropped with a warning.
    pub fn parse(attribute: Option<&str>) -> Result<Self, ParseError> {
        let Some(text) = attribute else {
            return Ok(Self::identity());
        };

        let pairs = SvgParser::parse(Rule::transform_list, text)
            .map_err(|e| ParseError::syntax(Syntax::Transform, text, e))?;

        let mut ops = Vec::new();
        for pair in pairs.flatten().filter(|p| p.as_rule() == Rule::transform) {
            if let Some(op) = parse_transform(pair)? {
                ops.push(op);
            }
        }
        debug!(transform = text, count = ops.len(), "parsed transform list");
        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Map a point, rightmost function first.
    pub fn apply_point(&self, p: Point) -> Point {
        self.ops.iter().rev().fold(p, |p, op| op.apply_point(p))
    }

    /// Map a direction: rotations, scales, skews and the linear part of a
    /// matrix apply, translations do not.
    pub fn apply_vector(&self, v: Vector) -> Vector {
        self.ops.iter().rev().fold(v, |v, op| op.apply_vector(v))
    }

    /// The composed affine map.
    pub fn to_affine(&self) -> DAffine2 {
        self.ops
            .iter()
            .fold(DAffine2::IDENTITY, |acc, op| acc * op.to_affine())
    }

    /// The composed linear part.
    pub fn linear(&self) -> DMat2 {
        self.to_affine().matrix2
    }

    /// Whether the transform maps circles to circles.
    pub fn is_similarity(&self) -> bool {
        let m = self.linear();
        let (u, v) = (m.x_axis, m.y_axis);
        geometry::is_perpendicular(u, v) && geometry::nearly_equal(u.length(), v.length())
    }
}

fn parse_transform(pair: Pair<Rule>) -> Result<Option<TransformOp>, ParseError> {
    let mut kind = None;
    let mut params = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::transform_name => kind = TransformKind::from_name(inner.as_str()),
            Rule::arguments => {
                for number in inner.into_inner() {
                    params.push(parse_number(number.as_str(), "transform")?);
                }
            }
            _ => {}
        }
    }

    // the grammar only admits the six known names
    let Some(kind) = kind else {
        return Ok(None);
    };
    if !kind.accepts(params.len()) {
        warn!(
            function = kind.name(),
            arguments = params.len(),
            "wrong number of transform arguments, skipping"
        );
        return Ok(None);
    }
    Ok(Some(TransformOp::new(kind, params)))
}
