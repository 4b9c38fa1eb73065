//! Laser-cut rules: features too small to survive cutting.
//!
//! Checked on drawing-space geometry, so run them after any rescale.

use std::fmt;

use crate::defaults::{CUT_RULE_FACTOR, MIN_LINE_WIDTH};
use crate::errors::ConvertError;
use crate::geometry::euclidean_norm;
use crate::log::warn;
use crate::shapes::{CircleShape, EllipseShape, RectShape, Shape};
use crate::types::positive;

/// Which corner radius of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A feature below what the material can hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    CircleRadius { radius: f64, min: f64 },
    /// Smaller semi-axis of an ellipse
    EllipseRadius { radius: f64, min: f64 },
    RectangleWidth { remaining: f64, min: f64 },
    RectangleHeight { remaining: f64, min: f64 },
    CornerRadius { axis: Axis, radius: f64, min: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CircleRadius { radius, min } => {
                write!(f, "circle radius {radius} mm is below {min} mm")
            }
            Violation::EllipseRadius { radius, min } => {
                write!(f, "ellipse minor radius {radius} mm is below {min} mm")
            }
            Violation::RectangleWidth { remaining, min } => {
                write!(f, "rectangle width between corners {remaining} mm is below {min} mm")
            }
            Violation::RectangleHeight { remaining, min } => {
                write!(f, "rectangle height between corners {remaining} mm is below {min} mm")
            }
            Violation::CornerRadius { axis, radius, min } => {
                let axis = match axis {
                    Axis::X => "x",
                    Axis::Y => "y",
                };
                write!(f, "rectangle corner radius in {axis} {radius} mm is below {min} mm")
            }
        }
    }
}

/// Cut rules for one material thickness (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutRules {
    pub thickness: f64,
}

impl CutRules {
    pub fn try_new(thickness: f64) -> Result<Self, ConvertError> {
        positive(thickness).map_err(|_| ConvertError::InvalidThickness { value: thickness })?;
        Ok(Self { thickness })
    }

    /// Smallest radius that can be cut cleanly
    pub fn min_radius(&self) -> f64 {
        CUT_RULE_FACTOR * self.thickness
    }

    /// Violations of a single shape. Shapes without rules yield none.
    pub fn check(&self, shape: &Shape) -> Vec<Violation> {
        match shape {
            Shape::Circle(circle) => self.check_circle(circle),
            Shape::Ellipse(ellipse) => self.check_ellipse(ellipse),
            Shape::Rectangle(rect) => self.check_rect(rect),
            _ => Vec::new(),
        }
    }

    /// Check every shape, logging each violation.
    pub fn check_all<'a>(&self, shapes: impl IntoIterator<Item = &'a Shape>) -> Vec<Violation> {
        let mut found = Vec::new();
        for shape in shapes {
            for violation in self.check(shape) {
                warn!(thickness = self.thickness, "cut rule violated: {violation}");
                found.push(violation);
            }
        }
        found
    }

    fn check_circle(&self, circle: &CircleShape) -> Vec<Violation> {
        let radius = if circle.radius_y == 0.0 {
            circle.radius
        } else {
            circle.radius.min(circle.radius_y)
        };
        let min = self.min_radius();
        if radius < min {
            vec![Violation::CircleRadius { radius, min }]
        } else {
            Vec::new()
        }
    }

    fn check_ellipse(&self, ellipse: &EllipseShape) -> Vec<Violation> {
        let radius = euclidean_norm(ellipse.radius_x).min(euclidean_norm(ellipse.radius_y));
        let min = self.min_radius();
        if radius < min {
            vec![Violation::EllipseRadius { radius, min }]
        } else {
            Vec::new()
        }
    }

    fn check_rect(&self, rect: &RectShape) -> Vec<Violation> {
        let mut found = Vec::new();
        let rx = euclidean_norm(rect.rx);
        let ry = euclidean_norm(rect.ry);

        let remaining = euclidean_norm(rect.width) - 2.0 * rx;
        if remaining < MIN_LINE_WIDTH {
            found.push(Violation::RectangleWidth {
                remaining,
                min: MIN_LINE_WIDTH,
            });
        }
        let remaining = euclidean_norm(rect.height) - 2.0 * ry;
        if remaining < MIN_LINE_WIDTH {
            found.push(Violation::RectangleHeight {
                remaining,
                min: MIN_LINE_WIDTH,
            });
        }

        let min = self.min_radius();
        for (axis, radius) in [(Axis::X, rx), (Axis::Y, ry)] {
            if radius > 0.0 && radius < min {
                found.push(Violation::CornerRadius { axis, radius, min });
            }
        }
        found
    }
}
