//! Numeric primitives shared by the geometry pipeline.

use std::fmt;

use glam::DVec2;

/// A position in the plane (SVG or Cartesian, depending on the stage).
pub type Point = DVec2;

/// A displacement or direction: transformed without translation.
pub type Vector = DVec2;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
#[inline]
pub fn finite(value: f64) -> Result<f64, NumericError> {
    if value.is_nan() {
        Err(NumericError::NaN)
    } else if value.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(value)
    }
}

/// Reject anything that is not a finite, strictly positive number.
#[inline]
pub fn positive(value: f64) -> Result<f64, NumericError> {
    let value = finite(value)?;
    if value == 0.0 {
        Err(NumericError::Zero)
    } else if value < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(value)
    }
}

/// Scale factors for a whole-document rescale, validated on construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    /// Create scale factors with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(x: f64, y: f64) -> Result<Self, (f64, NumericError)> {
        let x = positive(x).map_err(|e| (x, e))?;
        let y = positive(y).map_err(|e| (y, e))?;
        Ok(ScaleFactors { x, y })
    }

    /// The same factor on both axes.
    pub fn uniform(factor: f64) -> Result<Self, (f64, NumericError)> {
        Self::try_new(factor, factor)
    }

    pub fn is_uniform(&self) -> bool {
        self.x == self.y
    }
}
