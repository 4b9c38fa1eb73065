//! Default values and unit constants (lengths in millimetres)

/// SVG user units are CSS pixels at 96 dpi.
pub const MM_PER_PX: f64 = 25.4 / 96.0;
pub const MM_PER_CM: f64 = 10.0;
pub const MM_PER_IN: f64 = 25.4;
pub const MM_PER_PT: f64 = 25.4 / 72.0;
pub const MM_PER_PC: f64 = 25.4 / 6.0;

/// Decimal places kept by `rotate_about_point`.
pub const ROTATION_DECIMALS: i32 = 5;

/// Maximal distance between a Bézier curve and its polyline approximation.
pub const FLATTEN_TOLERANCE: f64 = 0.1;
/// Minimal number of polyline segments per Bézier curve.
pub const FLATTEN_MIN_SEGMENTS: usize = 3;
/// Upper bound on segments per curve, guards against tiny tolerances.
pub const FLATTEN_MAX_SEGMENTS: usize = 1024;

/// Relative tolerance for "these two lengths are equal" decisions.
pub const EPSILON: f64 = 1e-9;

/// Cut rules: minimal radius / web width = factor * material thickness.
pub const CUT_RULE_FACTOR: f64 = 0.7;
/// Cut rules: thinnest line a laser can leave standing.
pub const MIN_LINE_WIDTH: f64 = 0.3;

/// Relative tolerance under which two radius vectors count as perpendicular.
///
/// Looser than `EPSILON`: rotated radii carry the five-decimal rounding.
pub const AXIS_PERPENDICULARITY: f64 = 1e-6;
