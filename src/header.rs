//! The `<svg>` root element: physical size and view box.

use crate::defaults::{MM_PER_CM, MM_PER_IN, MM_PER_PC, MM_PER_PT, MM_PER_PX};
use crate::element::SvgElement;
use crate::log::{info, warn};
use crate::types::ScaleFactors;

/// Size of the document in millimetres plus its view box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// `[x_min, y_min, width, height]`
    pub view_box: [f64; 4],
    pub width: f64,
    pub height: f64,
}

impl Header {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            view_box: [0.0, 0.0, width, height],
            width,
            height,
        }
    }

    /// Read the root element. Never fails: anything undeterminable is 0.
    pub fn from_element(element: &SvgElement) -> Self {
        let view_box = element.attribute("viewBox").and_then(|raw| {
            let parsed = parse_view_box(raw);
            if parsed.is_none() {
                warn!(view_box = raw, "ignoring malformed viewBox");
            }
            parsed
        });

        let width = dimension(element, "width", view_box.map(|vb| vb[2]));
        let height = dimension(element, "height", view_box.map(|vb| vb[3]));

        Self {
            view_box: view_box.unwrap_or([0.0, 0.0, width, height]),
            width,
            height,
        }
    }

    /// Rescale the physical size; the view box takes the new size.
    pub fn scale(&mut self, factors: ScaleFactors) {
        self.width *= factors.x;
        self.height *= factors.y;
        self.view_box = [self.view_box[0], self.view_box[1], self.width, self.height];
    }
}

fn dimension(element: &SvgElement, name: &str, from_view_box: Option<f64>) -> f64 {
    if let Some(raw) = element.attribute(name) {
        return length_to_mm(raw).unwrap_or_else(|| {
            warn!(attribute = name, value = raw, "unknown unit, using 0");
            0.0
        });
    }
    match from_view_box {
        Some(value) => {
            info!(attribute = name, value, "no {name} on the svg element, taken from viewBox");
            value
        }
        None => {
            warn!(attribute = name, "document {name} cannot be determined, using 0");
            0.0
        }
    }
}

/// Convert an SVG length (`"300mm"`, `"800px"`, `"12"`) to millimetres.
///
/// Unitless values are user units, i.e. pixels.
pub fn length_to_mm(raw: &str) -> Option<f64> {
    let text = raw.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let factor = match unit.trim() {
        "mm" => 1.0,
        "" | "px" => MM_PER_PX,
        "cm" => MM_PER_CM,
        "in" => MM_PER_IN,
        "pt" => MM_PER_PT,
        "pc" => MM_PER_PC,
        _ => return None,
    };
    Some(value * factor)
}

/// Four numbers separated by whitespace and/or commas.
pub fn parse_view_box(raw: &str) -> Option<[f64; 4]> {
    let mut values = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()));
    let mut view_box = [0.0; 4];
    for slot in &mut view_box {
        *slot = values.next()??;
    }
    if values.next().is_some() {
        return None;
    }
    Some(view_box)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(attrs: &[(&str, &str)]) -> Header {
        let el = attrs
            .iter()
            .fold(SvgElement::new("svg"), |el, (k, v)| el.with_attr(*k, *v));
        Header::from_element(&el)
    }

    #[test]
    fn millimetre_header() {
        let h = header(&[("height", "300mm"), ("width", "400mm"), ("viewBox", "0 0 200 150")]);
        assert_eq!(h.width, 400.0);
        assert_eq!(h.height, 300.0);
        assert_eq!(h.view_box, [0.0, 0.0, 200.0, 150.0]);
    }

    #[test]
    fn pixel_header() {
        let h = header(&[("height", "800px"), ("width", "800px"), ("viewBox", "0 0 200 200")]);
        assert!((h.height - 800.0 * 25.4 / 96.0).abs() < 1e-9);
        assert!((h.width - 800.0 * 25.4 / 96.0).abs() < 1e-9);
    }

    #[test]
    fn size_falls_back_to_view_box() {
        let h = header(&[("viewBox", "0 0 200 200")]);
        assert_eq!((h.width, h.height), (200.0, 200.0));
        let h = header(&[("viewBox", "0,0,250,500"), ("width", "10cm")]);
        assert_eq!((h.width, h.height), (100.0, 500.0));
    }

    #[test]
    fn undeterminable_sizes_are_zero() {
        let h = header(&[("width", "300m"), ("height", "12furlongs")]);
        assert_eq!((h.width, h.height), (0.0, 0.0));
        let h = header(&[("viewBox", "0 0 nope 5")]);
        assert_eq!((h.width, h.height), (0.0, 0.0));
        let h = header(&[]);
        assert_eq!((h.width, h.height), (0.0, 0.0));
    }

    #[test]
    fn lengths() {
        let close = |raw: &str, mm: f64| (length_to_mm(raw).unwrap() - mm).abs() < 1e-9;
        assert!(close("1in", 25.4));
        assert!(close("72pt", 25.4));
        assert!(close("96", 25.4));
        assert!(close("6pc", 25.4));
        assert_eq!(length_to_mm(" 2.5e1mm "), Some(25.0));
        assert_eq!(length_to_mm("-5mm"), None);
        assert_eq!(length_to_mm("100%"), None);
    }

    #[test]
    fn view_boxes() {
        assert_eq!(parse_view_box("0 0 250 500"), Some([0.0, 0.0, 250.0, 500.0]));
        assert_eq!(parse_view_box("-1, 2 3,4"), Some([-1.0, 2.0, 3.0, 4.0]));
        assert_eq!(parse_view_box("0 0 250"), None);
        assert_eq!(parse_view_box("0 0 250 500 7"), None);
    }

    #[test]
    fn scaling_updates_view_box() {
        let mut h = header(&[("height", "300mm"), ("width", "400mm"), ("viewBox", "5 6 200 150")]);
        h.scale(ScaleFactors::try_new(0.5, 2.0).unwrap());
        assert_eq!((h.width, h.height), (200.0, 600.0));
        assert_eq!(h.view_box, [5.0, 6.0, 200.0, 600.0]);
    }
}
