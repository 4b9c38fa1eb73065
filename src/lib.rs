//! Convert SVG shapes into DXF entities.
//!
//! An SVG document is read once into typed shapes whose coordinates are
//! already transformed and flipped into the y-up DXF frame. The shapes can
//! be rescaled, linted against laser-cut rules and finally emitted into any
//! [`EntitySink`], usually a [`DxfDocument`].

use std::path::{Path, PathBuf};

use pest_derive::Parser;

pub mod coords;
pub mod cut_rules;
pub mod defaults;
pub mod document;
pub mod element;
pub mod emit;
pub mod errors;
pub mod geometry;
pub mod header;
mod log;
pub mod path_data;
pub mod segments;
pub mod shapes;
pub mod transform;
pub mod types;

pub use cut_rules::{CutRules, Violation};
pub use document::Document;
pub use emit::{DxfDocument, Entity, EntitySink};
pub use errors::{ConvertError, ParseError};
pub use segments::FlattenOptions;
pub use types::ScaleFactors;

use crate::log::info;

#[derive(Parser)]
#[grammar = "svg.pest"]
pub struct SvgParser;

/// How to resize the document before emitting it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rescale {
    /// Multiply x and y by these factors
    Factors { x: f64, y: f64 },
    /// Fit the document to this size in millimetres
    Size { width: f64, height: f64 },
}

/// Run-time knobs for a conversion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    pub rescale: Option<Rescale>,
    pub flatten: FlattenOptions,
    pub cut_rules: Option<CutRules>,
}

/// What a conversion produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub shapes: usize,
    pub entities: usize,
    /// Factors applied by a rescale, if any
    pub scale: Option<ScaleFactors>,
    pub violations: Vec<Violation>,
}

/// Rescale, lint and emit a parsed document.
pub fn convert_document(
    document: &mut Document,
    options: &ConvertOptions,
) -> Result<(DxfDocument, ConversionReport), ConvertError> {
    let scale = match options.rescale {
        Some(Rescale::Factors { x, y }) => {
            let factors =
                ScaleFactors::try_new(x, y).map_err(|(value, _)| ConvertError::InvalidScale { value })?;
            document.scale(factors);
            Some(factors)
        }
        Some(Rescale::Size { width, height }) => Some(document.scale_to_size(width, height)?),
        None => None,
    };

    let violations = match options.cut_rules {
        Some(rules) => rules.check_all(&document.shapes),
        None => Vec::new(),
    };

    let dxf = document.to_dxf(&options.flatten);
    let report = ConversionReport {
        shapes: document.shapes.len(),
        entities: dxf.entity_count(),
        scale,
        violations,
    };
    Ok((dxf, report))
}

/// Convert SVG markup held in memory.
pub fn convert_str(svg: &str, options: &ConvertOptions) -> Result<(DxfDocument, ConversionReport), ConvertError> {
    let mut document = Document::parse(svg, "<input>")?;
    convert_document(&mut document, options)
}

/// Convert an SVG file into a DXF file.
///
/// The output is written once, after every shape was emitted.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    let mut document = Document::open(input)?;
    let (dxf, report) = convert_document(&mut document, options)?;
    dxf.save(output)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        shapes = report.shapes,
        entities = report.entities,
        "wrote dxf"
    );
    Ok(report)
}

/// `drawing.svg` → `drawing.dxf`
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("dxf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn parse_transform_list() {
        let input = "translate(20,30) rotate(30,30,30) scale(2,2)";
        let result = SvgParser::parse(Rule::transform_list, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_transform_list_with_commas() {
        let input = " matrix(1 0 0 1 5 5), skewX(-1.5e1)\n";
        let result = SvgParser::parse(Rule::transform_list, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_unknown_transform_fails() {
        let result = SvgParser::parse(Rule::transform_list, "shear(3)");
        assert!(result.is_err());
    }

    #[test]
    fn parse_path_data() {
        let input = "M100 100 L200 100 Q250 50, 300 100 C350 150, 450 50, 500 100 A50 50 0 0 1 600 100 z";
        let result = SvgParser::parse(Rule::path_data, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_compact_path_data() {
        // packed arc flags and signs acting as separators
        let input = "m10-20l.5.5a5 5 0 1050 0";
        let result = SvgParser::parse(Rule::path_data, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_point_list() {
        let input = "80,50 150,130 50,150";
        let result = SvgParser::parse(Rule::point_list, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_number_forms() {
        for input in ["1", "-1.5", "+.5", "1e3", "2.E-2", "7."] {
            let result = SvgParser::parse(Rule::number, input);
            assert!(result.is_ok(), "Failed to parse {input}: {:?}", result.err());
        }
    }

    #[test]
    fn convert_str_counts_entities() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="10mm">
            <circle cx="5" cy="5" r="0.5"/>
            <line x1="0" y1="0" x2="10" y2="10"/>
        </svg>"#;
        let options = ConvertOptions {
            rescale: Some(Rescale::Factors { x: 2.0, y: 2.0 }),
            cut_rules: Some(CutRules::try_new(3.0).unwrap()),
            ..Default::default()
        };
        let (dxf, report) = convert_str(svg, &options).unwrap();
        assert_eq!(dxf.entity_count(), 2);
        assert_eq!(report.shapes, 2);
        assert_eq!(report.scale, Some(ScaleFactors::uniform(2.0).unwrap()));
        assert!(matches!(report.violations.as_slice(), [Violation::CircleRadius { radius, .. }] if *radius == 1.0));
    }

    #[test]
    fn invalid_factors_are_rejected() {
        let options = ConvertOptions {
            rescale: Some(Rescale::Factors { x: 0.0, y: 1.0 }),
            ..Default::default()
        };
        assert!(matches!(
            convert_str(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#, &options),
            Err(ConvertError::InvalidScale { value }) if value == 0.0
        ));
    }

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(default_output_path(Path::new("a/b.svg")), PathBuf::from("a/b.dxf"));
    }
}
