//! Error types with rich diagnostics using miette
//!
//! Syntax errors in attribute micro-languages carry the attribute text as
//! source code so the offending token can be pointed at.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use pest::error::InputLocation;
use thiserror::Error;

use crate::Rule;

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors that occur while reading a single element or attribute
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("malformed transform: {message}")]
    #[diagnostic(code(svg2dxf::parse::malformed_transform))]
    MalformedTransform {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a transform function")]
        span: SourceSpan,
    },

    #[error("malformed path data: {message}")]
    #[diagnostic(code(svg2dxf::parse::malformed_path))]
    MalformedPath {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input")]
        span: SourceSpan,
    },

    #[error("malformed point list: {message}")]
    #[diagnostic(code(svg2dxf::parse::malformed_points))]
    MalformedPoints {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a coordinate")]
        span: SourceSpan,
    },

    #[error("invalid number {value:?} in `{attribute}`")]
    #[diagnostic(code(svg2dxf::parse::invalid_number))]
    InvalidNumber { attribute: String, value: String },

    #[error("<{element}> is missing the `{attribute}` attribute")]
    #[diagnostic(
        code(svg2dxf::parse::missing_attribute),
        help("the element cannot be drawn without it")
    )]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
}

/// Which attribute grammar a pest error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Syntax {
    Transform,
    Path,
    Points,
}

impl ParseError {
    /// Wrap a pest failure, keeping the attribute text and error position.
    pub(crate) fn syntax(syntax: Syntax, text: &str, err: pest::error::Error<Rule>) -> Self {
        let span: SourceSpan = match err.location {
            InputLocation::Pos(pos) => (pos, 0).into(),
            InputLocation::Span((start, end)) => (start, end.saturating_sub(start)).into(),
        };
        let message = err.variant.message().to_string();
        match syntax {
            Syntax::Transform => ParseError::MalformedTransform {
                message,
                src: NamedSource::new("transform", text.to_string()),
                span,
            },
            Syntax::Path => ParseError::MalformedPath {
                message,
                src: NamedSource::new("d", text.to_string()),
                span,
            },
            Syntax::Points => ParseError::MalformedPoints {
                message,
                src: NamedSource::new("points", text.to_string()),
                span,
            },
        }
    }
}

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors that abort a whole conversion
#[derive(Error, Diagnostic, Debug)]
pub enum ConvertError {
    #[error("SVG file not found: {}", path.display())]
    #[diagnostic(code(svg2dxf::convert::file_not_found))]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(svg2dxf::convert::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {name}")]
    #[diagnostic(code(svg2dxf::convert::malformed_xml))]
    Xml {
        name: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("root element is <{found}>, expected <svg>")]
    #[diagnostic(code(svg2dxf::convert::not_svg))]
    NotSvg { found: String },

    #[error("invalid scale: {value}")]
    #[diagnostic(
        code(svg2dxf::convert::invalid_scale),
        help("scale factors and target sizes must be finite and positive")
    )]
    InvalidScale { value: f64 },

    #[error("document has no width or height to scale from")]
    #[diagnostic(
        code(svg2dxf::convert::zero_dimension),
        help("add width/height or a viewBox to the <svg> element, or scale by factors")
    )]
    ZeroDimension,

    #[error("invalid material thickness: {value}")]
    #[diagnostic(
        code(svg2dxf::convert::invalid_thickness),
        help("the thickness is given in millimetres and must be positive")
    )]
    InvalidThickness { value: f64 },

    #[error("invalid flattening tolerance: {value}")]
    #[diagnostic(code(svg2dxf::convert::invalid_tolerance))]
    InvalidTolerance { value: f64 },

    #[error("failed to write DXF file {}", path.display())]
    #[diagnostic(code(svg2dxf::convert::dxf))]
    Dxf {
        path: PathBuf,
        #[source]
        source: dxf::DxfError,
    },
}
