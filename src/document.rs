//! An SVG document: header plus the ordered shapes it draws.

use std::path::Path;

use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::{DxfDocument, EntitySink};
use crate::errors::ConvertError;
use crate::header::Header;
use crate::log::{debug, info, warn};
use crate::segments::FlattenOptions;
use crate::shapes::{Geometry, Shape};
use crate::types::ScaleFactors;

/// Tags that only group or describe other elements
const CONTAINERS: &[&str] = &["svg", "g", "title", "desc", "metadata"];

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Header,
    pub shapes: Vec<Shape>,
}

impl Document {
    /// Parse SVG markup. `name` labels the source in errors and logs.
    pub fn parse(text: &str, name: &str) -> Result<Self, ConvertError> {
        let xml = roxmltree::Document::parse(text).map_err(|source| ConvertError::Xml {
            name: name.to_string(),
            source,
        })?;
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(ConvertError::NotSvg {
                found: root.tag_name().name().to_string(),
            });
        }

        let header = Header::from_element(&SvgElement::from_node(root));
        let cs = CoordinateSystem::new(header.height);
        debug!(source = name, width = header.width, height = header.height, "read svg header");

        let mut shapes = Vec::new();
        for node in root.descendants().filter(|n| n.is_element() && *n != root) {
            let element = SvgElement::from_node(node);
            match Shape::from_element(&element, &cs) {
                Ok(Some(shape)) => {
                    debug!(shape = shape.name(), "converted element");
                    shapes.push(shape);
                }
                Ok(None) => {
                    if !CONTAINERS.contains(&element.tag.as_str()) {
                        info!(tag = %element.tag, "skipping element that is not a shape");
                    }
                }
                Err(err) => {
                    warn!(tag = %element.tag, error = %err, "skipping element");
                }
            }
        }

        Ok(Self { header, shapes })
    }

    /// Read and parse an SVG file.
    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConvertError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConvertError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Rescale the header and every shape.
    ///
    /// Unequal factors distort the drawing; that is allowed but logged.
    pub fn scale(&mut self, factors: ScaleFactors) {
        if !factors.is_uniform() {
            warn!(
                scale_x = factors.x,
                scale_y = factors.y,
                "rescale changes the aspect ratio, shapes will be distorted"
            );
        }
        self.header.scale(factors);
        for shape in &mut self.shapes {
            shape.scale(factors);
        }
    }

    /// Rescale so the document measures `width` × `height` mm.
    ///
    /// Returns the factors that were applied.
    pub fn scale_to_size(&mut self, width: f64, height: f64) -> Result<ScaleFactors, ConvertError> {
        if self.header.width == 0.0 || self.header.height == 0.0 {
            return Err(ConvertError::ZeroDimension);
        }
        let factors = ScaleFactors::try_new(width / self.header.width, height / self.header.height)
            .map_err(|(value, _)| ConvertError::InvalidScale { value })?;
        self.scale(factors);
        Ok(factors)
    }

    /// Write every shape, in document order.
    pub fn emit(&self, sink: &mut dyn EntitySink, options: &FlattenOptions) {
        for shape in &self.shapes {
            shape.emit(sink, options);
        }
    }

    pub fn to_dxf(&self, options: &FlattenOptions) -> DxfDocument {
        let mut dxf = DxfDocument::new();
        self.emit(&mut dxf, options);
        dxf
    }
}
