//! Raw SVG elements: a tag name and its attributes as strings.
//!
//! This is the boundary to the XML layer. Everything past it works on typed
//! values; the readers here decide defaults and report malformed numbers.

use std::collections::BTreeMap;

use crate::errors::ParseError;
use crate::transform::Transform;
use crate::types::finite;

/// Parse a single number token, rejecting anything non-finite.
pub(crate) fn parse_number(text: &str, attribute: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(|v| finite(v).ok())
        .ok_or_else(|| ParseError::InvalidNumber {
            attribute: attribute.to_string(),
            value: text.to_string(),
        })
}

/// An element as read from the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl SvgElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Copy the local tag name and the un-namespaced attributes of an XML node.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .filter(|a| a.namespace().is_none())
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();
        Self {
            tag: node.tag_name().name().to_string(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// A numeric attribute, `None` when absent.
    ///
    /// A trailing `px` is accepted: it is the user unit.
    pub fn number(&self, name: &str) -> Result<Option<f64>, ParseError> {
        let Some(raw) = self.attribute(name) else {
            return Ok(None);
        };
        let text = raw.trim();
        let text = text.strip_suffix("px").unwrap_or(text);
        parse_number(text, name).map(Some).map_err(|_| ParseError::InvalidNumber {
            attribute: name.to_string(),
            value: raw.to_string(),
        })
    }

    /// A positional attribute, 0 when absent.
    pub fn number_or_zero(&self, name: &str) -> Result<f64, ParseError> {
        Ok(self.number(name)?.unwrap_or(0.0))
    }

    /// An attribute the element cannot be drawn without.
    pub fn required(&self, name: &'static str) -> Result<f64, ParseError> {
        self.number(name)?.ok_or_else(|| ParseError::MissingAttribute {
            element: self.tag.clone(),
            attribute: name,
        })
    }

    pub fn transform(&self) -> Result<Transform, ParseError> {
        Transform::parse(self.attribute("transform"))
    }
}
