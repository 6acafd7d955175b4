//! Field-level encoding/decoding shared by the entity codecs.
//!
//! Values and messages store every field as a child element holding text.
//! [`Fields`] reads those children with uniform error reporting, and the free
//! functions render scalars the way the authoring tool writes them.

use crate::codec::xml::XmlElement;
use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for the named text fields of one element.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    element: &'a XmlElement,
    tag: &'static str,
}

impl<'a> Fields<'a> {
    /// Wraps an element; `tag` names it in error messages.
    pub fn new(element: &'a XmlElement, tag: &'static str) -> Self {
        Self { element, tag }
    }

    /// Returns the child element `name`.
    pub fn child(&self, name: &'static str) -> Result<&'a XmlElement, DecodeError> {
        self.element.child(name).ok_or(DecodeError::MissingElement {
            parent: self.tag,
            element: name,
        })
    }

    /// Returns the children of the list element `name`, or an empty slice if
    /// the list is absent.
    pub fn list(&self, name: &'static str) -> &'a [XmlElement] {
        self.element
            .child(name)
            .map(|list| list.children.as_slice())
            .unwrap_or(&[])
    }

    /// Reads the text of `name`.
    pub fn text(&self, name: &'static str) -> Result<&'a str, DecodeError> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Reads a boolean written as `0`/`1` (`true`/`false` also accepted).
    pub fn flag(&self, name: &'static str) -> Result<bool, DecodeError> {
        let text = self.text(name)?;
        parse_flag(text).ok_or_else(|| invalid(name, text))
    }

    /// Reads a number.
    pub fn f64(&self, name: &'static str) -> Result<f64, DecodeError> {
        let text = self.text(name)?;
        text.trim().parse().map_err(|_| invalid(name, text))
    }

    /// Reads a small unsigned integer.
    pub fn u8(&self, name: &'static str) -> Result<u8, DecodeError> {
        let text = self.text(name)?;
        text.trim().parse().map_err(|_| invalid(name, text))
    }

    /// Reads a field through a name lookup such as `ValueKey::from_name`.
    pub fn parse<T>(
        &self,
        name: &'static str,
        from_name: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, DecodeError> {
        let text = self.text(name)?;
        from_name(text.trim()).ok_or_else(|| invalid(name, text))
    }
}

/// Parses `0`/`1`/`true`/`false`.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Builds an `InvalidField` error.
pub fn invalid(field: &'static str, found: &str) -> DecodeError {
    DecodeError::InvalidField {
        field,
        found: found.to_string(),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Renders a boolean as `0`/`1`.
pub fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Appends `<name>text</name>` to `element`.
pub fn push_field(element: &mut XmlElement, name: &str, text: impl Into<String>) {
    element.push(XmlElement::leaf(name, text));
}
