//! Generic tagged-XML element tree.
//!
//! The entity codecs work on [`XmlElement`] values rather than on the event
//! stream, which keeps each decoder a plain function of one element. Reading
//! and writing go through quick-xml.
//!
//! Text is kept verbatim. Whether whitespace around child elements matters is
//! up to the caller; see [`XmlElement::has_text`].

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DecodeError, EncodeError};

/// One XML element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An element holding only text.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child with this tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child with this tag.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Returns true if the element carries character data that matters.
    ///
    /// Whitespace between child elements is formatting, so it only counts
    /// when the element has no children.
    pub fn has_text(&self) -> bool {
        if self.children.is_empty() {
            !self.text.is_empty()
        } else {
            !self.text.trim().is_empty()
        }
    }
}

/// Options for [`write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,
}

/// Parses a complete document into its root element.
pub fn parse(bytes: &[u8], max_depth: usize) -> Result<XmlElement, DecodeError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if root.is_some() {
                    return Err(DecodeError::Xml("multiple root elements".to_string()));
                }
                if stack.len() >= max_depth {
                    return Err(DecodeError::NestingTooDeep { max: max_depth });
                }
                stack.push(start_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e)?;
                close(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                // quick-xml checks that end tags match their start tags.
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Xml("unbalanced end tag".to_string()))?;
                close(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(ref t)) => {
                let text = std::str::from_utf8(t.as_ref())
                    .map_err(|_| DecodeError::InvalidUtf8 { context: "CDATA section" })?;
                append_text(&mut stack, text)?;
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions and doctypes.
            Ok(_) => {}
            Err(e) => return Err(DecodeError::Xml(e.to_string())),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DecodeError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| DecodeError::Xml("document has no root element".to_string()))
}

fn start_element(e: &BytesStart<'_>) -> Result<XmlElement, DecodeError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|_| DecodeError::InvalidUtf8 { context: "element name" })?
        .to_string();
    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DecodeError::Xml(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| DecodeError::InvalidUtf8 { context: "attribute name" })?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| DecodeError::Xml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DecodeError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(DecodeError::Xml("text outside the root element".to_string())),
    }
    Ok(())
}

/// Serializes an element tree.
pub fn write(root: &XmlElement, options: WriteOptions) -> Result<Vec<u8>, EncodeError> {
    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };
    if options.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| EncodeError::Xml(e.to_string()))?;
    }
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), EncodeError> {
    let start = BytesStart::new(element.name.as_str()).with_attributes(
        element
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );

    // Empty elements are self-closing so indentation never adds text to them.
    if element.text.is_empty() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| EncodeError::Xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| EncodeError::Xml(e.to_string()))?;
    if !element.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(|e| EncodeError::Xml(e.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(Cow::Borrowed(element.name.as_str()))))
        .map_err(|e| EncodeError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<XmlElement, DecodeError> {
        parse(s.as_bytes(), 64)
    }

    #[test]
    fn test_parse_nested() {
        let root = parse_str(
            r#"<?xml version="1.0"?><a k="v &amp; w"><b>one</b><c/><b>two</b></a>"#,
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("k"), Some("v & w"));
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.child_text("b"), Some("one"));
        assert_eq!(root.child("c").map(|c| c.text.as_str()), Some(""));
    }

    #[test]
    fn test_text_is_verbatim() {
        let root = parse_str("<a>  padded &lt;x&gt;  </a>").unwrap();
        assert_eq!(root.text, "  padded <x>  ");
        assert!(root.has_text());

        let root = parse_str("<a><![CDATA[raw <b>]]></a>").unwrap();
        assert_eq!(root.text, "raw <b>");
    }

    #[test]
    fn test_whitespace_between_children_is_not_text() {
        let root = parse_str("<a>\n  <b/>\n</a>").unwrap();
        assert!(!root.has_text());

        let root = parse_str("<a>x<b/></a>").unwrap();
        assert!(root.has_text());

        let root = parse_str("<a> </a>").unwrap();
        assert!(root.has_text());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_str("<a><b></a>"), Err(DecodeError::Xml(_))));
        assert!(matches!(parse_str("<a/><b/>"), Err(DecodeError::Xml(_))));
        assert!(matches!(parse_str(""), Err(DecodeError::Xml(_))));
        assert!(matches!(parse_str("<a>"), Err(DecodeError::Xml(_))));
        assert!(matches!(parse_str("<a/>tail"), Err(DecodeError::Xml(_))));
    }

    #[test]
    fn test_depth_limit() {
        let deep = "<a>".repeat(10) + &"</a>".repeat(10);
        assert!(parse(deep.as_bytes(), 10).is_ok());
        assert_eq!(
            parse(deep.as_bytes(), 9),
            Err(DecodeError::NestingTooDeep { max: 9 })
        );
    }

    #[test]
    fn test_write_then_parse() {
        let tree = XmlElement::new("root")
            .with_attr("version", "3")
            .with_child(XmlElement::leaf("key", "a<b & \"c\""))
            .with_child(XmlElement::leaf("value", ""))
            .with_child(XmlElement::new("list").with_child(XmlElement::leaf("item", " 1 ")));

        for indent in [None, Some(2)] {
            let bytes = write(&tree, WriteOptions { indent, declaration: true }).unwrap();
            let text = String::from_utf8(bytes.clone()).unwrap();
            assert!(text.starts_with("<?xml"));
            assert!(text.contains("<value/>"));
            assert_eq!(parse(&bytes, 64).unwrap().children[2].children[0].text, " 1 ");
            let back = parse(&bytes, 64).unwrap();
            assert_eq!(back.child_text("key"), Some("a<b & \"c\""));
            assert!(!back.child("list").unwrap().has_text());
        }
    }
}
