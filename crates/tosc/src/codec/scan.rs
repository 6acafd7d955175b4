//! Streaming property search over document XML.
//!
//! These functions answer "which control has name X" style questions straight
//! from the quick-xml event stream without building a [`Document`]. Only
//! scalar properties are visible to a scan: a property whose `<value>` holds
//! parameter elements (frames, colors) is skipped.
//!
//! Controls are visited in document order, parents before their children.
//! Scanning stops at the first match, so malformed XML after it goes
//! unreported; use [`load`](crate::codec::load) when the whole document must
//! be well formed.
//!
//! [`Document`]: crate::model::Document

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;

use crate::codec::document::decompress;
use crate::error::DecodeError;
use crate::limits::MAX_NESTING_DEPTH;
use crate::model::ControlId;

/// Scalar properties of one `<node>`, as seen by the scanner.
#[derive(Debug, Default)]
struct ScannedNode {
    id: Option<String>,
    properties: Vec<(String, String)>,
    emitted: bool,
}

impl ScannedNode {
    fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The property being read, between `<property>` and `</property>`.
#[derive(Debug, Default)]
struct PendingProperty {
    key: Option<String>,
    value: Option<String>,
    structured: bool,
}

/// Event-driven state: the open element path, the open nodes and the
/// property being read.
struct Scanner<F> {
    path: Vec<String>,
    nodes: Vec<ScannedNode>,
    pending: Option<PendingProperty>,
    visit: F,
}

impl<T, F> Scanner<F>
where
    F: FnMut(&ScannedNode) -> Result<Option<T>, DecodeError>,
{
    fn start(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Result<Option<T>, DecodeError> {
        let name = element_name(e)?;
        if self.path.len() >= MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }

        // A node's other sections follow <properties>, so its children are
        // only reached after it has been emitted.
        if self.parent_is("node") && name != "properties" {
            if let Some(found) = self.emit()? {
                return Ok(Some(found));
            }
        }

        match name.as_str() {
            "node" => self.nodes.push(ScannedNode {
                id: id_attribute(e)?,
                ..ScannedNode::default()
            }),
            "property" if self.parent_is("properties") => {
                self.pending = Some(PendingProperty::default());
            }
            "key" | "value" if self.parent_is("property") => {
                if let Some(property) = self.pending.as_mut() {
                    let slot = if name == "key" {
                        &mut property.key
                    } else {
                        &mut property.value
                    };
                    slot.get_or_insert_with(String::new);
                }
            }
            _ if self.parent_is("value") && self.in_property() => {
                if let Some(property) = self.pending.as_mut() {
                    property.structured = true;
                }
            }
            _ => {}
        }

        self.path.push(name);
        if is_empty {
            return self.end();
        }
        Ok(None)
    }

    fn end(&mut self) -> Result<Option<T>, DecodeError> {
        match self.path.last().map(String::as_str) {
            Some("node") => {
                let found = self.emit()?;
                self.path.pop();
                self.nodes.pop();
                Ok(found)
            }
            Some("property") => {
                self.path.pop();
                if let Some(PendingProperty {
                    key: Some(key),
                    value: Some(value),
                    structured: false,
                }) = self.pending.take()
                {
                    if let Some(node) = self.nodes.last_mut() {
                        node.properties.push((key.trim().to_string(), value));
                    }
                }
                Ok(None)
            }
            Some("properties") => {
                self.path.pop();
                if self.parent_is("node") {
                    self.emit()
                } else {
                    Ok(None)
                }
            }
            _ => {
                self.path.pop();
                Ok(None)
            }
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_property() {
            return;
        }
        let Some(property) = self.pending.as_mut() else {
            return;
        };
        let slot = match self.path.last().map(String::as_str) {
            Some("key") => &mut property.key,
            Some("value") => &mut property.value,
            _ => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    /// Hands the innermost node to the visitor, once.
    fn emit(&mut self) -> Result<Option<T>, DecodeError> {
        match self.nodes.last_mut() {
            Some(node) if !node.emitted => {
                node.emitted = true;
                (self.visit)(node)
            }
            _ => Ok(None),
        }
    }

    fn parent_is(&self, name: &str) -> bool {
        self.path.last().is_some_and(|p| p == name)
    }

    /// True when the path ends in `.../property/<field>`.
    fn in_property(&self) -> bool {
        self.path.len() >= 2 && self.path[self.path.len() - 2] == "property"
    }
}

/// Walks every `<node>` and hands its scalar properties to `visit`, stopping
/// at the first `Some`.
fn scan<T>(
    xml: &[u8],
    visit: impl FnMut(&ScannedNode) -> Result<Option<T>, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut scanner = Scanner {
        path: Vec::new(),
        nodes: Vec::new(),
        pending: None,
        visit,
    };

    loop {
        let found = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => scanner.start(e, false)?,
            Ok(Event::Empty(ref e)) => scanner.start(e, true)?,
            Ok(Event::End(_)) => scanner.end()?,
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                scanner.text(&text);
                None
            }
            Ok(Event::CData(ref t)) => {
                let text = std::str::from_utf8(t.as_ref())
                    .map_err(|_| DecodeError::InvalidUtf8 { context: "CDATA section" })?;
                scanner.text(text);
                None
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => None,
            Err(e) => return Err(DecodeError::Xml(e.to_string())),
        };
        if found.is_some() {
            return Ok(found);
        }
        buf.clear();
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String, DecodeError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|_| DecodeError::InvalidUtf8 { context: "element name" })
}

fn id_attribute(e: &BytesStart<'_>) -> Result<Option<String>, DecodeError> {
    let attribute = e
        .try_get_attribute("ID")
        .map_err(|err| DecodeError::Xml(err.to_string()))?;
    attribute
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| DecodeError::Xml(err.to_string()))
        })
        .transpose()
}

// =============================================================================
// QUERIES
// =============================================================================

/// Finds the first control whose scalar property `key` equals `value` and
/// returns its `target_key` property.
///
/// Returns `None` when no control matches, or when the matching control has
/// no scalar `target_key`.
pub fn pull_value_from_key(
    xml: &[u8],
    key: &str,
    value: &str,
    target_key: &str,
) -> Result<Option<String>, DecodeError> {
    let found = scan(xml, |node| {
        Ok(match node.get(key) {
            Some(v) if v == value => Some(node.get(target_key).map(str::to_string)),
            _ => None,
        })
    })?;
    Ok(found.flatten())
}

/// Collects the requested properties of every control, in document order.
///
/// Each map holds every key in `keys`; a key the control does not carry maps
/// to the empty string.
pub fn parse_properties(
    xml: &[u8],
    keys: &[&str],
) -> Result<Vec<FxHashMap<String, String>>, DecodeError> {
    let mut rows = Vec::new();
    scan::<()>(xml, |node| {
        let mut row = FxHashMap::with_capacity_and_hasher(keys.len(), Default::default());
        for key in keys {
            row.insert(key.to_string(), node.get(key).unwrap_or_default().to_string());
        }
        rows.push(row);
        Ok(None)
    })?;
    Ok(rows)
}

/// Finds the ID of the first control whose `name` property equals `name`.
pub fn find_id_by_name(xml: &[u8], name: &str) -> Result<Option<ControlId>, DecodeError> {
    scan(xml, |node| {
        if node.get("name") != Some(name) {
            return Ok(None);
        }
        let id = node.id.as_deref().ok_or(DecodeError::MissingAttribute {
            element: "node",
            attribute: "ID",
        })?;
        ControlId::parse(id)
            .map(Some)
            .ok_or_else(|| DecodeError::InvalidId {
                found: id.to_string(),
            })
    })
}

/// [`pull_value_from_key`] over `.tosc` bytes.
pub fn pull_value_from_key_compressed(
    bytes: &[u8],
    key: &str,
    value: &str,
    target_key: &str,
) -> Result<Option<String>, DecodeError> {
    pull_value_from_key(&decompress(bytes)?, key, value, target_key)
}

/// [`parse_properties`] over `.tosc` bytes.
pub fn parse_properties_compressed(
    bytes: &[u8],
    keys: &[&str],
) -> Result<Vec<FxHashMap<String, String>>, DecodeError> {
    parse_properties(&decompress(bytes)?, keys)
}

/// [`find_id_by_name`] over `.tosc` bytes.
pub fn find_id_by_name_compressed(
    bytes: &[u8],
    name: &str,
) -> Result<Option<ControlId>, DecodeError> {
    find_id_by_name(&decompress(bytes)?, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{encode_document, save};
    use crate::codec::SaveOptions;
    use crate::model::{Control, ControlType, Document, Frame};

    fn sample() -> (Document, ControlId, ControlId) {
        let mut doc = Document::with_frame(Frame::new(0.0, 0.0, 800.0, 600.0));
        doc.root.set_name("root").set_script("-- root");

        let mut fader = Control::new(ControlType::Fader);
        fader
            .set_name("volume")
            .set_tag("mix")
            .set_frame(Frame::new(0.0, 0.0, 50.0, 300.0));
        let fader_id = fader.id();

        let mut pager = Control::new(ControlType::Pager);
        pager.set_name("pages");
        let mut label = Control::new(ControlType::Label);
        label.set_name("caption").set_tag("a < b & c");
        let label_id = label.id();
        pager.add_child(label).unwrap();

        doc.root.add_child(fader).unwrap();
        doc.root.add_child(pager).unwrap();
        (doc, fader_id, label_id)
    }

    fn xml_of(doc: &Document, options: SaveOptions) -> Vec<u8> {
        encode_document(doc, options).unwrap()
    }

    #[test]
    fn test_pull_value_from_key() {
        let (doc, _, _) = sample();
        let xml = xml_of(&doc, SaveOptions::default());

        assert_eq!(
            pull_value_from_key(&xml, "name", "volume", "tag").unwrap(),
            Some("mix".to_string())
        );
        assert_eq!(
            pull_value_from_key(&xml, "name", "caption", "tag").unwrap(),
            Some("a < b & c".to_string())
        );
        // Matching control without the target key.
        assert_eq!(pull_value_from_key(&xml, "name", "pages", "tag").unwrap(), None);
        assert_eq!(pull_value_from_key(&xml, "name", "nobody", "tag").unwrap(), None);
        // Structured properties are invisible to the scanner.
        assert_eq!(pull_value_from_key(&xml, "name", "volume", "frame").unwrap(), None);
    }

    #[test]
    fn test_parse_properties_order_and_defaults() {
        let (doc, _, _) = sample();
        for options in [SaveOptions::default(), SaveOptions::pretty()] {
            let rows = parse_properties(&xml_of(&doc, options), &["name", "script"]).unwrap();
            let names: Vec<_> = rows.iter().map(|r| r["name"].as_str()).collect();
            assert_eq!(names, ["root", "volume", "pages", "caption"]);
            assert_eq!(rows[0]["script"], "-- root");
            assert_eq!(rows[1]["script"], "");
        }
    }

    #[test]
    fn test_parse_properties_node_without_properties() {
        let xml = br#"<lexml version="3"><node ID="a" type="GROUP"><children>
            <node ID="b" type="BOX"/>
            <node ID="c" type="LABEL"><properties><property type="s"><key>name</key><value>c</value></property></properties></node>
        </children></node></lexml>"#;
        let rows = parse_properties(xml, &["name"]).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str()).collect();
        assert_eq!(names, ["", "", "c"]);
    }

    #[test]
    fn test_find_id_by_name() {
        let (doc, fader_id, label_id) = sample();
        let xml = xml_of(&doc, SaveOptions::pretty());
        assert_eq!(find_id_by_name(&xml, "volume").unwrap(), Some(fader_id));
        assert_eq!(find_id_by_name(&xml, "caption").unwrap(), Some(label_id));
        assert_eq!(find_id_by_name(&xml, "missing").unwrap(), None);
    }

    #[test]
    fn test_find_id_by_name_bad_id() {
        let xml = br#"<lexml version="3"><node ID="nope" type="GROUP"><properties>
            <property type="s"><key>name</key><value>root</value></property>
        </properties></node></lexml>"#;
        assert_eq!(
            find_id_by_name(xml, "root"),
            Err(DecodeError::InvalidId { found: "nope".into() })
        );
    }

    #[test]
    fn test_compressed_variants() {
        let (doc, fader_id, _) = sample();
        let bytes = save(&doc).unwrap();
        assert_eq!(find_id_by_name_compressed(&bytes, "volume").unwrap(), Some(fader_id));
        assert_eq!(
            pull_value_from_key_compressed(&bytes, "name", "volume", "tag").unwrap(),
            Some("mix".to_string())
        );
        assert_eq!(parse_properties_compressed(&bytes, &["name"]).unwrap().len(), 4);
        assert!(find_id_by_name_compressed(b"not zlib", "volume").is_err());
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_properties(b"<lexml><node></lexml>", &["name"]).unwrap_err();
        assert!(matches!(err, DecodeError::Xml(_)));
    }
}
