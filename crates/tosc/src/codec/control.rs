//! Control-node encoding/decoding.
//!
//! ```text
//! <node ID="..." type="GROUP">
//!   <properties>...</properties>
//!   <values>...</values>
//!   <messages>...</messages>
//!   <children><node ...>...</node></children>
//! </node>
//! ```
//!
//! The encoder always writes all four collections. The decoder treats a
//! missing collection as empty.

use log::{trace, warn};
use rustc_hash::FxHashSet;

use crate::codec::message::{decode_message, encode_message};
use crate::codec::property::{decode_property, encode_property};
use crate::codec::value::{decode_value, encode_value};
use crate::codec::xml::XmlElement;
use crate::error::DecodeError;
use crate::model::{Control, ControlId, ControlType};

/// Encodes a control and its subtree as a `<node>` element.
pub fn encode_control(control: &Control) -> XmlElement {
    let mut properties = XmlElement::new("properties");
    for property in control.properties() {
        properties.push(encode_property(property));
    }

    let mut values = XmlElement::new("values");
    for value in control.values() {
        values.push(encode_value(value));
    }

    // Grouped by kind: osc, midi, local.
    let mut messages = XmlElement::new("messages");
    for message in control.messages().iter() {
        messages.push(encode_message(message));
    }

    let mut children = XmlElement::new("children");
    for child in control.children() {
        children.push(encode_control(child));
    }

    XmlElement::new("node")
        .with_attr("ID", control.id().to_string())
        .with_attr("type", control.control_type().name())
        .with_child(properties)
        .with_child(values)
        .with_child(messages)
        .with_child(children)
}

/// Decodes a `<node>` element and its subtree.
pub fn decode_control(element: &XmlElement) -> Result<Control, DecodeError> {
    if element.name != "node" {
        return Err(DecodeError::UnexpectedElement {
            parent: "children",
            found: element.name.clone(),
        });
    }

    let id_text = element.attr("ID").ok_or(DecodeError::MissingAttribute {
        element: "node",
        attribute: "ID",
    })?;
    let id = ControlId::parse(id_text).ok_or_else(|| DecodeError::InvalidId {
        found: id_text.to_string(),
    })?;

    let type_text = element.attr("type").ok_or(DecodeError::MissingAttribute {
        element: "node",
        attribute: "type",
    })?;
    let control_type =
        ControlType::from_name(type_text).ok_or_else(|| DecodeError::InvalidControlType {
            found: type_text.to_string(),
        })?;

    trace!("decoding {control_type} node {id}");
    let mut control = Control::with_id(id, control_type);

    for section in &element.children {
        match section.name.as_str() {
            "properties" => decode_properties(section, &mut control)?,
            "values" => decode_values(section, &mut control)?,
            "messages" => {
                for entry in &section.children {
                    control.messages.push(decode_message(entry)?);
                }
            }
            "children" => {
                for entry in &section.children {
                    control.children.push(decode_control(entry)?);
                }
            }
            other => warn!("ignoring <{other}> inside node {id}"),
        }
    }

    Ok(control)
}

fn decode_properties(section: &XmlElement, control: &mut Control) -> Result<(), DecodeError> {
    let mut seen = FxHashSet::with_capacity_and_hasher(section.children.len(), Default::default());
    for entry in &section.children {
        expect_tag(entry, "properties", "property")?;
        let property = decode_property(entry)?;
        if !seen.insert(property.key.clone()) {
            return Err(DecodeError::DuplicateKey {
                collection: "property",
                key: property.key,
            });
        }
        control.properties.push(property);
    }
    Ok(())
}

fn decode_values(section: &XmlElement, control: &mut Control) -> Result<(), DecodeError> {
    let mut seen = FxHashSet::with_capacity_and_hasher(section.children.len(), Default::default());
    for entry in &section.children {
        expect_tag(entry, "values", "value")?;
        let value = decode_value(entry)?;
        if !seen.insert(value.key) {
            return Err(DecodeError::DuplicateKey {
                collection: "value",
                key: value.key.to_string(),
            });
        }
        control.values.push(value);
    }
    Ok(())
}

fn expect_tag(entry: &XmlElement, parent: &'static str, tag: &str) -> Result<(), DecodeError> {
    if entry.name == tag {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedElement {
            parent,
            found: entry.name.clone(),
        })
    }
}
