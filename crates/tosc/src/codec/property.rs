//! Property encoding/decoding.
//!
//! ```text
//! <property type="s"><key>name</key><value>fader1</value></property>
//! <property type="r"><key>frame</key><value><x>0</x><y>0</y><w>400</w><h>400</h></value></property>
//! ```

use log::warn;

use crate::codec::xml::XmlElement;
use crate::error::DecodeError;
use crate::model::{Payload, Property, PropertyType, PropertyValue};

/// Encodes a property as a `<property>` element.
pub fn encode_property(property: &Property) -> XmlElement {
    let value = match property.value.to_payload() {
        Payload::Scalar(text) => XmlElement::leaf("value", text),
        Payload::Params(params) => {
            let mut value = XmlElement::new("value");
            for (name, text) in params {
                value.push(XmlElement::leaf(name, text));
            }
            value
        }
    };
    XmlElement::new("property")
        .with_attr("type", property.property_type().code())
        .with_child(XmlElement::leaf("key", property.key.as_str()))
        .with_child(value)
}

/// Decodes a `<property>` element.
pub fn decode_property(element: &XmlElement) -> Result<Property, DecodeError> {
    let code = element.attr("type").ok_or(DecodeError::MissingAttribute {
        element: "property",
        attribute: "type",
    })?;
    let property_type = PropertyType::from_code(code).ok_or_else(|| {
        DecodeError::InvalidPropertyType {
            found: code.to_string(),
        }
    })?;
    let key = element
        .child_text("key")
        .ok_or(DecodeError::MissingElement {
            parent: "property",
            element: "key",
        })?
        .to_string();

    let malformed = |reason| DecodeError::MalformedProperty {
        key: key.clone(),
        reason,
    };

    let value = element
        .child("value")
        .ok_or_else(|| malformed("missing <value>"))?;
    let payload = decode_payload(value).map_err(malformed)?;
    let value = PropertyValue::from_payload(property_type, &payload).map_err(malformed)?;

    for extra in element.children.iter().filter(|c| c.name != "key" && c.name != "value") {
        warn!("ignoring <{}> inside property {key:?}", extra.name);
    }

    Ok(Property { key, value })
}

/// Splits a `<value>` element into scalar text or parameters.
fn decode_payload(value: &XmlElement) -> Result<Payload, &'static str> {
    if value.children.is_empty() {
        return Ok(Payload::Scalar(value.text.clone()));
    }
    if value.has_text() {
        return Err("value holds both text and parameters");
    }
    value
        .children
        .iter()
        .map(|param| {
            if param.children.is_empty() {
                Ok((param.name.clone(), param.text.clone()))
            } else {
                Err("parameter holds nested elements")
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Payload::Params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml;
    use crate::model::{Color, Frame};

    fn decode_str(s: &str) -> Result<Property, DecodeError> {
        decode_property(&xml::parse(s.as_bytes(), 16).unwrap())
    }

    #[test]
    fn test_encode_shapes() {
        let frame = encode_property(&Property::frame("frame", Frame::new(0.0, 0.0, 400.0, 400.0)));
        assert_eq!(frame.attr("type"), Some("r"));
        assert_eq!(frame.child_text("key"), Some("frame"));
        let params: Vec<_> = frame.child("value").unwrap().children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(params, ["x", "y", "w", "h"]);

        let flag = encode_property(&Property::bool("visible", true));
        assert_eq!(flag.attr("type"), Some("b"));
        assert_eq!(flag.child_text("value"), Some("1"));
    }

    #[test]
    fn test_decode_scalar_and_params() {
        let name = decode_str(
            r#"<property type="s"><key>name</key><value>fader 1</value></property>"#,
        )
        .unwrap();
        assert_eq!(name, Property::string("name", "fader 1"));

        let color = decode_str(
            "<property type=\"c\">\n  <key>color</key>\n  <value>\n    <r>1</r><g>0.5</g><b>0</b><a>1</a>\n  </value>\n</property>",
        )
        .unwrap();
        assert_eq!(color, Property::color("color", Color::new(1.0, 0.5, 0.0, 1.0)));

        let empty = decode_str(r#"<property type="s"><key>script</key><value/></property>"#).unwrap();
        assert_eq!(empty, Property::string("script", ""));
    }

    #[test]
    fn test_decode_both_or_neither_is_malformed() {
        let both = decode_str(
            r#"<property type="r"><key>frame</key><value>1<x>0</x><y>0</y><w>1</w><h>1</h></value></property>"#,
        );
        assert!(matches!(both, Err(DecodeError::MalformedProperty { .. })));

        let neither = decode_str(r#"<property type="r"><key>frame</key><value/></property>"#);
        assert!(matches!(neither, Err(DecodeError::MalformedProperty { .. })));

        let empty_int = decode_str(r#"<property type="i"><key>steps</key><value></value></property>"#);
        assert!(matches!(empty_int, Err(DecodeError::MalformedProperty { .. })));

        let missing = decode_str(r#"<property type="f"><key>cornerRadius</key></property>"#);
        assert!(matches!(missing, Err(DecodeError::MalformedProperty { .. })));
    }

    #[test]
    fn test_decode_type_errors() {
        let err = decode_str(r#"<property type="q"><key>k</key><value>1</value></property>"#)
            .unwrap_err();
        assert_eq!(err, DecodeError::InvalidPropertyType { found: "q".into() });

        let err = decode_str(r#"<property><key>k</key><value>1</value></property>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { attribute: "type", .. }));

        let err = decode_str(r#"<property type="s"><value>1</value></property>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { element: "key", .. }));
    }

    #[test]
    fn test_encode_decode_every_type() {
        for property in [
            Property::string("tag", "a & <b>"),
            Property::bool("locked", false),
            Property::int("textSize", -14),
            Property::float("cornerRadius", 2.5),
            Property::frame("frame", Frame::new(1.5, 2.0, 3.0, 4.25)),
            Property::color("color", Color::new(0.25, 0.25, 0.25, 1.0)),
        ] {
            assert_eq!(decode_property(&encode_property(&property)).unwrap(), property);
        }
    }
}
