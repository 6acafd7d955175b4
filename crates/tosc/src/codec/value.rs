//! Value encoding/decoding.
//!
//! Fields are written in a fixed order:
//!
//! ```text
//! <value><key>x</key><locked>0</locked><lockedDefaultCurrent>0</lockedDefaultCurrent>
//!        <default>0.5</default><defaultPull>0</defaultPull></value>
//! ```

use crate::codec::primitives::{flag, invalid, push_field, Fields};
use crate::codec::xml::XmlElement;
use crate::error::DecodeError;
use crate::limits::MAX_DEFAULT_PULL;
use crate::model::{DefaultValue, Value, ValueKey};

/// Encodes a value as a `<value>` element.
pub fn encode_value(value: &Value) -> XmlElement {
    let mut element = XmlElement::new("value");
    push_field(&mut element, "key", value.key.name());
    push_field(&mut element, "locked", flag(value.locked));
    push_field(
        &mut element,
        "lockedDefaultCurrent",
        flag(value.locked_default_current),
    );
    push_field(&mut element, "default", value.default.to_text());
    push_field(&mut element, "defaultPull", value.default_pull.to_string());
    element
}

/// Decodes a `<value>` element.
pub fn decode_value(element: &XmlElement) -> Result<Value, DecodeError> {
    let fields = Fields::new(element, "value");
    let key = fields.parse("key", ValueKey::from_name)?;

    let default_text = fields.text("default")?;
    let default = DefaultValue::parse(key, default_text)
        .ok_or_else(|| invalid("default", default_text))?;

    let default_pull = fields.u8("defaultPull")?;
    if default_pull > MAX_DEFAULT_PULL {
        return Err(invalid("defaultPull", &default_pull.to_string()));
    }

    Ok(Value {
        key,
        locked: fields.flag("locked")?,
        locked_default_current: fields.flag("lockedDefaultCurrent")?,
        default,
        default_pull,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml;

    fn decode_str(s: &str) -> Result<Value, DecodeError> {
        decode_value(&xml::parse(s.as_bytes(), 16).unwrap())
    }

    #[test]
    fn test_field_order() {
        let element = encode_value(&Value::touch());
        let names: Vec<_> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["key", "locked", "lockedDefaultCurrent", "default", "defaultPull"]);
        assert_eq!(element.child_text("default"), Some("false"));
        assert_eq!(element.child_text("locked"), Some("0"));
    }

    #[test]
    fn test_decode() {
        let value = decode_str(
            "<value><key>x</key><locked>1</locked><lockedDefaultCurrent>0</lockedDefaultCurrent>\
             <default>0.5</default><defaultPull>25</defaultPull></value>",
        )
        .unwrap();
        assert_eq!(
            value,
            Value::x()
                .locked(true)
                .with_default(DefaultValue::Float(0.5))
                .with_pull(25)
        );
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_str(
            "<value><key>z</key><locked>0</locked><lockedDefaultCurrent>0</lockedDefaultCurrent>\
             <default>0</default><defaultPull>0</defaultPull></value>",
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::InvalidField { field: "key", found: "z".into() });

        let err = decode_str(
            "<value><key>x</key><locked>0</locked><lockedDefaultCurrent>0</lockedDefaultCurrent>\
             <default>0</default><defaultPull>101</defaultPull></value>",
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "defaultPull", .. }));

        let err = decode_str("<value><key>touch</key></value>").unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { parent: "value", .. }));
    }

    #[test]
    fn test_encode_decode_keys() {
        for value in [
            Value::touch().locked_default_current(true),
            Value::new(ValueKey::Y).with_default(DefaultValue::Float(-0.125)).with_pull(100),
            Value::new(ValueKey::Page).with_default(DefaultValue::Float(2.0)),
            Value::new(ValueKey::Text).with_default(DefaultValue::Text("  hi  ".into())),
        ] {
            assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
        }
    }
}
