//! Typed properties of a control.
//!
//! A property pairs a key with a [`PropertyValue`]. The value's variant fixes
//! both the declared [`PropertyType`] and the payload shape, so a frame can
//! never carry scalar text and a string can never carry parameters.

use std::fmt;

/// Declared property types (`<property type="...">`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    String,
    Bool,
    Int,
    Float,
    Frame,
    Color,
}

impl PropertyType {
    /// Creates a PropertyType from its wire code.
    pub fn from_code(code: &str) -> Option<PropertyType> {
        match code {
            "s" => Some(PropertyType::String),
            "b" => Some(PropertyType::Bool),
            "i" => Some(PropertyType::Int),
            "f" => Some(PropertyType::Float),
            "r" => Some(PropertyType::Frame),
            "c" => Some(PropertyType::Color),
            _ => None,
        }
    }

    /// Returns the wire code used in the `type` attribute.
    pub fn code(self) -> &'static str {
        match self {
            PropertyType::String => "s",
            PropertyType::Bool => "b",
            PropertyType::Int => "i",
            PropertyType::Float => "f",
            PropertyType::Frame => "r",
            PropertyType::Color => "c",
        }
    }

    /// Parameter names of the fixed mapping, or `None` for scalar types.
    pub fn param_names(self) -> Option<&'static [&'static str; 4]> {
        match self {
            PropertyType::Frame => Some(&Frame::PARAMS),
            PropertyType::Color => Some(&Color::PARAMS),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::String => "String",
            PropertyType::Bool => "Bool",
            PropertyType::Int => "Int",
            PropertyType::Float => "Float",
            PropertyType::Frame => "Frame",
            PropertyType::Color => "Color",
        };
        f.write_str(name)
    }
}

/// Position and size of a control relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub const PARAMS: [&'static str; 4] = ["x", "y", "w", "h"];

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    fn components(&self) -> [f64; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

/// RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const PARAMS: [&'static str; 4] = ["r", "g", "b", "a"];

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    fn components(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Frame(Frame),
    Color(Color),
}

impl PropertyValue {
    /// Returns the declared type for this value.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Frame(_) => PropertyType::Frame,
            PropertyValue::Color(_) => PropertyType::Color,
        }
    }

    /// Renders the value as its wire payload.
    pub fn to_payload(&self) -> Payload {
        match self {
            PropertyValue::String(s) => Payload::Scalar(s.clone()),
            PropertyValue::Bool(b) => Payload::Scalar(if *b { "1" } else { "0" }.to_string()),
            PropertyValue::Int(i) => Payload::Scalar(i.to_string()),
            PropertyValue::Float(v) => Payload::Scalar(v.to_string()),
            PropertyValue::Frame(frame) => params(&Frame::PARAMS, frame.components()),
            PropertyValue::Color(color) => params(&Color::PARAMS, color.components()),
        }
    }

    /// Rebuilds a value from its declared type and wire payload.
    ///
    /// Returns a static reason on failure; the caller attaches the key.
    pub fn from_payload(
        property_type: PropertyType,
        payload: &Payload,
    ) -> Result<PropertyValue, &'static str> {
        match (property_type, payload) {
            (PropertyType::String, Payload::Scalar(s)) => Ok(PropertyValue::String(s.clone())),
            (PropertyType::Bool, Payload::Scalar(s)) => match s.trim() {
                "1" | "true" => Ok(PropertyValue::Bool(true)),
                "0" | "false" => Ok(PropertyValue::Bool(false)),
                _ => Err("bool payload must be 0 or 1"),
            },
            (PropertyType::Int, Payload::Scalar(s)) => s
                .trim()
                .parse()
                .map(PropertyValue::Int)
                .map_err(|_| "int payload is not an integer"),
            (PropertyType::Float, Payload::Scalar(s)) => s
                .trim()
                .parse()
                .map(PropertyValue::Float)
                .map_err(|_| "float payload is not a number"),
            (PropertyType::Frame, Payload::Params(p)) => {
                let [x, y, w, h] = read_params(&Frame::PARAMS, p)?;
                Ok(PropertyValue::Frame(Frame { x, y, w, h }))
            }
            (PropertyType::Color, Payload::Params(p)) => {
                let [r, g, b, a] = read_params(&Color::PARAMS, p)?;
                Ok(PropertyValue::Color(Color { r, g, b, a }))
            }
            (PropertyType::Frame | PropertyType::Color, Payload::Scalar(_)) => {
                Err("expected parameters, found scalar text")
            }
            (_, Payload::Params(_)) => Err("expected scalar text, found parameters"),
        }
    }
}

fn params(names: &[&'static str; 4], values: [f64; 4]) -> Payload {
    Payload::Params(
        names
            .iter()
            .zip(values)
            .map(|(name, v)| (name.to_string(), v.to_string()))
            .collect(),
    )
}

fn read_params(names: &[&'static str; 4], params: &[(String, String)]) -> Result<[f64; 4], &'static str> {
    if params.len() != names.len() {
        return Err("wrong number of parameters");
    }
    let mut out = [0.0; 4];
    for (slot, name) in out.iter_mut().zip(names) {
        let (_, text) = params
            .iter()
            .find(|(k, _)| k == name)
            .ok_or("missing parameter")?;
        *slot = text.trim().parse().map_err(|_| "parameter is not a number")?;
    }
    Ok(out)
}

/// Wire payload of a property: scalar text xor a named-parameter mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scalar(String),
    /// Parameter name/text pairs in wire order.
    Params(Vec<(String, String)>),
}

/// A named, typed attribute of a control.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(key: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, PropertyValue::String(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, PropertyValue::Bool(value))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, PropertyValue::Int(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, PropertyValue::Float(value))
    }

    pub fn frame(key: impl Into<String>, frame: Frame) -> Self {
        Self::new(key, PropertyValue::Frame(frame))
    }

    pub fn color(key: impl Into<String>, color: Color) -> Self {
        Self::new(key, PropertyValue::Color(color))
    }

    /// Returns the declared type of this property.
    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    /// Returns the text if this is a string property.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        for ty in [
            PropertyType::String,
            PropertyType::Bool,
            PropertyType::Int,
            PropertyType::Float,
            PropertyType::Frame,
            PropertyType::Color,
        ] {
            assert_eq!(PropertyType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(PropertyType::from_code("x"), None);
    }

    #[test]
    fn test_payload_shape_matches_type() {
        let frame = PropertyValue::Frame(Frame::new(0.0, 0.0, 400.0, 400.0));
        match frame.to_payload() {
            Payload::Params(p) => {
                let keys: Vec<_> = p.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["x", "y", "w", "h"]);
            }
            Payload::Scalar(_) => panic!("frame must be a parameter mapping"),
        }

        let color = PropertyValue::Color(Color::new(1.0, 0.0, 0.0, 1.0));
        match color.to_payload() {
            Payload::Params(p) => {
                let keys: Vec<_> = p.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["r", "g", "b", "a"]);
            }
            Payload::Scalar(_) => panic!("color must be a parameter mapping"),
        }

        assert_eq!(PropertyValue::Bool(true).to_payload(), Payload::Scalar("1".into()));
        assert_eq!(PropertyValue::Bool(false).to_payload(), Payload::Scalar("0".into()));
        assert_eq!(PropertyValue::Float(0.25).to_payload(), Payload::Scalar("0.25".into()));
    }

    #[test]
    fn test_from_payload_rejects_wrong_shape() {
        let scalar = Payload::Scalar("1".into());
        assert!(PropertyValue::from_payload(PropertyType::Frame, &scalar).is_err());

        let params = Payload::Params(vec![("x".into(), "1".into())]);
        assert!(PropertyValue::from_payload(PropertyType::String, &params).is_err());
        assert!(PropertyValue::from_payload(PropertyType::Frame, &params).is_err());
    }

    #[test]
    fn test_from_payload_params_any_order() {
        let params = Payload::Params(vec![
            ("h".into(), "4".into()),
            ("w".into(), "3".into()),
            ("y".into(), "2".into()),
            ("x".into(), "1".into()),
        ]);
        let value = PropertyValue::from_payload(PropertyType::Frame, &params).unwrap();
        assert_eq!(value, PropertyValue::Frame(Frame::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_from_payload_scalars() {
        let parse = |ty, s: &str| PropertyValue::from_payload(ty, &Payload::Scalar(s.into()));
        assert_eq!(parse(PropertyType::Bool, "1"), Ok(PropertyValue::Bool(true)));
        assert_eq!(parse(PropertyType::Bool, "false"), Ok(PropertyValue::Bool(false)));
        assert!(parse(PropertyType::Bool, "yes").is_err());
        assert_eq!(parse(PropertyType::Int, "-12"), Ok(PropertyValue::Int(-12)));
        assert!(parse(PropertyType::Int, "1.5").is_err());
        assert_eq!(parse(PropertyType::Float, "1"), Ok(PropertyValue::Float(1.0)));
        assert_eq!(parse(PropertyType::String, ""), Ok(PropertyValue::String(String::new())));
    }
}
