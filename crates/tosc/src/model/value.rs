//! Runtime input-state descriptors attached to a control.

use std::fmt;

/// Keys a value may be stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Touch,
    X,
    Y,
    Page,
    Text,
}

impl ValueKey {
    /// Creates a ValueKey from its wire name.
    pub fn from_name(name: &str) -> Option<ValueKey> {
        match name {
            "touch" => Some(ValueKey::Touch),
            "x" => Some(ValueKey::X),
            "y" => Some(ValueKey::Y),
            "page" => Some(ValueKey::Page),
            "text" => Some(ValueKey::Text),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn name(self) -> &'static str {
        match self {
            ValueKey::Touch => "touch",
            ValueKey::X => "x",
            ValueKey::Y => "y",
            ValueKey::Page => "page",
            ValueKey::Text => "text",
        }
    }

    /// Returns true if defaults for this key are text rather than bool/float.
    pub fn is_textual(self) -> bool {
        matches!(self, ValueKey::Text)
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default payload of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Float(f64),
    Text(String),
}

impl DefaultValue {
    /// Renders the default as wire text.
    pub fn to_text(&self) -> String {
        match self {
            DefaultValue::Bool(b) => b.to_string(),
            DefaultValue::Float(v) => v.to_string(),
            DefaultValue::Text(s) => s.clone(),
        }
    }

    /// Parses wire text for the given key.
    ///
    /// Text keys keep the raw string; every other key takes `true`/`false`
    /// or a number.
    pub fn parse(key: ValueKey, text: &str) -> Option<DefaultValue> {
        if key.is_textual() {
            return Some(DefaultValue::Text(text.to_string()));
        }
        match text.trim() {
            "true" => Some(DefaultValue::Bool(true)),
            "false" => Some(DefaultValue::Bool(false)),
            other => other.parse().ok().map(DefaultValue::Float),
        }
    }

    /// Returns true if this default may be stored under `key`.
    pub fn fits(&self, key: ValueKey) -> bool {
        matches!(self, DefaultValue::Text(_)) == key.is_textual()
    }
}

/// A value descriptor (`<value>` inside `<values>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub key: ValueKey,
    pub locked: bool,
    pub locked_default_current: bool,
    pub default: DefaultValue,
    /// Pull towards the default, 0 to 100.
    pub default_pull: u8,
}

impl Value {
    /// Creates a value with the key's conventional default.
    pub fn new(key: ValueKey) -> Self {
        let default = match key {
            ValueKey::Touch => DefaultValue::Bool(false),
            ValueKey::Text => DefaultValue::Text(String::new()),
            _ => DefaultValue::Float(0.0),
        };
        Self {
            key,
            locked: false,
            locked_default_current: false,
            default,
            default_pull: 0,
        }
    }

    pub fn touch() -> Self {
        Self::new(ValueKey::Touch)
    }

    pub fn x() -> Self {
        Self::new(ValueKey::X)
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub fn with_pull(mut self, pull: u8) -> Self {
        self.default_pull = pull;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn locked_default_current(mut self, locked: bool) -> Self {
        self.locked_default_current = locked;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        for key in [ValueKey::Touch, ValueKey::X, ValueKey::Y, ValueKey::Page, ValueKey::Text] {
            assert_eq!(ValueKey::from_name(key.name()), Some(key));
        }
        assert_eq!(ValueKey::from_name("z"), None);
    }

    #[test]
    fn test_default_parse() {
        assert_eq!(DefaultValue::parse(ValueKey::Touch, "false"), Some(DefaultValue::Bool(false)));
        assert_eq!(DefaultValue::parse(ValueKey::X, "0.5"), Some(DefaultValue::Float(0.5)));
        assert_eq!(DefaultValue::parse(ValueKey::X, "half"), None);
        assert_eq!(
            DefaultValue::parse(ValueKey::Text, "1"),
            Some(DefaultValue::Text("1".into()))
        );
    }

    #[test]
    fn test_default_fits_key() {
        assert!(DefaultValue::Bool(true).fits(ValueKey::Touch));
        assert!(DefaultValue::Float(1.0).fits(ValueKey::X));
        assert!(!DefaultValue::Text("a".into()).fits(ValueKey::X));
        assert!(!DefaultValue::Float(1.0).fits(ValueKey::Text));
    }

    #[test]
    fn test_conventional_defaults() {
        assert_eq!(Value::touch().default, DefaultValue::Bool(false));
        assert_eq!(Value::x().default, DefaultValue::Float(0.0));
        assert_eq!(Value::new(ValueKey::Text).default, DefaultValue::Text(String::new()));
    }
}
