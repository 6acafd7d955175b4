//! Builder API for ergonomic control-tree construction.
//!
//! Provides a fluent interface for assembling a control with its properties,
//! values, messages and nested children. Checks run once, in [`build`].
//!
//! # Example
//!
//! ```rust
//! use tosc::model::builder::ControlBuilder;
//! use tosc::{ControlType, Frame, OscMessage, Value};
//!
//! let group = ControlBuilder::new(ControlType::Group)
//!     .name("mixer")
//!     .frame(Frame::new(0.0, 0.0, 800.0, 600.0))
//!     .child(ControlType::Fader, |c| c
//!         .name("volume")
//!         .value(Value::x())
//!         .message(OscMessage::default())
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(group.children().len(), 1);
//! ```
//!
//! [`build`]: ControlBuilder::build

use crate::error::ModelError;
use crate::model::{Color, Control, ControlType, Frame, Message, Property, Value};

/// Builder for constructing a [`Control`] subtree.
#[derive(Debug)]
pub struct ControlBuilder {
    control: Control,
    properties: Vec<Property>,
    values: Vec<Value>,
    messages: Vec<Message>,
    children: Vec<ControlBuilder>,
}

impl ControlBuilder {
    /// Starts from [`Control::new`]: a fresh ID and the default frame.
    pub fn new(control_type: ControlType) -> Self {
        Self::from_control(Control::new(control_type))
    }

    /// Starts from [`Control::with_defaults`].
    pub fn with_defaults(control_type: ControlType) -> Self {
        Self::from_control(Control::with_defaults(control_type))
    }

    fn from_control(control: Control) -> Self {
        Self {
            control,
            properties: Vec::new(),
            values: Vec::new(),
            messages: Vec::new(),
            children: Vec::new(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Sets a property, replacing any existing property with the same key.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.property(Property::string("name", name))
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.property(Property::string("tag", tag))
    }

    pub fn script(self, script: impl Into<String>) -> Self {
        self.property(Property::string("script", script))
    }

    pub fn frame(self, frame: Frame) -> Self {
        self.property(Property::frame("frame", frame))
    }

    pub fn color(self, color: Color) -> Self {
        self.property(Property::color("color", color))
    }

    // =========================================================================
    // Values and messages
    // =========================================================================

    /// Adds a value. A duplicate key fails at [`build`](Self::build).
    pub fn value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    /// Adds a message under its own kind.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.messages.push(message.into());
        self
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Adds a child built with a nested builder function.
    pub fn child<F>(mut self, control_type: ControlType, f: F) -> Self
    where
        F: FnOnce(ControlBuilder) -> ControlBuilder,
    {
        self.children.push(f(ControlBuilder::new(control_type)));
        self
    }

    /// Adds an already constructed child.
    pub fn child_control(mut self, control: Control) -> Self {
        self.children.push(Self::from_control(control));
        self
    }

    /// Returns the number of direct children added so far.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Builds the control, applying every staged addition in order.
    pub fn build(self) -> Result<Control, ModelError> {
        let mut control = self.control;
        for property in self.properties {
            control.upsert_property(property);
        }
        for value in self.values {
            control.add_value(value)?;
        }
        for message in self.messages {
            control.add_message(message.kind(), message)?;
        }
        for child in self.children {
            control.add_child(child.build()?)?;
        }
        Ok(control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalMessage, MessageKind, MidiMessage, ValueKey};

    #[test]
    fn test_builder_basic() {
        let control = ControlBuilder::new(ControlType::Button)
            .name("play")
            .tag("transport")
            .value(Value::touch())
            .message(MidiMessage::default())
            .message(LocalMessage::default())
            .build()
            .unwrap();

        assert_eq!(control.name(), Some("play"));
        assert!(control.has_property("frame"));
        assert!(control.has_value(ValueKey::Touch));
        assert_eq!(control.messages().get(MessageKind::Midi).len(), 1);
        assert_eq!(control.messages().get(MessageKind::Local).len(), 1);
    }

    #[test]
    fn test_builder_nested_children() {
        let builder = ControlBuilder::new(ControlType::Group)
            .name("outer")
            .child(ControlType::Group, |g| g
                .name("inner")
                .child(ControlType::Label, |l| l.name("caption"))
            )
            .child(ControlType::Fader, |f| f.name("level"));
        assert_eq!(builder.child_count(), 2);

        let root = builder.build().unwrap();
        assert_eq!(root.control_count(), 4);
        assert_eq!(root.children()[0].children()[0].name(), Some("caption"));
        assert_eq!(root.children()[1].name(), Some("level"));
    }

    #[test]
    fn test_builder_later_property_wins() {
        let control = ControlBuilder::with_defaults(ControlType::Label)
            .name("a")
            .name("b")
            .build()
            .unwrap();
        assert_eq!(control.name(), Some("b"));
        assert_eq!(
            control.properties().iter().filter(|p| p.key == "name").count(),
            1
        );
    }

    #[test]
    fn test_builder_reports_first_error() {
        let err = ControlBuilder::new(ControlType::Button)
            .child(ControlType::Label, |l| l)
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::NotAContainer { control_type: ControlType::Button });

        let err = ControlBuilder::new(ControlType::Fader)
            .value(Value::x())
            .value(Value::x())
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { collection: "value", .. }));
    }
}
