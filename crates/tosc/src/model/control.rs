//! Control tree nodes and the document that holds them.

use std::fmt;

use crate::error::ModelError;
use crate::limits::{LEXML_VERSION, MAX_DEFAULT_PULL};
use crate::model::bundle;
use crate::model::{
    Color, ControlId, Frame, Message, MessageKind, Messages, Property, PropertyValue, Value,
    ValueKey,
};

/// The fixed set of control types (`<node type="...">`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlType {
    Box,
    Button,
    Encoder,
    Fader,
    Grid,
    Group,
    Label,
    Page,
    Pager,
    Radar,
    Radial,
    Radio,
    Text,
    Xy,
}

impl ControlType {
    pub const ALL: [ControlType; 14] = [
        ControlType::Box,
        ControlType::Button,
        ControlType::Encoder,
        ControlType::Fader,
        ControlType::Grid,
        ControlType::Group,
        ControlType::Label,
        ControlType::Page,
        ControlType::Pager,
        ControlType::Radar,
        ControlType::Radial,
        ControlType::Radio,
        ControlType::Text,
        ControlType::Xy,
    ];

    /// Creates a ControlType from its wire name.
    pub fn from_name(name: &str) -> Option<ControlType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Returns the wire name.
    pub fn name(self) -> &'static str {
        match self {
            ControlType::Box => "BOX",
            ControlType::Button => "BUTTON",
            ControlType::Encoder => "ENCODER",
            ControlType::Fader => "FADER",
            ControlType::Grid => "GRID",
            ControlType::Group => "GROUP",
            ControlType::Label => "LABEL",
            ControlType::Page => "PAGE",
            ControlType::Pager => "PAGER",
            ControlType::Radar => "RADAR",
            ControlType::Radial => "RADIAL",
            ControlType::Radio => "RADIO",
            ControlType::Text => "TEXT",
            ControlType::Xy => "XY",
        }
    }

    /// Returns true if controls of this type may hold children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ControlType::Group | ControlType::Grid | ControlType::Pager | ControlType::Page
        )
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the control tree.
///
/// The control owns its four collections and all of its children. Property
/// and value keys are unique within one control; the mutators below keep
/// them that way. The identifier is fixed at construction.
#[derive(Debug, PartialEq)]
pub struct Control {
    id: ControlId,
    pub(crate) control_type: ControlType,
    pub(crate) properties: Vec<Property>,
    pub(crate) values: Vec<Value>,
    pub(crate) messages: Messages,
    pub(crate) children: Vec<Control>,
}

impl Control {
    /// Default frame given to every new control.
    pub const DEFAULT_FRAME: Frame = Frame {
        x: 0.0,
        y: 0.0,
        w: 400.0,
        h: 400.0,
    };

    /// Creates a control with a fresh ID and a default `frame` property.
    pub fn new(control_type: ControlType) -> Self {
        let mut control = Self::empty(control_type);
        control
            .properties
            .push(Property::frame("frame", Self::DEFAULT_FRAME));
        control
    }

    /// Creates a control with a fresh ID and no properties at all.
    pub fn empty(control_type: ControlType) -> Self {
        Self::with_id(ControlId::new(), control_type)
    }

    /// Creates a control carrying the full default property bundle of its type.
    pub fn with_defaults(control_type: ControlType) -> Self {
        let mut control = Self::new(control_type);
        for property in bundle::default_properties(control_type) {
            control.upsert_property(property.clone());
        }
        control
    }

    /// Creates an empty control with an existing ID (used by the decoder).
    pub(crate) fn with_id(id: ControlId, control_type: ControlType) -> Self {
        Self {
            id,
            control_type,
            properties: Vec::new(),
            values: Vec::new(),
            messages: Messages::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn control_type(&self) -> ControlType {
        self.control_type
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn children(&self) -> &[Control] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Control> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Control> {
        self.children.get_mut(index)
    }

    /// Mutable access to every child, for edits that keep child order.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.children.iter_mut()
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Appends a child. Fails unless this control is a container type.
    pub fn add_child(&mut self, child: Control) -> Result<&mut Self, ModelError> {
        if !self.control_type.is_container() {
            return Err(ModelError::NotAContainer {
                control_type: self.control_type,
            });
        }
        self.children.push(child);
        Ok(self)
    }

    /// Detaches and returns the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Control> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }

    /// Appends a property. Fails if the key is already present.
    pub fn add_property(&mut self, property: Property) -> Result<&mut Self, ModelError> {
        if self.has_property(&property.key) {
            return Err(ModelError::DuplicateKey {
                collection: "property",
                key: property.key,
            });
        }
        self.properties.push(property);
        Ok(self)
    }

    /// Replaces the payload of an existing property, keeping its position.
    ///
    /// Fails with `KeyNotFound` if no property has this key, and with
    /// `TypeMismatch` if the new payload has a different type.
    pub fn set_property(
        &mut self,
        key: &str,
        value: PropertyValue,
    ) -> Result<&mut Self, ModelError> {
        let property = self
            .properties
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| ModelError::KeyNotFound {
                collection: "property",
                key: key.to_string(),
            })?;
        if property.property_type() != value.property_type() {
            return Err(ModelError::PropertyTypeMismatch {
                key: key.to_string(),
                expected: property.property_type(),
                found: value.property_type(),
            });
        }
        property.value = value;
        Ok(self)
    }

    /// Replaces the property with the same key in place, or appends it.
    pub fn upsert_property(&mut self, property: Property) -> &mut Self {
        match self.properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Property> {
        let index = self.properties.iter().position(|p| p.key == key)?;
        Some(self.properties.remove(index))
    }

    pub fn name(&self) -> Option<&str> {
        self.property("name").and_then(Property::as_str)
    }

    pub fn frame(&self) -> Option<Frame> {
        match self.property("frame")?.value {
            PropertyValue::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self.property("color")?.value {
            PropertyValue::Color(color) => Some(color),
            _ => None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.upsert_property(Property::string("name", name))
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.upsert_property(Property::string("tag", tag))
    }

    pub fn set_script(&mut self, script: impl Into<String>) -> &mut Self {
        self.upsert_property(Property::string("script", script))
    }

    pub fn set_frame(&mut self, frame: Frame) -> &mut Self {
        self.upsert_property(Property::frame("frame", frame))
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.upsert_property(Property::color("color", color))
    }

    pub fn set_locked(&mut self, locked: bool) -> &mut Self {
        self.upsert_property(Property::bool("locked", locked))
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.upsert_property(Property::bool("visible", visible))
    }

    pub fn set_interactive(&mut self, interactive: bool) -> &mut Self {
        self.upsert_property(Property::bool("interactive", interactive))
    }

    pub fn set_background(&mut self, background: bool) -> &mut Self {
        self.upsert_property(Property::bool("background", background))
    }

    pub fn set_outline(&mut self, outline: bool) -> &mut Self {
        self.upsert_property(Property::bool("outline", outline))
    }

    // =========================================================================
    // Values
    // =========================================================================

    pub fn value(&self, key: ValueKey) -> Option<&Value> {
        self.values.iter().find(|v| v.key == key)
    }

    pub fn has_value(&self, key: ValueKey) -> bool {
        self.value(key).is_some()
    }

    /// Appends a value. Fails on a duplicate key, a default that does not fit
    /// the key, or a pull above 100.
    pub fn add_value(&mut self, value: Value) -> Result<&mut Self, ModelError> {
        check_value(&value)?;
        if self.has_value(value.key) {
            return Err(ModelError::DuplicateKey {
                collection: "value",
                key: value.key.to_string(),
            });
        }
        self.values.push(value);
        Ok(self)
    }

    /// Replaces the value with the same key, keeping its position.
    pub fn set_value(&mut self, value: Value) -> Result<&mut Self, ModelError> {
        check_value(&value)?;
        let existing = self
            .values
            .iter_mut()
            .find(|v| v.key == value.key)
            .ok_or_else(|| ModelError::KeyNotFound {
                collection: "value",
                key: value.key.to_string(),
            })?;
        *existing = value;
        Ok(self)
    }

    pub fn remove_value(&mut self, key: ValueKey) -> Option<Value> {
        let index = self.values.iter().position(|v| v.key == key)?;
        Some(self.values.remove(index))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Appends a message under `kind`. Fails if the message is another kind.
    pub fn add_message(
        &mut self,
        kind: MessageKind,
        message: impl Into<Message>,
    ) -> Result<&mut Self, ModelError> {
        let message = message.into();
        if message.kind() != kind {
            return Err(ModelError::TypeMismatch {
                expected: kind.to_string(),
                found: message.kind().to_string(),
            });
        }
        self.messages.push(message);
        Ok(self)
    }

    /// Removes and returns every message of `kind`.
    pub fn remove_messages(&mut self, kind: MessageKind) -> Vec<Message> {
        self.messages.take(kind)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Visits this control and all descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Control)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Number of controls in this subtree, including this one.
    pub fn control_count(&self) -> usize {
        1 + self.children.iter().map(Control::control_count).sum::<usize>()
    }

    /// Deep copy with a fresh ID for this control and every descendant.
    pub fn duplicate(&self) -> Control {
        Control {
            id: ControlId::new(),
            control_type: self.control_type,
            properties: self.properties.clone(),
            values: self.values.clone(),
            messages: self.messages.clone(),
            children: self.children.iter().map(Control::duplicate).collect(),
        }
    }
}

fn check_value(value: &Value) -> Result<(), ModelError> {
    if value.default_pull > MAX_DEFAULT_PULL {
        return Err(ModelError::PullOutOfRange {
            pull: value.default_pull,
        });
    }
    if !value.default.fits(value.key) {
        return Err(ModelError::TypeMismatch {
            expected: if value.key.is_textual() { "text default" } else { "bool or float default" }
                .to_string(),
            found: value.default.to_text(),
        });
    }
    Ok(())
}

/// A control tree with its format version.
#[derive(Debug, PartialEq)]
pub struct Document {
    version: u32,
    pub root: Control,
}

impl Document {
    /// Creates a document whose root is a fresh GROUP.
    pub fn new() -> Self {
        Self::with_root(Control::new(ControlType::Group))
    }

    /// Creates a document whose root GROUP has the given frame.
    pub fn with_frame(frame: Frame) -> Self {
        let mut root = Control::new(ControlType::Group);
        root.set_frame(frame);
        Self::with_root(root)
    }

    pub fn with_root(root: Control) -> Self {
        Self {
            version: LEXML_VERSION,
            root,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefaultValue, LocalMessage, MidiMessage, OscMessage, PropertyType};

    #[test]
    fn test_type_names() {
        for ty in ControlType::ALL {
            assert_eq!(ControlType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ControlType::from_name("KNOB"), None);
        assert_eq!(ControlType::from_name("group"), None);
    }

    #[test]
    fn test_new_control_has_default_frame() {
        let control = Control::new(ControlType::Button);
        assert_eq!(control.control_type(), ControlType::Button);
        assert_eq!(control.frame(), Some(Frame::new(0.0, 0.0, 400.0, 400.0)));
        assert_eq!(control.properties().len(), 1);
        assert!(control.values().is_empty());
        assert!(control.messages().is_empty());
        assert!(control.children().is_empty());
    }

    #[test]
    fn test_fresh_ids_per_construction() {
        let a = Control::new(ControlType::Group);
        let b = Control::new(ControlType::Group);
        let c = Control::empty(ControlType::Group);
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn test_add_chaining() {
        let mut group = Control::new(ControlType::Group);
        group
            .add_property(Property::string("name", "main"))
            .unwrap()
            .add_value(Value::touch())
            .unwrap()
            .add_message(MessageKind::Osc, OscMessage::default())
            .unwrap()
            .add_child(Control::new(ControlType::Button))
            .unwrap();

        assert_eq!(group.name(), Some("main"));
        assert!(group.has_value(ValueKey::Touch));
        assert_eq!(group.messages().get(MessageKind::Osc).len(), 1);
        assert_eq!(group.children().len(), 1);
    }

    #[test]
    fn test_add_message_kind_mismatch() {
        let mut control = Control::new(ControlType::Fader);
        let err = control
            .add_message(MessageKind::Osc, MidiMessage::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
        assert!(control.messages().is_empty());

        control.add_message(MessageKind::Local, LocalMessage::default()).unwrap();
        assert_eq!(control.messages().len(), 1);
    }

    #[test]
    fn test_add_child_to_leaf_fails() {
        let mut button = Control::new(ControlType::Button);
        let err = button.add_child(Control::new(ControlType::Label)).unwrap_err();
        assert_eq!(
            err,
            ModelError::NotAContainer { control_type: ControlType::Button }
        );
        assert!(button.children().is_empty());
    }

    #[test]
    fn test_duplicate_property_key_rejected() {
        let mut control = Control::new(ControlType::Label);
        let err = control
            .add_property(Property::frame("frame", Frame::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { collection: "property", .. }));
        assert_eq!(control.properties().len(), 1);
    }

    #[test]
    fn test_set_property_absent_key_is_key_not_found() {
        let mut control = Control::new(ControlType::Label);
        let err = control
            .set_property("name", PropertyValue::String("x".into()))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::KeyNotFound { collection: "property", key: "name".into() }
        );
        assert!(!control.has_property("name"));
    }

    #[test]
    fn test_set_property_replaces_in_place() {
        let mut control = Control::new(ControlType::Label);
        control.add_property(Property::string("name", "a")).unwrap();
        control
            .set_property("frame", PropertyValue::Frame(Frame::new(1.0, 2.0, 3.0, 4.0)))
            .unwrap();

        assert_eq!(control.properties()[0].key, "frame");
        assert_eq!(control.frame(), Some(Frame::new(1.0, 2.0, 3.0, 4.0)));

        let err = control
            .set_property("frame", PropertyValue::String("wide".into()))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::PropertyTypeMismatch {
                key: "frame".into(),
                expected: PropertyType::Frame,
                found: PropertyType::String,
            }
        );
    }

    #[test]
    fn test_upsert_keeps_keys_unique() {
        let mut control = Control::new(ControlType::Box);
        control.set_name("a").set_name("b").set_color(Color::new(1.0, 0.0, 0.0, 1.0));
        control.set_frame(Frame::new(0.0, 0.0, 10.0, 10.0));

        let keys: Vec<_> = control.properties().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["frame", "name", "color"]);
        assert_eq!(control.name(), Some("b"));
    }

    #[test]
    fn test_values_add_set_remove() {
        let mut control = Control::new(ControlType::Button);
        control.add_value(Value::touch()).unwrap();

        let err = control.add_value(Value::touch()).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey { collection: "value", .. }));

        let err = control.set_value(Value::x()).unwrap_err();
        assert!(matches!(err, ModelError::KeyNotFound { collection: "value", .. }));

        control
            .set_value(Value::touch().locked(true).with_default(DefaultValue::Bool(true)))
            .unwrap();
        assert!(control.value(ValueKey::Touch).unwrap().locked);

        let err = control.add_value(Value::x().with_pull(101)).unwrap_err();
        assert_eq!(err, ModelError::PullOutOfRange { pull: 101 });

        let err = control
            .add_value(Value::x().with_default(DefaultValue::Text("abc".into())))
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));

        assert!(control.remove_value(ValueKey::Touch).is_some());
        assert!(control.values().is_empty());
    }

    #[test]
    fn test_duplicate_regenerates_ids() {
        let mut group = Control::new(ControlType::Group);
        group.add_child(Control::new(ControlType::Button)).unwrap();
        let copy = group.duplicate();

        assert_ne!(copy.id(), group.id());
        assert_ne!(copy.children()[0].id(), group.children()[0].id());
        assert_eq!(copy.properties(), group.properties());
        assert_eq!(copy.control_count(), 2);
    }

    #[test]
    fn test_walk_preorder() {
        let mut root = Control::new(ControlType::Group);
        let mut inner = Control::new(ControlType::Group);
        inner.set_name("inner");
        inner.add_child(Control::new(ControlType::Label)).unwrap();
        root.add_child(inner).unwrap();
        root.add_child(Control::new(ControlType::Fader)).unwrap();

        let mut types = Vec::new();
        root.walk(&mut |c| types.push(c.control_type()));
        assert_eq!(
            types,
            [ControlType::Group, ControlType::Group, ControlType::Label, ControlType::Fader]
        );
        assert_eq!(root.control_count(), 4);
    }

    #[test]
    fn test_document_defaults() {
        let doc = Document::new();
        assert_eq!(doc.version(), 3);
        assert_eq!(doc.root.control_type(), ControlType::Group);

        let doc = Document::with_frame(Frame::new(0.0, 0.0, 1024.0, 768.0));
        assert_eq!(doc.root.frame(), Some(Frame::new(0.0, 0.0, 1024.0, 768.0)));
    }
}
