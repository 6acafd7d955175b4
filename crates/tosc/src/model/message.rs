//! Message bindings: OSC, MIDI and local links triggered by value changes.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{ControlId, ValueKey};

/// The three message kinds, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Osc,
    Midi,
    Local,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [MessageKind::Osc, MessageKind::Midi, MessageKind::Local];

    /// Creates a MessageKind from its XML tag.
    pub fn from_tag(tag: &str) -> Option<MessageKind> {
        match tag {
            "osc" => Some(MessageKind::Osc),
            "midi" => Some(MessageKind::Midi),
            "local" => Some(MessageKind::Local),
            _ => None,
        }
    }

    /// Returns the XML tag.
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Osc => "osc",
            MessageKind::Midi => "midi",
            MessageKind::Local => "local",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Creates the variant from its wire name.
            pub fn from_name(name: &str) -> Option<$name> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Returns the wire name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// Edge on which a trigger fires.
    TriggerCondition {
        Any => "ANY",
        Rise => "RISE",
        Fall => "FALL",
    }
}

wire_enum! {
    /// Source of a partial's content.
    PartialType {
        Constant => "CONSTANT",
        Index => "INDEX",
        Value => "VALUE",
        Property => "PROPERTY",
    }
}

wire_enum! {
    /// Conversion applied to a partial's content.
    Conversion {
        Boolean => "BOOLEAN",
        Integer => "INTEGER",
        Float => "FLOAT",
        String => "STRING",
    }
}

wire_enum! {
    /// MIDI status types.
    MidiMessageType {
        NoteOff => "NOTE_OFF",
        NoteOn => "NOTE_ON",
        PolyPressure => "POLYPRESSURE",
        ControlChange => "CONTROLCHANGE",
        ProgramChange => "PROGRAMCHANGE",
        ChannelPressure => "CHANNELPRESSURE",
        PitchBend => "PITCHBEND",
        SystemExclusive => "SYSTEMEXCLUSIVE",
    }
}

/// Condition that activates a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub var: ValueKey,
    pub condition: TriggerCondition,
}

impl Trigger {
    pub fn new(var: ValueKey, condition: TriggerCondition) -> Self {
        Self { var, condition }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(ValueKey::X, TriggerCondition::Any)
    }
}

/// One segment of an OSC address or argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    pub kind: PartialType,
    pub conversion: Conversion,
    pub value: String,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Partial {
    /// A constant string segment.
    pub fn constant(value: impl Into<String>) -> Self {
        Self {
            kind: PartialType::Constant,
            conversion: Conversion::String,
            value: value.into(),
            scale_min: 0.0,
            scale_max: 1.0,
        }
    }

    /// A segment read from one of the control's properties.
    pub fn property(key: impl Into<String>) -> Self {
        Self {
            kind: PartialType::Property,
            ..Self::constant(key)
        }
    }

    /// A segment read from one of the control's values, scaled to a range.
    pub fn value(key: ValueKey, conversion: Conversion, scale_min: f64, scale_max: f64) -> Self {
        Self {
            kind: PartialType::Value,
            conversion,
            value: key.name().to_string(),
            scale_min,
            scale_max,
        }
    }

    /// The index of the control within its parent.
    pub fn index() -> Self {
        Self {
            kind: PartialType::Index,
            conversion: Conversion::Integer,
            value: String::new(),
            scale_min: 0.0,
            scale_max: 1.0,
        }
    }
}

impl Default for Partial {
    fn default() -> Self {
        Self::constant("/")
    }
}

/// Bitmask of enabled connections, written as a fixed-width bit string
/// (`"00001"` is connection 1, `"00011"` connections 1 and 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connections {
    mask: u32,
    width: u8,
}

impl Connections {
    pub const DEFAULT_WIDTH: u8 = 5;

    /// Enables the given 1-based connections.
    pub fn channels(channels: impl IntoIterator<Item = u8>) -> Self {
        let mut mask = 0u32;
        let mut width = Self::DEFAULT_WIDTH;
        for ch in channels.into_iter().filter(|ch| (1..=32).contains(ch)) {
            mask |= 1 << (ch - 1);
            width = width.max(ch);
        }
        Self { mask, width }
    }

    /// Parses a bit string of `0`/`1` characters, rightmost bit is connection 1.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() > 32 || !s.bytes().all(|b| b == b'0' || b == b'1') {
            return None;
        }
        let mask = u32::from_str_radix(s, 2).ok()?;
        Some(Self {
            mask,
            width: s.len() as u8,
        })
    }

    /// Returns true if the 1-based connection is enabled.
    pub fn is_enabled(&self, channel: u8) -> bool {
        (1..=32).contains(&channel) && self.mask & (1 << (channel - 1)) != 0
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }
}

impl Default for Connections {
    fn default() -> Self {
        Self::channels([1])
    }
}

impl fmt::Display for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.mask, width = self.width as usize)
    }
}

/// An OSC message binding.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub enabled: bool,
    pub send: bool,
    pub receive: bool,
    pub feedback: bool,
    pub connections: Connections,
    pub triggers: Vec<Trigger>,
    /// Address segments, concatenated in order.
    pub path: Vec<Partial>,
    pub arguments: Vec<Partial>,
}

impl Default for OscMessage {
    /// `/` + the control's name, sending `x` as a float.
    fn default() -> Self {
        Self {
            enabled: true,
            send: true,
            receive: true,
            feedback: false,
            connections: Connections::default(),
            triggers: vec![Trigger::default()],
            path: vec![Partial::constant("/"), Partial::property("name")],
            arguments: vec![Partial::value(ValueKey::X, Conversion::Float, 0.0, 1.0)],
        }
    }
}

/// Status descriptor of a MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiDescriptor {
    pub kind: MidiMessageType,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
}

impl Default for MidiDescriptor {
    fn default() -> Self {
        Self {
            kind: MidiMessageType::ControlChange,
            channel: 0,
            data1: 0,
            data2: 0,
        }
    }
}

/// Source of one MIDI message field.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiValue {
    pub kind: PartialType,
    pub key: String,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl MidiValue {
    pub fn new(kind: PartialType, key: impl Into<String>, scale_min: f64, scale_max: f64) -> Self {
        Self {
            kind,
            key: key.into(),
            scale_min,
            scale_max,
        }
    }
}

/// A MIDI message binding.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiMessage {
    pub enabled: bool,
    pub send: bool,
    pub receive: bool,
    pub feedback: bool,
    pub connections: Connections,
    pub triggers: Vec<Trigger>,
    pub message: MidiDescriptor,
    /// One entry per message field: channel, data1, data2.
    pub values: Vec<MidiValue>,
}

impl Default for MidiMessage {
    /// Control change on channel 0, controller from the index, value from `x`.
    fn default() -> Self {
        Self {
            enabled: true,
            send: true,
            receive: true,
            feedback: false,
            connections: Connections::default(),
            triggers: vec![Trigger::default()],
            message: MidiDescriptor::default(),
            values: vec![
                MidiValue::new(PartialType::Constant, "", 0.0, 15.0),
                MidiValue::new(PartialType::Index, "", 0.0, 1.0),
                MidiValue::new(PartialType::Value, "x", 0.0, 127.0),
            ],
        }
    }
}

/// Where a local message reads from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSource {
    pub kind: PartialType,
    pub conversion: Conversion,
    pub key: String,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for LocalSource {
    fn default() -> Self {
        Self {
            kind: PartialType::Value,
            conversion: Conversion::Float,
            key: "x".to_string(),
            scale_min: 0.0,
            scale_max: 1.0,
        }
    }
}

/// Where a local message writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalDestination {
    pub kind: PartialType,
    pub key: String,
    /// Target control; `None` until linked.
    pub target: Option<ControlId>,
}

impl Default for LocalDestination {
    fn default() -> Self {
        Self {
            kind: PartialType::Value,
            key: "x".to_string(),
            target: None,
        }
    }
}

/// A local link to another control's value or property.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMessage {
    pub enabled: bool,
    pub triggers: Vec<Trigger>,
    pub source: LocalSource,
    pub destination: LocalDestination,
}

impl LocalMessage {
    /// Links this control's `x` to `key` on the target control.
    pub fn to(target: ControlId, key: impl Into<String>) -> Self {
        Self {
            destination: LocalDestination {
                kind: PartialType::Value,
                key: key.into(),
                target: Some(target),
            },
            ..Self::default()
        }
    }
}

impl Default for LocalMessage {
    fn default() -> Self {
        Self {
            enabled: true,
            triggers: vec![Trigger::default()],
            source: LocalSource::default(),
            destination: LocalDestination::default(),
        }
    }
}

/// A message binding of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Osc(OscMessage),
    Midi(MidiMessage),
    Local(LocalMessage),
}

impl Message {
    /// Returns the kind for this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Osc(_) => MessageKind::Osc,
            Message::Midi(_) => MessageKind::Midi,
            Message::Local(_) => MessageKind::Local,
        }
    }

    /// Returns the triggers shared by every kind.
    pub fn triggers(&self) -> &[Trigger] {
        match self {
            Message::Osc(m) => &m.triggers,
            Message::Midi(m) => &m.triggers,
            Message::Local(m) => &m.triggers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Message::Osc(m) => m.enabled,
            Message::Midi(m) => m.enabled,
            Message::Local(m) => m.enabled,
        }
    }
}

impl From<OscMessage> for Message {
    fn from(m: OscMessage) -> Self {
        Message::Osc(m)
    }
}

impl From<MidiMessage> for Message {
    fn from(m: MidiMessage) -> Self {
        Message::Midi(m)
    }
}

impl From<LocalMessage> for Message {
    fn from(m: LocalMessage) -> Self {
        Message::Local(m)
    }
}

/// Messages of a control, grouped by kind, each group in insertion order.
///
/// Empty groups are never stored, so two collections holding the same
/// messages compare equal regardless of how they got there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Messages {
    by_kind: BTreeMap<MessageKind, Vec<Message>>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of one kind in insertion order.
    pub fn get(&self, kind: MessageKind) -> &[Message] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All messages, kind by kind in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.by_kind.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    pub fn contains_kind(&self, kind: MessageKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.by_kind.entry(message.kind()).or_default().push(message);
    }

    pub(crate) fn take(&mut self, kind: MessageKind) -> Vec<Message> {
        self.by_kind.remove(&kind).unwrap_or_default()
    }

    pub(crate) fn take_all(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.by_kind).into_values().flatten().collect()
    }
}
