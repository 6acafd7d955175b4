//! Data model types for touch-control layouts.
//!
//! This module contains the in-memory control tree:
//! - Identifiers (UUIDs)
//! - Properties (typed key/value attributes)
//! - Values (runtime input descriptors)
//! - Messages (OSC, MIDI and local routing)
//! - Controls and documents
//! - Builders (ergonomic construction)

pub mod builder;
pub mod bundle;
pub mod control;
pub mod id;
pub mod message;
pub mod property;
pub mod value;

pub use builder::ControlBuilder;
pub use control::{Control, ControlType, Document};
pub use id::ControlId;
pub use message::{
    Connections, Conversion, LocalDestination, LocalMessage, LocalSource, Message, MessageKind,
    Messages, MidiDescriptor, MidiMessage, MidiMessageType, MidiValue, OscMessage, Partial,
    PartialType, Trigger, TriggerCondition,
};
pub use property::{Color, Frame, Payload, Property, PropertyType, PropertyValue};
pub use value::{DefaultValue, Value, ValueKey};
