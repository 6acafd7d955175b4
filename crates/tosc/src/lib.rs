//! Codec and in-memory model for `.tosc` touch-control layouts.
//!
//! A `.tosc` file stores a tree of controls (buttons, faders, groups, ...) as
//! zlib-compressed XML. This crate decodes that file into a typed control
//! tree, lets programs edit and lay out the tree, and encodes it back.
//!
//! # Overview
//!
//! Each [`Control`] carries four collections:
//! - **Properties**: typed key/value attributes (`name`, `frame`, `color`, ...)
//! - **Values**: runtime input descriptors (`touch`, `x`, `y`, ...)
//! - **Messages**: OSC, MIDI and local routing rules
//! - **Children**: nested controls, for container types only
//!
//! # Quick Start
//!
//! ```rust
//! use tosc::{Control, ControlType, Document, Frame, MessageKind, OscMessage, Value};
//! use tosc::codec::{load, save};
//!
//! let mut doc = Document::with_frame(Frame::new(0.0, 0.0, 1024.0, 768.0));
//!
//! let mut fader = Control::with_defaults(ControlType::Fader);
//! fader.set_name("volume");
//! fader.add_value(Value::x()).unwrap();
//! fader.add_message(MessageKind::Osc, OscMessage::default()).unwrap();
//! doc.root.add_child(fader).unwrap();
//!
//! // Encode to .tosc bytes
//! let bytes = save(&doc).unwrap();
//!
//! // Decode back
//! let decoded = load(&bytes).unwrap();
//! assert_eq!(doc, decoded);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (Control, Property, Value, Message, Document)
//! - [`codec`]: XML encoding/decoding with zlib compression, plus streaming search
//! - [`tree`]: Lookup and copy/move between controls
//! - [`layout`]: Grid, column and row arrangement
//! - [`validate`]: Structural validation
//! - [`error`]: Error types
//! - [`limits`]: Format constants and decode limits
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Inflated XML is capped at [`limits::MAX_DOCUMENT_SIZE`]
//! - Element nesting is capped at [`limits::MAX_NESTING_DEPTH`]
//! - Invalid data is rejected with descriptive errors
//!
//! # File Format
//!
//! ```text
//! zlib( <?xml version="1.0" encoding="UTF-8"?>
//!       <lexml version="3"><node ID="..." type="GROUP">...</node></lexml> )
//! ```

pub mod codec;
pub mod error;
pub mod layout;
pub mod limits;
pub mod model;
pub mod tree;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{load, load_file, save, save_file, save_with_options, SaveOptions};
pub use error::{
    DecodeError, EncodeError, Error, ErrorKind, LayoutError, ModelError, ValidationError,
};
pub use limits::LEXML_VERSION;
pub use model::{
    Color, Connections, Control, ControlBuilder, ControlId, ControlType, Conversion,
    DefaultValue, Document, Frame, LocalDestination, LocalMessage, LocalSource, Message,
    MessageKind, Messages, MidiDescriptor, MidiMessage, MidiMessageType, MidiValue, OscMessage,
    Partial, PartialType, Payload, Property, PropertyType, PropertyValue, Trigger,
    TriggerCondition, Value, ValueKey,
};
pub use tree::{Keyed, Selector};
pub use validate::validate_control;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
