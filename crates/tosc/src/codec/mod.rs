//! Encoding/decoding for `.tosc` documents.
//!
//! A document is a zlib stream of `lexml` XML. The entity codecs translate
//! between model types and [`xml::XmlElement`] trees; [`document`] handles the
//! container, and [`scan`] answers property queries straight from the XML
//! event stream.

pub mod control;
pub mod document;
pub mod message;
pub mod primitives;
pub mod property;
pub mod scan;
pub mod value;
pub mod xml;

pub use control::{decode_control, encode_control};
pub use document::{
    compress, decode_document, decompress, encode_document, load, load_file, save, save_file,
    save_with_options, SaveOptions,
};
pub use message::{decode_message, encode_message};
pub use property::{decode_property, encode_property};
pub use scan::{
    find_id_by_name, find_id_by_name_compressed, parse_properties, parse_properties_compressed,
    pull_value_from_key, pull_value_from_key_compressed,
};
pub use value::{decode_value, encode_value};
pub use xml::XmlElement;
