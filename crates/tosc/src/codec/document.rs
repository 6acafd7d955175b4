//! Document encoding/decoding: the `.tosc` container.
//!
//! A file is a zlib stream of UTF-8 XML:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <lexml version="3"><node ID="..." type="GROUP">...</node></lexml>
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use log::debug;

use crate::codec::control::{decode_control, encode_control};
use crate::codec::xml::{self, WriteOptions, XmlElement};
use crate::error::{DecodeError, EncodeError, Error};
use crate::limits::{LEXML_VERSION, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH};
use crate::model::Document;

// =============================================================================
// DECODING
// =============================================================================

/// Inflates a zlib stream, returning the XML bytes.
///
/// Fails with `DocumentTooLarge` once the output passes
/// [`MAX_DOCUMENT_SIZE`], so a small archive cannot expand without bound.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    inflate(input, MAX_DOCUMENT_SIZE)
}

fn inflate(input: &[u8], max: usize) -> Result<Vec<u8>, DecodeError> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(input.len().saturating_mul(4).clamp(4096, max.max(4096)));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }
        let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
        let status = inflater
            .decompress_vec(&input[in_before as usize..], &mut out, FlushDecompress::None)
            .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

        if out.len() > max {
            return Err(DecodeError::DocumentTooLarge { max });
        }
        match status {
            Status::StreamEnd => return Ok(out),
            // Room to write and nothing produced: the input ran out early.
            _ if inflater.total_in() == in_before && inflater.total_out() == out_before => {
                return Err(DecodeError::DecompressionFailed(
                    "truncated zlib stream".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Decodes a document from uncompressed XML.
pub fn decode_document(xml_bytes: &[u8]) -> Result<Document, DecodeError> {
    let root = xml::parse(xml_bytes, MAX_NESTING_DEPTH)?;
    if root.name != "lexml" {
        return Err(DecodeError::UnexpectedRoot { found: root.name });
    }

    let version = root.attr("version").ok_or(DecodeError::MissingAttribute {
        element: "lexml",
        attribute: "version",
    })?;
    if version.trim().parse::<u32>().ok() != Some(LEXML_VERSION) {
        return Err(DecodeError::UnsupportedVersion {
            version: version.to_string(),
        });
    }

    if let Some(other) = root.children.iter().find(|c| c.name != "node") {
        return Err(DecodeError::UnexpectedElement {
            parent: "lexml",
            found: other.name.clone(),
        });
    }
    let [node] = root.children.as_slice() else {
        return Err(DecodeError::RootControlCount {
            count: root.children.len(),
        });
    };

    let document = Document::with_root(decode_control(node)?);
    debug!(
        "decoded document with {} controls",
        document.root.control_count()
    );
    Ok(document)
}

/// Loads a document from `.tosc` bytes.
pub fn load(bytes: &[u8]) -> Result<Document, DecodeError> {
    let xml_bytes = decompress(bytes)?;
    debug!("inflated {} bytes to {} bytes of XML", bytes.len(), xml_bytes.len());
    decode_document(&xml_bytes)
}

/// Loads a document from a `.tosc` file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Document, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(load(&bytes)?)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Options for saving documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// zlib level, 0 (store) to 9 (best).
    pub compression_level: u32,
    /// Spaces per XML nesting level; `None` writes compact XML.
    pub indent: Option<usize>,
    /// Write the `<?xml ...?>` declaration.
    pub xml_declaration: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            indent: None,
            xml_declaration: true,
        }
    }
}

impl SaveOptions {
    /// Creates default save options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented XML, handy when inspecting the inflated output by hand.
    pub fn pretty() -> Self {
        Self {
            indent: Some(2),
            ..Self::default()
        }
    }
}

/// Encodes a document to uncompressed XML.
pub fn encode_document(document: &Document, options: SaveOptions) -> Result<Vec<u8>, EncodeError> {
    let root = XmlElement::new("lexml")
        .with_attr("version", document.version().to_string())
        .with_child(encode_control(&document.root));
    xml::write(
        &root,
        WriteOptions {
            indent: options.indent,
            declaration: options.xml_declaration,
        },
    )
}

/// Deflates bytes into a zlib stream.
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(data)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))
}

/// Saves a document to `.tosc` bytes with default options.
pub fn save(document: &Document) -> Result<Vec<u8>, EncodeError> {
    save_with_options(document, SaveOptions::default())
}

/// Saves a document to `.tosc` bytes.
pub fn save_with_options(document: &Document, options: SaveOptions) -> Result<Vec<u8>, EncodeError> {
    let xml_bytes = encode_document(document, options)?;
    let compressed = compress(&xml_bytes, options.compression_level)?;
    debug!(
        "saved {} controls: {} bytes of XML, {} compressed",
        document.root.control_count(),
        xml_bytes.len(),
        compressed.len()
    );
    Ok(compressed)
}

/// Saves a document to a `.tosc` file, replacing any existing file.
pub fn save_file(document: &Document, path: impl AsRef<Path>) -> Result<(), Error> {
    let bytes = save(document)?;
    fs::write(path, bytes)?;
    Ok(())
}
