//! Error types for the control model, codec, layout and validation.

use thiserror::Error;

use crate::model::{ControlId, ControlType, PropertyType};

/// Error kinds shared by every layer of the crate.
///
/// A command-line or scripting front end maps these to user-facing messages
/// and exit codes; the codes are stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// E001: argument is not the expected variant
    TypeMismatch,
    /// E002: operation presupposes a key that does not exist
    KeyNotFound,
    /// E003: key already present in a keyed collection
    DuplicateKey,
    /// E004: property payload does not match its declared type
    MalformedProperty,
    /// E005: XML is not well formed or does not match the document shape
    MalformedDocument,
    /// E006: bytes are not a valid deflate stream
    CorruptArchive,
    /// E007: message tag is not osc, midi or local
    UnknownMessageKind,
    /// E008: layout needs a frame on the parent
    MissingFrame,
    /// E009: child count does not fit the requested grid
    ChildCountMismatch,
    /// E010: a copy/move selector entry matched nothing
    SelectorNotFound,
    /// E011: numeric field outside its allowed range
    OutOfRange,
    /// E012: layout parameters are unusable (zero rows, empty ratios)
    InvalidLayout,
    /// E013: file system or writer failure
    Io,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "E001",
            ErrorKind::KeyNotFound => "E002",
            ErrorKind::DuplicateKey => "E003",
            ErrorKind::MalformedProperty => "E004",
            ErrorKind::MalformedDocument => "E005",
            ErrorKind::CorruptArchive => "E006",
            ErrorKind::UnknownMessageKind => "E007",
            ErrorKind::MissingFrame => "E008",
            ErrorKind::ChildCountMismatch => "E009",
            ErrorKind::SelectorNotFound => "E010",
            ErrorKind::OutOfRange => "E011",
            ErrorKind::InvalidLayout => "E012",
            ErrorKind::Io => "E013",
        }
    }
}

/// Error raised by model mutation and tree operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("[E001] type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("[E001] property {key:?} is {expected}, cannot replace it with {found}")]
    PropertyTypeMismatch {
        key: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("[E001] {control_type} cannot hold children")]
    NotAContainer { control_type: ControlType },

    #[error("[E002] no {collection} with key {key:?}")]
    KeyNotFound { collection: &'static str, key: String },

    #[error("[E003] {collection} key {key:?} already exists")]
    DuplicateKey { collection: &'static str, key: String },

    #[error("[E010] selector entry {entry:?} matched no {collection}")]
    SelectorNotFound { collection: &'static str, entry: String },

    #[error("[E011] default pull {pull} out of range [0, 100]")]
    PullOutOfRange { pull: u8 },
}

impl ModelError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::TypeMismatch { .. }
            | ModelError::PropertyTypeMismatch { .. }
            | ModelError::NotAContainer { .. } => ErrorKind::TypeMismatch,
            ModelError::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            ModelError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            ModelError::SelectorNotFound { .. } => ErrorKind::SelectorNotFound,
            ModelError::PullOutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}

/// Error during document decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E006: Corrupt archive ===
    #[error("[E006] zlib decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("[E006] decompressed document exceeds maximum size {max}")]
    DocumentTooLarge { max: usize },

    // === E005: Malformed document ===
    #[error("[E005] XML parse error: {0}")]
    Xml(String),

    #[error("[E005] invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error("[E005] expected root element <lexml>, found <{found}>")]
    UnexpectedRoot { found: String },

    #[error("[E005] unsupported lexml version: {version:?}")]
    UnsupportedVersion { version: String },

    #[error("[E005] <{parent}> is missing <{element}>")]
    MissingElement {
        parent: &'static str,
        element: &'static str,
    },

    #[error("[E005] <{element}> is missing attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("[E005] unexpected <{found}> inside <{parent}>")]
    UnexpectedElement { parent: &'static str, found: String },

    #[error("[E005] document must hold exactly one root control, found {count}")]
    RootControlCount { count: usize },

    #[error("[E005] invalid control type: {found:?}")]
    InvalidControlType { found: String },

    #[error("[E005] invalid control ID: {found:?}")]
    InvalidId { found: String },

    #[error("[E005] invalid {field}: {found:?}")]
    InvalidField { field: &'static str, found: String },

    #[error("[E005] element nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    // === E004: Malformed property ===
    #[error("[E004] property {key:?}: {reason}")]
    MalformedProperty { key: String, reason: &'static str },

    #[error("[E004] invalid property type: {found:?}")]
    InvalidPropertyType { found: String },

    // === E007: Unknown message kind ===
    #[error("[E007] unknown message kind <{tag}>")]
    UnknownMessageKind { tag: String },

    // === E003: Duplicate key ===
    #[error("[E003] duplicate {collection} key {key:?}")]
    DuplicateKey { collection: &'static str, key: String },
}

impl DecodeError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::DecompressionFailed(_) | DecodeError::DocumentTooLarge { .. } => {
                ErrorKind::CorruptArchive
            }
            DecodeError::MalformedProperty { .. } | DecodeError::InvalidPropertyType { .. } => {
                ErrorKind::MalformedProperty
            }
            DecodeError::UnknownMessageKind { .. } => ErrorKind::UnknownMessageKind,
            DecodeError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            _ => ErrorKind::MalformedDocument,
        }
    }
}

/// Error during document encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("XML write failed: {0}")]
    Xml(String),

    #[error("zlib compression failed: {0}")]
    CompressionFailed(String),
}

/// Error raised by the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("[E008] control {id} has no frame property")]
    MissingFrame { id: ControlId },

    #[error("[E009] grid needs {expected} children, found {actual}")]
    ChildCountMismatch { expected: usize, actual: usize },

    #[error("[E012] grid must have at least one row and one column")]
    EmptyGrid,

    #[error("[E012] ratios must be non-empty, finite, non-negative and sum above zero")]
    InvalidRatios,
}

impl LayoutError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::MissingFrame { .. } => ErrorKind::MissingFrame,
            LayoutError::ChildCountMismatch { .. } => ErrorKind::ChildCountMismatch,
            LayoutError::EmptyGrid | LayoutError::InvalidRatios => ErrorKind::InvalidLayout,
        }
    }
}

/// Error during structural validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("control {id} has duplicate {collection} key {key:?}")]
    DuplicateKey {
        id: ControlId,
        collection: &'static str,
        key: String,
    },

    #[error("control ID {id} appears more than once in the tree")]
    DuplicateId { id: ControlId },

    #[error("control {id} ({control_type}) holds children but is not a container")]
    ChildrenOnLeaf { id: ControlId, control_type: ControlType },

    #[error("control {id} value {key:?} has default pull {pull} out of range [0, 100]")]
    PullOutOfRange { id: ControlId, key: String, pull: u8 },

    #[error("control {id} value {key:?} has a default incompatible with its key")]
    DefaultMismatch { id: ControlId, key: String },
}

impl ValidationError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::DuplicateKey { .. } | ValidationError::DuplicateId { .. } => {
                ErrorKind::DuplicateKey
            }
            ValidationError::PullOutOfRange { .. } => ErrorKind::OutOfRange,
            ValidationError::ChildrenOnLeaf { .. } | ValidationError::DefaultMismatch { .. } => {
                ErrorKind::TypeMismatch
            }
        }
    }
}

/// Any error the crate can return.
///
/// File-level helpers return this so callers can handle I/O and codec
/// failures through one type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("[E013] I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Model(e) => e.kind(),
            Error::Decode(e) => e.kind(),
            Error::Encode(_) | Error::Io(_) => ErrorKind::Io,
            Error::Layout(e) => e.kind(),
            Error::Validation(e) => e.kind(),
        }
    }
}
