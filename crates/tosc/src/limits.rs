//! Security limits for decoding.
//!
//! Archives come from arbitrary sources, so the decoder bounds the amount of
//! inflated XML and the depth of element nesting before building a tree.

/// Version written into the `<lexml>` root element.
pub const LEXML_VERSION: u32 = 3;

/// Maximum size of the inflated XML document (64 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 64 * 1024 * 1024;

/// Maximum XML element nesting depth.
///
/// Each control level costs four elements (`node`, `children`, ...), so this
/// allows control trees roughly 128 levels deep.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Maximum pull percentage of a value default.
pub const MAX_DEFAULT_PULL: u8 = 100;
