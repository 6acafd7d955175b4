//! UUID-based control identifiers.
//!
//! Every control carries an `ID` attribute on the wire. A new identifier is
//! generated for each constructed control; nothing hands out a shared default.

use std::fmt;

use uuid::Uuid;

/// Opaque identifier of a control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(Uuid);

impl ControlId {
    /// Generates a fresh random (v4) identifier.
    pub fn new() -> Self {
        ControlId(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        ControlId(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses an identifier from its hyphenated or simple hex form.
    pub fn parse(s: &str) -> Option<ControlId> {
        Uuid::parse_str(s.trim()).ok().map(ControlId)
    }
}

impl Default for ControlId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}
