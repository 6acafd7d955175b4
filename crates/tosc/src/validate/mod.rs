//! Structural validation for control trees.
//!
//! The decoder rejects what it cannot represent, but a decoded or hand-built
//! tree can still break rules that span more than one element: repeated keys
//! pushed through crate internals, an ID shared by two controls, children on a
//! leaf control. Validation walks the whole tree and reports the first
//! problem found, in pre-order.
//!
//! Validation is advisory. Saving does not call it, so a tree read from a
//! file the authoring tool tolerates can be written back unchanged.

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::limits::MAX_DEFAULT_PULL;
use crate::model::{Control, ControlId, Document};

/// Validates a control and its subtree.
///
/// Checks, per control:
/// - property keys are unique
/// - value keys are unique, pulls are within range and defaults fit their key
/// - only container types hold children
///
/// and across the subtree, that every control ID is unique.
pub fn validate_control(control: &Control) -> Result<(), ValidationError> {
    let mut ids = FxHashSet::with_capacity_and_hasher(control.control_count(), Default::default());
    validate_subtree(control, &mut ids)
}

fn validate_subtree(
    control: &Control,
    ids: &mut FxHashSet<ControlId>,
) -> Result<(), ValidationError> {
    let id = control.id();
    if !ids.insert(id) {
        return Err(ValidationError::DuplicateId { id });
    }

    validate_properties(control)?;
    validate_values(control)?;

    if !control.children().is_empty() && !control.control_type().is_container() {
        return Err(ValidationError::ChildrenOnLeaf {
            id,
            control_type: control.control_type(),
        });
    }

    for child in control.children() {
        validate_subtree(child, ids)?;
    }
    Ok(())
}

fn validate_properties(control: &Control) -> Result<(), ValidationError> {
    let properties = control.properties();
    let mut seen = FxHashSet::with_capacity_and_hasher(properties.len(), Default::default());
    for property in properties {
        if !seen.insert(property.key.as_str()) {
            return Err(ValidationError::DuplicateKey {
                id: control.id(),
                collection: "property",
                key: property.key.clone(),
            });
        }
    }
    Ok(())
}

fn validate_values(control: &Control) -> Result<(), ValidationError> {
    let values = control.values();
    let mut seen = FxHashSet::with_capacity_and_hasher(values.len(), Default::default());
    for value in values {
        if !seen.insert(value.key) {
            return Err(ValidationError::DuplicateKey {
                id: control.id(),
                collection: "value",
                key: value.key.to_string(),
            });
        }
        if value.default_pull > MAX_DEFAULT_PULL {
            return Err(ValidationError::PullOutOfRange {
                id: control.id(),
                key: value.key.to_string(),
                pull: value.default_pull,
            });
        }
        if !value.default.fits(value.key) {
            return Err(ValidationError::DefaultMismatch {
                id: control.id(),
                key: value.key.to_string(),
            });
        }
    }
    Ok(())
}

impl Document {
    /// Validates the whole control tree. See [`validate_control`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_control(&self.root)
    }
}
