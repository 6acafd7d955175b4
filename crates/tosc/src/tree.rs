//! Tree navigation and cross-control copy/move.
//!
//! Lookups return `Option` and never fail. Copy and move take a [`Selector`]
//! naming what to transfer; every explicit selector entry must match at
//! least one source element, and target key collisions are checked up
//! front, so a failing call leaves both controls untouched.
//!
//! Copies of controls get fresh IDs for the whole subtree. Moves keep them.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::error::ModelError;
use crate::model::{Control, ControlId, ControlType, Message, MessageKind, Property, Value, ValueKey};

/// An element that can be looked up by key.
pub trait Keyed {
    type Key: PartialEq + fmt::Display;

    fn key(&self) -> &Self::Key;
}

impl Keyed for Property {
    type Key = String;

    fn key(&self) -> &String {
        &self.key
    }
}

impl Keyed for Value {
    type Key = ValueKey;

    fn key(&self) -> &ValueKey {
        &self.key
    }
}

impl Keyed for Control {
    type Key = ControlType;

    fn key(&self) -> &ControlType {
        &self.control_type
    }
}

/// Which elements a copy or move transfers.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector<K> {
    /// Every element of the collection.
    All,
    /// Elements whose key equals one of these.
    Only(Vec<K>),
}

impl<K> Selector<K> {
    pub fn only<I, T>(keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<K>,
    {
        Selector::Only(keys.into_iter().map(Into::into).collect())
    }
}

impl<K: PartialEq> Selector<K> {
    fn matches(&self, key: &K) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(keys) => keys.contains(key),
        }
    }
}

/// Returns the first element whose key matches.
pub fn find_by_key<'a, T: Keyed>(items: &'a [T], key: &T::Key) -> Option<&'a T> {
    items.iter().find(|item| item.key() == key)
}

/// Finds a direct child whose `name` property equals `name`.
pub fn find_child_by_name<'a>(control: &'a Control, name: &str) -> Option<&'a Control> {
    control.children().iter().find(|c| c.name() == Some(name))
}

pub fn find_child_by_name_mut<'a>(control: &'a mut Control, name: &str) -> Option<&'a mut Control> {
    control.children.iter_mut().find(|c| c.name() == Some(name))
}

/// Finds the first descendant (pre-order, excluding `control`) with this name.
pub fn find_descendant_by_name<'a>(control: &'a Control, name: &str) -> Option<&'a Control> {
    for child in control.children() {
        if child.name() == Some(name) {
            return Some(child);
        }
        if let Some(found) = find_descendant_by_name(child, name) {
            return Some(found);
        }
    }
    None
}

/// Finds `control` or a descendant by ID.
pub fn find_by_id(control: &Control, id: ControlId) -> Option<&Control> {
    if control.id() == id {
        return Some(control);
    }
    control.children().iter().find_map(|c| find_by_id(c, id))
}

pub fn find_by_id_mut(control: &mut Control, id: ControlId) -> Option<&mut Control> {
    if control.id() == id {
        return Some(control);
    }
    control.children.iter_mut().find_map(|c| find_by_id_mut(c, id))
}

/// Resolves a selector to source indices, in source order.
fn select<T: Keyed>(
    items: &[T],
    selector: &Selector<T::Key>,
    collection: &'static str,
) -> Result<Vec<usize>, ModelError> {
    if let Selector::Only(keys) = selector {
        if let Some(missing) = keys.iter().find(|k| find_by_key(items, k).is_none()) {
            return Err(ModelError::SelectorNotFound {
                collection,
                entry: missing.to_string(),
            });
        }
    }
    Ok(items
        .iter()
        .enumerate()
        .filter(|(_, item)| selector.matches(item.key()))
        .map(|(i, _)| i)
        .collect())
}

/// Fails if any selected source key already exists in the target.
fn check_collisions<T: Keyed>(
    source: &[T],
    indices: &[usize],
    target: &[T],
    collection: &'static str,
) -> Result<(), ModelError> {
    for &i in indices {
        let key = source[i].key();
        if find_by_key(target, key).is_some() {
            return Err(ModelError::DuplicateKey {
                collection,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn check_container(target: &Control, moving: bool) -> Result<(), ModelError> {
    if moving && !target.control_type().is_container() {
        return Err(ModelError::NotAContainer {
            control_type: target.control_type(),
        });
    }
    Ok(())
}

/// Removes the given (ascending) indices and returns the removed items in order.
fn extract<T>(items: &mut Vec<T>, indices: &[usize]) -> Vec<T> {
    let mut removed: Vec<T> = indices.iter().rev().map(|&i| items.remove(i)).collect();
    removed.reverse();
    removed
}

// =============================================================================
// Properties
// =============================================================================

/// Appends deep copies of the selected properties to `target`.
pub fn copy_properties(
    source: &Control,
    target: &mut Control,
    selector: &Selector<String>,
) -> Result<usize, ModelError> {
    let indices = select(&source.properties, selector, "property")?;
    check_collisions(&source.properties, &indices, &target.properties, "property")?;
    target
        .properties
        .extend(indices.iter().map(|&i| source.properties[i].clone()));
    Ok(indices.len())
}

/// Moves the selected properties from `source` to the end of `target`.
pub fn move_properties(
    source: &mut Control,
    target: &mut Control,
    selector: &Selector<String>,
) -> Result<usize, ModelError> {
    let indices = select(&source.properties, selector, "property")?;
    check_collisions(&source.properties, &indices, &target.properties, "property")?;
    let moved = extract(&mut source.properties, &indices);
    target.properties.extend(moved);
    Ok(indices.len())
}

// =============================================================================
// Values
// =============================================================================

/// Appends copies of the selected values to `target`.
pub fn copy_values(
    source: &Control,
    target: &mut Control,
    selector: &Selector<ValueKey>,
) -> Result<usize, ModelError> {
    let indices = select(&source.values, selector, "value")?;
    check_collisions(&source.values, &indices, &target.values, "value")?;
    target
        .values
        .extend(indices.iter().map(|&i| source.values[i].clone()));
    Ok(indices.len())
}

/// Moves the selected values from `source` to the end of `target`.
pub fn move_values(
    source: &mut Control,
    target: &mut Control,
    selector: &Selector<ValueKey>,
) -> Result<usize, ModelError> {
    let indices = select(&source.values, selector, "value")?;
    check_collisions(&source.values, &indices, &target.values, "value")?;
    let moved = extract(&mut source.values, &indices);
    target.values.extend(moved);
    Ok(indices.len())
}

// =============================================================================
// Messages
// =============================================================================

fn select_kinds(
    source: &Control,
    selector: &Selector<MessageKind>,
) -> Result<FxHashSet<MessageKind>, ModelError> {
    if let Selector::Only(kinds) = selector {
        if let Some(missing) = kinds.iter().find(|k| !source.messages.contains_kind(**k)) {
            return Err(ModelError::SelectorNotFound {
                collection: "message",
                entry: missing.to_string(),
            });
        }
    }
    Ok(MessageKind::ALL
        .into_iter()
        .filter(|k| source.messages.contains_kind(*k) && selector.matches(k))
        .collect())
}

/// Appends copies of the messages of the selected kinds to `target`.
pub fn copy_messages(
    source: &Control,
    target: &mut Control,
    selector: &Selector<MessageKind>,
) -> Result<usize, ModelError> {
    let kinds = select_kinds(source, selector)?;
    let copies: Vec<Message> = source
        .messages
        .iter()
        .filter(|m| kinds.contains(&m.kind()))
        .cloned()
        .collect();
    let count = copies.len();
    for message in copies {
        target.messages.push(message);
    }
    Ok(count)
}

/// Moves every message of the selected kinds from `source` to `target`.
pub fn move_messages(
    source: &mut Control,
    target: &mut Control,
    selector: &Selector<MessageKind>,
) -> Result<usize, ModelError> {
    let kinds = select_kinds(source, selector)?;
    let mut count = 0;
    for kind in MessageKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        for message in source.messages.take(kind) {
            target.messages.push(message);
            count += 1;
        }
    }
    Ok(count)
}

// =============================================================================
// Children
// =============================================================================

/// Appends duplicates of the selected children to `target`.
///
/// Every copied control, descendants included, gets a fresh ID.
pub fn copy_children(
    source: &Control,
    target: &mut Control,
    selector: &Selector<ControlType>,
) -> Result<usize, ModelError> {
    let indices = select(&source.children, selector, "child")?;
    check_container(target, !indices.is_empty())?;
    target
        .children
        .extend(indices.iter().map(|&i| source.children[i].duplicate()));
    Ok(indices.len())
}

/// Moves the selected children from `source` to the end of `target`, keeping IDs.
pub fn move_children(
    source: &mut Control,
    target: &mut Control,
    selector: &Selector<ControlType>,
) -> Result<usize, ModelError> {
    let indices = select(&source.children, selector, "child")?;
    check_container(target, !indices.is_empty())?;
    let moved = extract(&mut source.children, &indices);
    target.children.extend(moved);
    Ok(indices.len())
}
