//! Row selection for the list.
//!
//! Selection is owned by the screen, not the list. The list reads the set it
//! is handed and reports changes through the screen's setter, so every view
//! of the selection (toolbar badge, bulk-action bar, row checkboxes) reads
//! the same set.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Stable identifier of a row, as returned by the screen's row-key function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    /// Numeric key (typically a database id).
    Int(i64),
    /// String key (uuid, slug, ...).
    Str(String),
}

impl RowKey {
    /// Builds a key from a JSON value. Numbers that are not integers and
    /// other scalars use their textual form; `null`, arrays and objects have
    /// no key.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => RowKey::Int(i),
                None => RowKey::Str(n.to_string()),
            }),
            serde_json::Value::String(s) => Some(RowKey::Str(s.clone())),
            serde_json::Value::Bool(b) => Some(RowKey::Str(b.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(i) => write!(f, "{i}"),
            RowKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(value: i64) -> Self {
        RowKey::Int(value)
    }
}

impl From<i32> for RowKey {
    fn from(value: i32) -> Self {
        RowKey::Int(value.into())
    }
}

impl From<u32> for RowKey {
    fn from(value: u32) -> Self {
        RowKey::Int(value.into())
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey::Str(value.to_string())
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        RowKey::Str(value)
    }
}

/// Controlled selection handed to the list by its screen.
///
/// `on_change` is optional; without it the toggles are no-ops, matching a
/// read-only selection.
pub struct SelectionProps<'a> {
    /// The currently selected keys.
    pub keys: &'a HashSet<RowKey>,
    /// Called with the complete new selection.
    pub on_change: Option<&'a mut dyn FnMut(HashSet<RowKey>)>,
}

impl<'a> SelectionProps<'a> {
    /// Selection with a setter.
    pub fn new(keys: &'a HashSet<RowKey>, on_change: &'a mut dyn FnMut(HashSet<RowKey>)) -> Self {
        Self {
            keys,
            on_change: Some(on_change),
        }
    }

    /// Selection the list may display but not change.
    pub fn read_only(keys: &'a HashSet<RowKey>) -> Self {
        Self {
            keys,
            on_change: None,
        }
    }

    /// Number of selected keys.
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    fn emit(&mut self, keys: HashSet<RowKey>) -> bool {
        match self.on_change.as_mut() {
            Some(on_change) => {
                on_change(keys);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SelectionProps<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionProps")
            .field("keys", &self.keys)
            .field("controlled", &self.on_change.is_some())
            .finish()
    }
}

/// Whether every displayed row is selected.
///
/// Computed, never stored: `displayed` must be non-empty, the selection must
/// have exactly as many keys, and each displayed key must be in it.
pub fn all_selected(displayed: &[RowKey], selected: &HashSet<RowKey>) -> bool {
    !displayed.is_empty()
        && selected.len() == displayed.len()
        && displayed.iter().all(|k| selected.contains(k))
}

/// Next selection for the "select page" checkbox.
///
/// Clears when the page is fully selected, otherwise selects exactly the
/// displayed rows. Keys outside the page are not carried over.
pub fn toggled_all(displayed: &[RowKey], selected: &HashSet<RowKey>) -> HashSet<RowKey> {
    if all_selected(displayed, selected) {
        HashSet::new()
    } else {
        displayed.iter().cloned().collect()
    }
}

/// Next selection after flipping one key.
pub fn toggled_one(selected: &HashSet<RowKey>, key: &RowKey) -> HashSet<RowKey> {
    let mut next = selected.clone();
    if !next.remove(key) {
        next.insert(key.clone());
    }
    next
}

/// Applies [`toggled_all`] through the screen's setter.
///
/// Returns `true` if the setter was called.
pub fn toggle_all(displayed: &[RowKey], selection: &mut SelectionProps<'_>) -> bool {
    let next = toggled_all(displayed, selection.keys);
    selection.emit(next)
}

/// Applies [`toggled_one`] through the screen's setter.
///
/// Returns `true` if the setter was called.
pub fn toggle_one(key: &RowKey, selection: &mut SelectionProps<'_>) -> bool {
    let next = toggled_one(selection.keys, key);
    selection.emit(next)
}

/// Empties the selection through the screen's setter.
pub fn clear(selection: &mut SelectionProps<'_>) -> bool {
    selection.emit(HashSet::new())
}
