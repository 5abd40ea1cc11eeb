//! Script objects: shared, ordered name → value maps.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use super::Value;
use crate::registry::AccessError;

#[derive(Clone)]
struct Slot {
    value: Value,
    read_only: bool,
}

type Entries = IndexMap<Arc<str>, Slot, FxBuildHasher>;

/// An ordered mapping from names to values.
///
/// Cloning a `ScriptObject` clones the handle, not the entries: every clone
/// observes writes made through any other. Keys keep insertion order for
/// enumeration and display.
#[derive(Clone, Default)]
pub struct ScriptObject(Arc<RwLock<Entries>>);

impl ScriptObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an object from `(name, value)` pairs; later duplicates win.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<Arc<str>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = Self::new();
        {
            let mut map = object.0.write();
            for (key, value) in entries {
                map.insert(
                    key.into(),
                    Slot {
                        value,
                        read_only: false,
                    },
                );
            }
        }
        object
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.read().get(name).map(|slot| slot.value.clone())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.read().contains_key(name)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.0.read().get(name).is_some_and(|slot| slot.read_only)
    }

    /// Write through the script-facing path: read-only entries reject it.
    pub fn set(&self, name: &str, value: Value) -> Result<(), AccessError> {
        let mut map = self.0.write();
        match map.get_mut(name) {
            Some(slot) if slot.read_only => Err(AccessError::ReadOnly {
                name: name.to_owned(),
            }),
            Some(slot) => {
                slot.value = value;
                Ok(())
            }
            None => {
                map.insert(
                    Arc::from(name),
                    Slot {
                        value,
                        read_only: false,
                    },
                );
                Ok(())
            }
        }
    }

    /// Host-side write: replaces the entry unconditionally and leaves it
    /// writable.
    pub fn insert(&self, name: impl Into<Arc<str>>, value: Value) -> Option<Value> {
        self.0
            .write()
            .insert(
                name.into(),
                Slot {
                    value,
                    read_only: false,
                },
            )
            .map(|slot| slot.value)
    }

    /// Host-side write that marks the entry read-only for scripts.
    pub fn insert_read_only(&self, name: impl Into<Arc<str>>, value: Value) {
        self.0.write().insert(
            name.into(),
            Slot {
                value,
                read_only: true,
            },
        );
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.write().shift_remove(name).map(|slot| slot.value)
    }

    pub fn keys(&self) -> Vec<Arc<str>> {
        self.0.read().keys().cloned().collect()
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(Arc<str>, Value)> {
        self.0
            .read()
            .iter()
            .map(|(key, slot)| (Arc::clone(key), slot.value.clone()))
            .collect()
    }

    /// Whether both handles point at the same entries.
    pub fn ptr_eq(&self, other: &ScriptObject) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        f.debug_map()
            .entries(entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for ScriptObject {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        ScriptObject::from_entries(iter)
    }
}
