//! Script arrays: shared, growable value sequences.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Value;

/// A 0-indexed sequence with reference semantics.
///
/// Writing past the end grows the array, filling the gap with nulls.
#[derive(Clone, Default)]
pub struct ScriptArray(Arc<RwLock<Vec<Value>>>);

impl ScriptArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        ScriptArray(Arc::new(RwLock::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Store `value` at `index`, extending with nulls when needed.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.write();
        if index >= items.len() {
            items.resize(index, Value::Null);
            items.push(value);
        } else {
            items[index] = value;
        }
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Snapshot of the current items.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ScriptArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ScriptArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec().iter()).finish()
    }
}

impl From<Vec<Value>> for ScriptArray {
    fn from(items: Vec<Value>) -> Self {
        ScriptArray::from_vec(items)
    }
}

impl FromIterator<Value> for ScriptArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ScriptArray::from_vec(iter.into_iter().collect())
    }
}
