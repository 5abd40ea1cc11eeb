//! Interned names for identifiers and literal text.
//!
//! Each compiled template owns one `NameTable`; `Name` is only meaningful
//! together with the table that produced it.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Index into a template's `NameTable`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Append-only string table built while parsing.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NameTable {
    map: FxHashMap<Arc<str>, Name>,
    strings: Vec<Arc<str>>,
}

impl NameTable {
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut map = FxHashMap::default();
        map.insert(Arc::clone(&empty), Name::EMPTY);
        NameTable {
            map,
            strings: vec![empty],
        }
    }

    /// Intern `s`, returning the existing name when already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        // More than u32::MAX distinct strings cannot come out of a template
        // smaller than 4 GiB, which the lexer enforces.
        let name = Name(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        let shared: Arc<str> = Arc::from(s);
        self.strings.push(Arc::clone(&shared));
        self.map.insert(shared, name);
        name
    }

    /// Resolve a name; unknown names resolve to the empty string.
    #[inline]
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s.as_ref())
    }

    /// Resolve a name to a shared string without copying the bytes.
    pub fn lookup_shared(&self, name: Name) -> Arc<str> {
        self.strings
            .get(name.index())
            .map_or_else(|| Arc::from(""), Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedupes() {
        let mut table = NameTable::new();
        let a = table.intern("title");
        let b = table.intern("title");
        let c = table.intern("body");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.lookup(c), "body");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn empty_is_preinterned() {
        let mut table = NameTable::new();
        assert!(table.is_empty());
        assert_eq!(table.intern(""), Name::EMPTY);
        assert_eq!(table.lookup(Name::EMPTY), "");
    }
}
