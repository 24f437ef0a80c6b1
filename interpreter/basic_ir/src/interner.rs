//! String interner backing [`Name`].
//!
//! A single-table variant of the classic leak-backed interner: interned
//! strings live for the life of the process, so lookups hand out
//! `&'static str` without holding any lock. A BASIC program interns a few
//! dozen identifiers at most, which keeps the leak bounded and tiny.

// Arc is required so the lexer, parser, and interpreter can share one
// interner without threading lifetimes through every stage.
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::Name;

struct Interner {
    /// Map from string content to its index in `names`.
    map: FxHashMap<&'static str, Name>,
    /// Interned contents, indexed by `Name`.
    names: Vec<&'static str>,
}

impl Interner {
    fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        Interner {
            map,
            names: vec![empty],
        }
    }

    fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let owned: &'static str = Box::leak(s.to_owned().into_boxed_str());
        #[allow(
            clippy::cast_possible_truncation,
            reason = "interner never holds anywhere near u32::MAX strings"
        )]
        let name = Name::new(self.names.len() as u32);
        self.names.push(owned);
        self.map.insert(owned, name);
        name
    }

    fn lookup(&self, name: Name) -> &'static str {
        self.names.get(name.index()).copied().unwrap_or("")
    }
}

/// Shared handle to the interner.
///
/// Clones are cheap and refer to the same table.
#[derive(Clone)]
pub struct SharedInterner(Arc<RwLock<Interner>>);

impl SharedInterner {
    /// Create an interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        SharedInterner(Arc::new(RwLock::new(Interner::new())))
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice yields the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: read lock only.
        if let Some(&name) = self.0.read().map.get(s) {
            return name;
        }
        self.0.write().intern(s)
    }

    /// Resolve a `Name` back to its string content.
    ///
    /// Unknown names resolve to the empty string rather than panicking.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.0.read().lookup(name)
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.0.read().names.len()
    }

    /// True when only the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        SharedInterner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let interner = SharedInterner::new();
        let a = interner.intern("COUNT");
        let b = interner.intern("COUNT");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "COUNT");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = SharedInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        assert_ne!(a, b);
        assert_eq!(interner.lookup(a), "A");
        assert_eq!(interner.lookup(b), "B");
    }

    #[test]
    fn empty_string_is_preinterned() {
        let interner = SharedInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
        assert!(interner.is_empty());
    }

    #[test]
    fn clones_share_the_table() {
        let interner = SharedInterner::new();
        let other = interner.clone();
        let a = interner.intern("X");
        assert_eq!(other.intern("X"), a);
        assert_eq!(other.len(), interner.len());
    }
}
