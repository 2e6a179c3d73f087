use bumpalo::Bump;
use hashbrown::HashSet;

/// Arena backed string interner.
///
/// Every distinct string is copied into the arena once; later requests for
/// the same text return the same `&'a str`.
pub struct StringInterner<'a> {
    arena: &'a Bump,
    set: HashSet<&'a str>,
}

impl<'a> StringInterner<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            set: HashSet::new(),
        }
    }

    pub fn intern(&mut self, s: &str) -> &'a str {
        if let Some(&existing) = self.set.get(s) {
            return existing;
        }
        let interned: &'a str = self.arena.alloc_str(s);
        self.set.insert(interned);
        interned
    }

    /// The interned copy of `s`, if it was interned before.
    pub fn get(&self, s: &str) -> Option<&'a str> {
        self.set.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_returns_same_slice() {
        let arena = Bump::new();
        let mut strings = StringInterner::new(&arena);
        let a = strings.intern("sum");
        let b = strings.intern(&String::from("sum"));
        assert!(std::ptr::eq(a, b));
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_get_does_not_insert() {
        let arena = Bump::new();
        let mut strings = StringInterner::new(&arena);
        assert!(strings.get("x").is_none());
        assert!(strings.is_empty());
        strings.intern("x");
        assert_eq!(strings.get("x"), Some("x"));
    }
}
