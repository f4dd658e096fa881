//! String interner for identifiers and qualified paths.
//!
//! Uses `Rc<str>` for cheap cloning (a refcount bump instead of an
//! allocation). The interner deduplicates strings so identical identifiers
//! across a whole compilation share one allocation.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// An interned string, cheap to clone.
pub type IStr = Rc<str>;

/// An interned identifier or path segment.
///
/// `Name` wraps an [`IStr`] so that symbol-table keys and AST identifiers
/// compare by pointer-backed string equality rather than re-hashing the
/// text on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(IStr);

impl Name {
    pub fn new(s: IStr) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Deduplicating string interner.
#[derive(Debug, Default, Clone)]
pub struct Interner {
    strings: HashSet<Rc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning a cheap-to-clone reference.
    ///
    /// If the string was already interned, returns the existing `Rc`.
    pub fn intern(&mut self, s: &str) -> IStr {
        if let Some(existing) = self.strings.get(s) {
            Rc::clone(existing)
        } else {
            let rc: Rc<str> = Rc::from(s);
            self.strings.insert(Rc::clone(&rc));
            rc
        }
    }

    /// Intern a string and wrap it as a [`Name`].
    pub fn intern_name(&mut self, s: &str) -> Name {
        Name(self.intern(s))
    }

    pub fn get(&self, s: &str) -> Option<IStr> {
        self.strings.get(s).cloned()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_rc() {
        let mut interner = Interner::new();
        let a = interner.intern("정의한다");
        let b = interner.intern("정의한다");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn intern_different_strings() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("world");
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn name_compares_by_value() {
        let mut interner = Interner::new();
        let a = interner.intern_name("region_a");
        let b = interner.intern_name("region_a");
        assert_eq!(a, b);
    }
}
