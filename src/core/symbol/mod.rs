//! Symbols and dummies
//!
//! # Symbol Interning
//!
//! Symbols are interned globally by name and declared assumptions. Two symbols with
//! the same name and assumptions share one id, so equality is an integer compare.
//!
//! # Dummies
//!
//! `Symbol::dummy` creates a private binder: it carries a display name and a
//! process-wide serial number, and is never equal to any other symbol, even one
//! with the same name. Substitution points and lambda renames are built from them.
//!
//! ```
//! use symb_calculus::{Symbol, symb};
//!
//! let x = symb("doc_x");
//! assert_eq!(x, symb("doc_x"));
//!
//! let d1 = Symbol::dummy("t");
//! let d2 = Symbol::dummy("t");
//! assert_ne!(d1, d2);
//! ```

mod interned;
pub(crate) mod registry;

pub use interned::InternedSymbol;
pub use registry::{symb, symbol_count};

pub(crate) use registry::lookup_by_id;

use std::sync::Arc;

use slotmap::{DefaultKey, Key};

use crate::Expr;

/// Declared algebraic properties of a symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assumptions {
    pub real: bool,
    pub commutative: bool,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            real: false,
            commutative: true,
        }
    }
}

impl Assumptions {
    pub fn real() -> Self {
        Self {
            real: true,
            ..Self::default()
        }
    }

    pub fn noncommutative() -> Self {
        Self {
            commutative: false,
            ..Self::default()
        }
    }
}

/// Lightweight `Copy` handle to an interned symbol or dummy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub(crate) DefaultKey);

impl Symbol {
    /// Create or get a symbol with default assumptions (same as [`symb`])
    #[must_use]
    pub fn new(name: &str) -> Self {
        symb(name)
    }

    /// Create or get a symbol carrying explicit assumptions
    #[must_use]
    pub fn with_assumptions(name: &str, assumptions: Assumptions) -> Self {
        registry::intern(name, assumptions)
    }

    /// Create a fresh dummy with the given display name
    #[must_use]
    pub fn dummy(name: &str) -> Self {
        registry::new_dummy(name)
    }

    pub(crate) fn from_id(id: u64) -> Self {
        Self(registry::key_from_id(id))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.data().as_ffi()
    }

    /// Registry payload for this handle
    #[must_use]
    pub fn interned(&self) -> InternedSymbol {
        lookup_by_id(self.id()).unwrap_or_else(|| {
            InternedSymbol::new_dummy("?", 0, self.0)
        })
    }

    #[must_use]
    pub fn name(&self) -> Arc<str> {
        self.interned().name_arc()
    }

    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.interned().is_dummy()
    }

    #[must_use]
    pub fn assumptions(&self) -> Assumptions {
        self.interned().assumptions()
    }

    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::from_interned(self.interned())
    }

    /// Raise to a power
    pub fn pow(&self, exp: impl Into<Expr>) -> Expr {
        Expr::pow(self.to_expr(), exp.into())
    }
}

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        s.to_expr()
    }
}

impl From<&Symbol> for Expr {
    fn from(s: &Symbol) -> Self {
        s.to_expr()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.interned();
        if s.is_dummy() {
            write!(f, "_{}", s.name())
        } else {
            write!(f, "{}", s.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let a = symb("sym_test_a");
        let b = symb("sym_test_a");
        assert_eq!(a, b);
        assert_eq!(a.to_expr(), b.to_expr());
    }

    #[test]
    fn test_assumptions_distinguish() {
        let plain = symb("sym_test_r");
        let real = Symbol::with_assumptions("sym_test_r", Assumptions::real());
        assert_ne!(plain, real);
        assert!(real.assumptions().real);
        assert_eq!(
            real,
            Symbol::with_assumptions("sym_test_r", Assumptions::real())
        );
    }

    #[test]
    fn test_dummy_never_aliases() {
        let d1 = Symbol::dummy("sym_test_d");
        let d2 = Symbol::dummy("sym_test_d");
        assert_ne!(d1, d2);
        assert!(d1.is_dummy());
        assert_ne!(d1, symb("sym_test_d"));
        let s1 = d1.interned().dummy_index().unwrap_or(0);
        let s2 = d2.interned().dummy_index().unwrap_or(0);
        assert!(s2 > s1);
        assert_eq!(d1.to_string(), "_sym_test_d");
    }
}
