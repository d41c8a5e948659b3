//! Interned symbol payload stored inside `ExprKind::Symbol`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use slotmap::{DefaultKey, Key};

use super::Assumptions;

/// Registry-backed symbol data.
///
/// Equality and hashing use only the registry id, so two symbols with the same
/// name and assumptions (which intern to the same id) are identical, while every
/// dummy is distinct from everything else.
#[derive(Clone, Debug)]
pub struct InternedSymbol {
    id: u64,
    name: Arc<str>,
    dummy_index: Option<u64>,
    assumptions: Assumptions,
}

impl InternedSymbol {
    pub(crate) fn new_named(name: &str, assumptions: Assumptions, key: DefaultKey) -> Self {
        Self {
            id: key.data().as_ffi(),
            name: Arc::from(name),
            dummy_index: None,
            assumptions,
        }
    }

    pub(crate) fn new_dummy(name: &str, serial: u64, key: DefaultKey) -> Self {
        Self {
            id: key.data().as_ffi(),
            name: Arc::from(name),
            dummy_index: Some(serial),
            assumptions: Assumptions::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.dummy_index.is_some()
    }

    /// Process-wide serial number of a dummy (`None` for ordinary symbols)
    pub fn dummy_index(&self) -> Option<u64> {
        self.dummy_index
    }

    pub fn assumptions(&self) -> Assumptions {
        self.assumptions
    }

    #[inline]
    pub fn is_commutative(&self) -> bool {
        self.assumptions.commutative
    }
}

impl PartialEq for InternedSymbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InternedSymbol {}

impl Hash for InternedSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for InternedSymbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Alphabetical first; dummies after same-named symbols, in creation order.
impl Ord for InternedSymbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.dummy_index.cmp(&other.dummy_index))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl AsRef<str> for InternedSymbol {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
