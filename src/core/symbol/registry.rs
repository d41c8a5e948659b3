//! Process-wide symbol table
//!
//! Every symbol, named or dummy, owns one slot in a `SlotMap`; the slot key is the
//! symbol id. Named symbols are additionally indexed by `(name, assumptions)` so
//! that `symb("x")` always returns the same handle. Dummies skip the index.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use slotmap::{DefaultKey, SlotMap};

use super::interned::InternedSymbol;
use super::{Assumptions, Symbol};

#[inline]
pub(crate) fn key_from_id(id: u64) -> DefaultKey {
    slotmap::KeyData::from_ffi(id).into()
}

struct SymbolTable {
    by_name: Mutex<FxHashMap<(String, Assumptions), DefaultKey>>,
    slots: RwLock<SlotMap<DefaultKey, InternedSymbol>>,
}

static TABLE: LazyLock<SymbolTable> = LazyLock::new(|| SymbolTable {
    by_name: Mutex::new(FxHashMap::default()),
    slots: RwLock::new(SlotMap::with_key()),
});

/// Serial numbers handed out to dummies; monotonic for the life of the process
static DUMMY_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Slots are never removed, so a per-thread copy never goes stale
    static LOCAL_SLOTS: std::cell::RefCell<FxHashMap<DefaultKey, InternedSymbol>> =
        std::cell::RefCell::new(FxHashMap::default());
}

fn allocate(make: impl FnOnce(DefaultKey) -> InternedSymbol) -> DefaultKey {
    TABLE
        .slots
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert_with_key(make)
}

/// Symbol data for an id handed out by this table
pub(crate) fn lookup_by_id(id: u64) -> Option<InternedSymbol> {
    let key = key_from_id(id);
    if let Some(s) = LOCAL_SLOTS.with(|local| local.borrow().get(&key).cloned()) {
        return Some(s);
    }
    let found = TABLE
        .slots
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()?;
    LOCAL_SLOTS.with(|local| local.borrow_mut().insert(key, found.clone()));
    Some(found)
}

/// Handle for `name` with the given assumptions, creating it on first use
pub(crate) fn intern(name: &str, assumptions: Assumptions) -> Symbol {
    let mut by_name = TABLE.by_name.lock().unwrap_or_else(PoisonError::into_inner);
    let index_key = (name.to_owned(), assumptions);
    if let Some(&key) = by_name.get(&index_key) {
        return Symbol(key);
    }
    let key = allocate(|k| InternedSymbol::new_named(name, assumptions, k));
    by_name.insert(index_key, key);
    Symbol(key)
}

/// Fresh dummy, reachable only through the returned handle
pub(crate) fn new_dummy(name: &str) -> Symbol {
    let serial = DUMMY_COUNTER.fetch_add(1, Ordering::Relaxed);
    Symbol(allocate(|k| InternedSymbol::new_dummy(name, serial, k)))
}

/// Commutative symbol with default assumptions
#[must_use]
pub fn symb(name: &str) -> Symbol {
    intern(name, Assumptions::default())
}

/// Number of symbols (named and dummy) created so far
pub fn symbol_count() -> usize {
    TABLE.slots.read().unwrap_or_else(PoisonError::into_inner).len()
}
