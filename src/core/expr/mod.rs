//! Expression tree
//!
//! N-ary Sum/Product architecture with a precomputed structural hash on every node.
//! Binder nodes (`Subs`, `Lambda`) hash and compare up to renaming of their bound
//! variables, so alpha-equivalent nodes share a hash.

mod constructors;
pub(crate) mod ordering;

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::symbol::{InternedSymbol, Symbol};
use crate::diff::Derivative;
use crate::lambda::Lambda;
use crate::subs::Subs;

pub use ordering::expr_cmp;

// =============================================================================
// EXPRESSION ID COUNTER
// =============================================================================

static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

// =============================================================================
// EXPR - The main expression type
// =============================================================================

#[derive(Debug, Clone)]
pub struct Expr {
    /// Unique ID for debugging (not used in equality comparisons)
    pub id: u64,
    /// Structural hash for O(1) equality rejection
    pub hash: u64,
    pub kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl std::hash::Hash for Expr {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// Named mathematical constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    /// Imaginary unit
    I,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "E",
            Self::I => "I",
        }
    }
}

// =============================================================================
// EXPRKIND
// =============================================================================

#[derive(Debug, Clone)]
pub enum ExprKind {
    Number(f64),

    Constant(Constant),

    /// Symbol or dummy
    Symbol(InternedSymbol),

    /// Application of a builtin, registered or undefined function
    FunctionCall {
        name: Arc<str>,
        args: Vec<Arc<Expr>>,
    },

    /// N-ary sum, flat and sorted. `a - b` is `Sum([a, Product([-1, b])])`
    Sum(Vec<Arc<Expr>>),

    /// N-ary product: numeric coefficient first, then sorted commutative
    /// factors, then non-commutative factors in their original order
    Product(Vec<Arc<Expr>>),

    Pow(Arc<Expr>, Arc<Expr>),

    /// Unevaluated derivative with canonical (variable, count) pairs
    Derivative(Arc<Derivative>),

    /// Deferred substitution over private dummies
    Subs(Arc<Subs>),

    Lambda(Arc<Lambda>),
}

impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        use ExprKind::*;
        match (self, other) {
            (Number(a), Number(b)) => a == b,
            (Constant(a), Constant(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (
                FunctionCall {
                    name: n1,
                    args: a1,
                },
                FunctionCall {
                    name: n2,
                    args: a2,
                },
            ) => n1 == n2 && a1 == a2,
            (Sum(a), Sum(b)) | (Product(a), Product(b)) => a == b,
            (Pow(b1, e1), Pow(b2, e2)) => b1 == b2 && e1 == e2,
            (Derivative(a), Derivative(b)) => Arc::ptr_eq(a, b) || a == b,
            (Subs(a), Subs(b)) => Arc::ptr_eq(a, b) || a.alpha_eq(b),
            (Lambda(a), Lambda(b)) => Arc::ptr_eq(a, b) || a.alpha_eq(b),
            _ => false,
        }
    }
}

// =============================================================================
// STRUCTURAL HASHING
// =============================================================================

/// Replacement hashes for bound variables, keyed by symbol id
pub(crate) type BoundEnv = FxHashMap<u64, u64>;

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

#[inline(always)]
fn hash_u64(mut hash: u64, n: u64) -> u64 {
    for byte in n.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline(always)]
fn hash_byte(mut hash: u64, b: u8) -> u64 {
    hash ^= b as u64;
    hash.wrapping_mul(FNV_PRIME)
}

fn hash_str(hash: u64, s: &str) -> u64 {
    s.as_bytes().iter().fold(hash, |acc, &b| hash_byte(acc, b))
}

/// Hash of a child under `env`; cached hashes are valid only when nothing is bound
#[inline]
fn hash_in_env(e: &Expr, env: &BoundEnv) -> u64 {
    if env.is_empty() {
        e.hash
    } else {
        hash_kind(&e.kind, env)
    }
}

/// Marker hash standing in for a bound variable
pub(crate) fn binder_marker(tag: u8, payload: u64) -> u64 {
    hash_u64(hash_byte(FNV_OFFSET, tag), payload)
}

fn hash_kind(kind: &ExprKind, env: &BoundEnv) -> u64 {
    let hash = FNV_OFFSET;
    match kind {
        ExprKind::Number(n) => {
            // -0.0 and 0.0 compare equal, so they must hash equal
            let n = if *n == 0.0 { 0.0 } else { *n };
            hash_u64(hash_byte(hash, b'N'), n.to_bits())
        }

        ExprKind::Constant(c) => hash_u64(hash_byte(hash, b'C'), *c as u64),

        ExprKind::Symbol(s) => match env.get(&s.id()) {
            Some(&marker) => marker,
            None => hash_u64(hash_byte(hash, b'S'), s.id()),
        },

        // Commutative (order-independent) hashing
        ExprKind::Sum(terms) => {
            let acc = terms
                .iter()
                .fold(0u64, |acc, t| acc.wrapping_add(hash_in_env(t, env)));
            hash_u64(hash_byte(hash, b'+'), acc)
        }

        ExprKind::Product(factors) => {
            let acc = factors
                .iter()
                .fold(0u64, |acc, f| acc.wrapping_add(hash_in_env(f, env)));
            hash_u64(hash_byte(hash, b'*'), acc)
        }

        ExprKind::Pow(base, exp) => {
            let h = hash_u64(hash_byte(hash, b'^'), hash_in_env(base, env));
            hash_u64(h, hash_in_env(exp, env))
        }

        ExprKind::FunctionCall { name, args } => {
            let h = hash_str(hash_byte(hash, b'F'), name);
            args.iter()
                .fold(h, |acc, arg| hash_u64(acc, hash_in_env(arg, env)))
        }

        ExprKind::Derivative(d) => {
            let h = hash_u64(hash_byte(hash, b'D'), hash_in_env(d.expr(), env));
            d.pairs().iter().fold(h, |acc, (v, n)| {
                hash_u64(hash_u64(acc, hash_in_env(v, env)), u64::from(*n))
            })
        }

        // Bound dummies hash as their point value, so any consistent renaming
        // (and any reordering of the binder list) gives the same hash.
        ExprKind::Subs(s) => {
            let mut inner = env.clone();
            let mut points = 0u64;
            for (d, p) in s.variables().iter().zip(s.point()) {
                let ph = hash_in_env(p, env);
                points = points.wrapping_add(ph);
                inner.insert(d.id(), binder_marker(b'B', ph));
            }
            let h = hash_u64(hash_byte(hash, b'U'), hash_kind(&s.expr().kind, &inner));
            hash_u64(h, points)
        }

        // Parameters hash by position
        ExprKind::Lambda(l) => {
            let mut inner = env.clone();
            for (i, p) in l.params().iter().enumerate() {
                inner.insert(p.id(), binder_marker(b'L', i as u64));
            }
            let h = hash_u64(hash_byte(hash, b'L'), l.params().len() as u64);
            hash_u64(h, hash_kind(&l.body().kind, &inner))
        }
    }
}

fn compute_expr_hash(kind: &ExprKind) -> u64 {
    hash_kind(kind, &BoundEnv::default())
}

// =============================================================================
// EXPR METHODS
// =============================================================================

impl Expr {
    /// Wrap a kind without any canonicalization
    pub fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Expr {
            id: next_id(),
            hash,
            kind,
        }
    }

    // -------------------------------------------------------------------------
    // Accessor methods
    // -------------------------------------------------------------------------

    pub fn as_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.kind, ExprKind::Number(_))
    }

    #[inline]
    pub fn is_zero_num(&self) -> bool {
        self.as_number().is_some_and(crate::traits::is_zero)
    }

    #[inline]
    pub fn is_one_num(&self) -> bool {
        self.as_number().is_some_and(crate::traits::is_one)
    }

    #[inline]
    pub fn is_neg_one_num(&self) -> bool {
        self.as_number().is_some_and(crate::traits::is_neg_one)
    }

    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self.kind, ExprKind::Symbol(_))
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(Symbol::from_id(s.id())),
            _ => None,
        }
    }

    pub(crate) fn as_interned(&self) -> Option<&InternedSymbol> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Function name and arguments of an application
    pub fn as_function(&self) -> Option<(&str, &[Arc<Expr>])> {
        match &self.kind {
            ExprKind::FunctionCall { name, args } => Some((name, args)),
            _ => None,
        }
    }

    pub fn as_derivative(&self) -> Option<&Arc<Derivative>> {
        match &self.kind {
            ExprKind::Derivative(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_subs(&self) -> Option<&Arc<Subs>> {
        match &self.kind {
            ExprKind::Subs(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Arc<Lambda>> {
        match &self.kind {
            ExprKind::Lambda(l) => Some(l),
            _ => None,
        }
    }

    /// Visit the direct children of this node (binder bodies included)
    pub(crate) fn for_each_child(&self, mut f: impl FnMut(&Expr)) {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => {}
            ExprKind::FunctionCall { args, .. } | ExprKind::Sum(args) | ExprKind::Product(args) => {
                args.iter().for_each(|a| f(a));
            }
            ExprKind::Pow(b, e) => {
                f(b);
                f(e);
            }
            ExprKind::Derivative(d) => {
                f(d.expr());
                d.pairs().iter().for_each(|(v, _)| f(v));
            }
            ExprKind::Subs(s) => {
                f(s.expr());
                s.point().iter().for_each(|p| f(p));
            }
            ExprKind::Lambda(l) => f(l.body()),
        }
    }

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------

    /// Whether this expression may be used as a differentiation variable:
    /// symbols, function applications and derivatives of those
    pub fn is_diff_wrt(&self) -> bool {
        match &self.kind {
            ExprKind::Symbol(_) | ExprKind::FunctionCall { .. } => true,
            ExprKind::Derivative(d) => d.expr().is_diff_wrt(),
            _ => false,
        }
    }

    pub fn is_commutative(&self) -> bool {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Lambda(_) => true,
            ExprKind::Symbol(s) => s.is_commutative(),
            _ => {
                let mut all = true;
                self.for_each_child(|c| all &= c.is_commutative());
                all
            }
        }
    }

    /// Free symbols, respecting `Subs` and `Lambda` binders
    pub fn free_symbols(&self) -> FxHashSet<Symbol> {
        let mut out = FxHashSet::default();
        self.collect_free_symbols(&mut out);
        out
    }

    fn collect_free_symbols(&self, out: &mut FxHashSet<Symbol>) {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) => {}
            ExprKind::Symbol(s) => {
                out.insert(Symbol::from_id(s.id()));
            }
            // Variables of a derivative only matter through the inner expression
            ExprKind::Derivative(d) => d.expr().collect_free_symbols(out),
            ExprKind::Subs(s) => {
                let mut body = s.expr().free_symbols();
                for d in s.variables() {
                    body.remove(d);
                }
                out.extend(body);
                for p in s.point() {
                    p.collect_free_symbols(out);
                }
            }
            ExprKind::Lambda(l) => {
                let mut body = l.body().free_symbols();
                for p in l.params() {
                    body.remove(p);
                }
                out.extend(body);
            }
            _ => self.for_each_child(|c| c.collect_free_symbols(out)),
        }
    }

    /// Whether `pattern` occurs as a sub-tree
    pub fn has(&self, pattern: &Expr) -> bool {
        if self == pattern {
            return true;
        }
        let mut found = false;
        self.for_each_child(|c| found = found || c.has(pattern));
        found
    }

    /// Whether this expression depends on `sym`
    #[inline]
    pub fn contains_symbol(&self, sym: Symbol) -> bool {
        self.free_symbols().contains(&sym)
    }

    /// Finite real value with no free symbols
    pub fn is_comparable(&self) -> bool {
        self.free_symbols().is_empty()
            && self
                .evalf()
                .is_ok_and(|z| z.re.is_finite() && z.im.abs() < crate::traits::FLOAT_TOLERANCE)
    }

    pub fn node_count(&self) -> usize {
        let mut counter = crate::core::visitor::NodeCounter::default();
        crate::core::visitor::walk_expr(self, &mut counter);
        counter.count
    }

    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        self.for_each_child(|c| deepest = deepest.max(c.max_depth()));
        deepest + 1
    }
}
