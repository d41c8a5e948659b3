//! Function capability records and the global registry
//!
//! A function is described by what it can do rather than by a type: an optional
//! symbolic evaluation rule, an optional numeric evaluator, optional per-slot
//! partial derivatives and an optional whole-derivative hook. Registering a record
//! is the only step needed to add a new function.

use crate::Expr;
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Symbolic evaluation rule: returns the folded value or `None` to stay unevaluated
pub type EvalFn = Arc<dyn Fn(&[Expr]) -> Option<Expr> + Send + Sync>;

/// Numeric evaluation on complex arguments
pub type NumericFn = Arc<dyn Fn(&[Complex64]) -> Option<Complex64> + Send + Sync>;

/// Partial derivative at an argument slot
/// Takes: (arguments, slot index) -> ∂F/∂arg[slot], or `None` to decline
pub type PartialFn = Arc<dyn Fn(&[Expr], usize) -> Option<Expr> + Send + Sync>;

/// Whole derivative hook
/// Takes: (arguments, variable) -> dF/dvar, or `None` when not handled
pub type DerivativeHookFn = Arc<dyn Fn(&[Expr], &Expr) -> Option<Expr> + Send + Sync>;

/// Definition of a function: arity plus evaluation and differentiation capabilities
///
/// # Example
/// ```
/// use symb_calculus::{Expr, FunctionDefinition, register_function};
///
/// // F(x, y) = x * sin(y)
/// register_function(
///     FunctionDefinition::new("doc_F")
///         .arity(2..=2)
///         .partial(|args, slot| match slot {
///             0 => Some(args[1].clone().sin()),
///             _ => Some(args[0].clone() * args[1].clone().cos()),
///         }),
/// );
/// ```
#[derive(Clone)]
pub struct FunctionDefinition {
    pub(crate) name: Arc<str>,
    pub(crate) arity: RangeInclusive<usize>,
    pub(crate) eval: Option<EvalFn>,
    pub(crate) numeric: Option<NumericFn>,
    pub(crate) partial: Option<PartialFn>,
    pub(crate) derivative: Option<DerivativeHookFn>,
}

impl FunctionDefinition {
    /// Create a single-argument definition with no capabilities
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            arity: 1..=1,
            eval: None,
            numeric: None,
            partial: None,
            derivative: None,
        }
    }

    /// Acceptable argument count
    pub fn arity(mut self, arity: RangeInclusive<usize>) -> Self {
        self.arity = arity;
        self
    }

    /// Set the symbolic evaluation rule
    pub fn eval<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Expr]) -> Option<Expr> + Send + Sync + 'static,
    {
        self.eval = Some(Arc::new(f));
        self
    }

    /// Set the numeric evaluation function
    pub fn numeric<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Complex64]) -> Option<Complex64> + Send + Sync + 'static,
    {
        self.numeric = Some(Arc::new(f));
        self
    }

    /// Set the partial derivative rule, called once per argument slot
    pub fn partial<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Expr], usize) -> Option<Expr> + Send + Sync + 'static,
    {
        self.partial = Some(Arc::new(f));
        self
    }

    /// Set a derivative hook that replaces the chain rule for this function
    pub fn derivative<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Expr], &Expr) -> Option<Expr> + Send + Sync + 'static,
    {
        self.derivative = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Helper to check if argument count is valid
    pub(crate) fn validate_arity(&self, args: usize) -> bool {
        self.arity.contains(&args)
    }

    /// Human-readable arity for error messages
    pub(crate) fn arity_description(&self) -> String {
        let (lo, hi) = (*self.arity.start(), *self.arity.end());
        if lo == hi {
            lo.to_string()
        } else if hi == usize::MAX {
            format!("at least {lo}")
        } else {
            format!("{lo} to {hi}")
        }
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("eval", &self.eval.is_some())
            .field("numeric", &self.numeric.is_some())
            .field("partial", &self.partial.is_some())
            .field("derivative", &self.derivative.is_some())
            .finish()
    }
}

/// Global registry storing all function definitions
static REGISTRY: LazyLock<RwLock<FxHashMap<Arc<str>, Arc<FunctionDefinition>>>> =
    LazyLock::new(|| {
        let defs = crate::functions::definitions::all_definitions();
        let mut map = FxHashMap::with_capacity_and_hasher(defs.len(), Default::default());
        for def in defs {
            map.insert(Arc::clone(&def.name), Arc::new(def));
        }
        RwLock::new(map)
    });

/// Central registry for getting function definitions
pub(crate) struct Registry;

impl Registry {
    /// Get a function definition by name
    pub(crate) fn get(name: &str) -> Option<Arc<FunctionDefinition>> {
        REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn insert(def: FunctionDefinition) -> Option<Arc<FunctionDefinition>> {
        REGISTRY
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::clone(&def.name), Arc::new(def))
    }
}

/// Add or replace a function definition
///
/// Returns the previous definition registered under the same name.
pub fn register_function(def: FunctionDefinition) -> Option<Arc<FunctionDefinition>> {
    tracing::debug!(target: "symb_calculus::functions", name = %def.name, "registering function");
    Registry::insert(def)
}

/// Whether a definition exists for `name`
pub fn is_registered(name: &str) -> bool {
    Registry::get(name).is_some()
}
