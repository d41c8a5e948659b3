//! Symbolic Calculus Kernel
//!
//! A focused Rust library for the calculus layer of a computer algebra system:
//! derivatives that stay symbolic when they cannot be evaluated, deferred
//! substitution with private binders, and lambda abstraction.
//!
//! # Features
//! - Derivative engine with the chain rule through undefined functions and
//!   substitution points
//! - Canonical `(variable, count)` ordering for unevaluated derivatives
//! - Capture-avoiding `Subs` nodes and alpha-equivalent `Lambda` nodes
//! - **Function registry** of capability records for builtin and user functions
//! - Numeric differentiation and truncated Taylor series with pole detection
//! - **Builder pattern API** for differentiation
//!
//! # Usage Examples
//!
//! ```
//! use symb_calculus::{Expr, Function, Subs, diff, symb};
//!
//! let x = symb("lib_doc_x");
//! let f = Function::new("lib_doc_f");
//!
//! // d/dx f(2x) = 2 * Subs(Derivative(f(xi), xi), xi, 2x)
//! let d = diff(&f.of(2.0 * x).unwrap(), &[x.into()]).unwrap();
//! assert!(d.to_string().starts_with("2*Subs(Derivative(lib_doc_f("));
//!
//! // Forcing a substitution
//! let s = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
//! assert_eq!(s.doit(), f.of(0.0).unwrap());
//! ```

mod builder;
mod core;
mod diff;
mod error;
pub mod functions;
mod lambda;
mod series;
mod subs;
pub(crate) mod traits;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use builder::Diff;
pub use crate::core::visitor;
pub use crate::core::{
    Assumptions, Bindings, Constant, Expr, ExprKind, InternedSymbol, Symbol, expr_cmp, symb,
    symbol_count,
};
pub use diff::{Derivative, DiffArg};
pub use error::{CalculusError, Result};
pub use functions::{
    DerivativeHookFn, EvalFn, Function, FunctionDefinition, NumericFn, PartialFn, is_registered,
    register_function,
};
pub use lambda::Lambda;
pub use series::SeriesExpansion;
pub use subs::Subs;

/// Default maximum AST depth
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum AST node count
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Main API function for symbolic differentiation
///
/// # Arguments
/// * `expr` - Expression to differentiate
/// * `specs` - Variables, counts and `(variable, count)` pairs, e.g. `[x, 2, y]`
///
/// # Example
/// ```
/// use symb_calculus::{diff, symb};
///
/// let x = symb("diff_doc_x");
/// let result = diff(&x.pow(3.0), &[x.into(), 2u32.into()]).unwrap();
/// assert_eq!(result, 6.0 * x);
/// ```
///
/// # Note
/// For more control (evaluate, max_depth, etc.), use the `Diff` builder:
/// ```
/// # use symb_calculus::{Diff, symb};
/// # let x = symb("diff_doc_y");
/// Diff::new().evaluate(false).differentiate(&x.sin(), &[x.into()]).unwrap();
/// ```
pub fn diff(expr: &Expr, specs: &[DiffArg]) -> Result<Expr> {
    Diff::new()
        .max_depth(DEFAULT_MAX_DEPTH)
        .max_nodes(DEFAULT_MAX_NODES)
        .differentiate(expr, specs)
}

/// Truncated Taylor expansion of `expr` about `var = point`
///
/// Fails with [`CalculusError::Pole`] when the expansion point is singular.
pub fn series(
    expr: &Expr,
    var: Symbol,
    point: impl Into<Expr>,
    order: u32,
) -> Result<SeriesExpansion> {
    expr.series(var, point, order)
}
