//! Function applications and the function registry
//!
//! This module provides a single source of truth for builtin and registered
//! functions. Applying a function validates its arity and then runs its
//! evaluation rule, so construction and folding happen in one step.

use crate::Expr;

pub(crate) mod application;
pub(crate) mod definitions;
pub(crate) mod registry;

pub use application::Function;
pub use registry::{
    DerivativeHookFn, EvalFn, FunctionDefinition, NumericFn, PartialFn, is_registered,
    register_function,
};

/// Build an application, folding it through the registered evaluation rule
pub(crate) fn evaluate_call(name: &str, args: Vec<Expr>) -> Expr {
    if let Some(def) = registry::Registry::get(name)
        && let Some(eval) = &def.eval
        && let Some(folded) = eval(&args)
    {
        return folded;
    }
    Expr::func_raw(name, args)
}

/// Apply a single-argument builtin
pub(crate) fn builtin(name: &str, arg: Expr) -> Expr {
    evaluate_call(name, vec![arg])
}
