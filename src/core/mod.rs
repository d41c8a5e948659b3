//! Core types for symbolic calculus
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - Expression AST with alpha-aware hashing
//! - `Symbol` / `InternedSymbol` - Symbol and dummy system
//! - Generic substitution, deep forcing and numeric evaluation
//! - Display formatting
//! - Visitor pattern for AST traversal

mod display;
mod doit;
pub(crate) mod evaluator;
pub(crate) mod expr;
mod operators;
pub(crate) mod substitute;
pub(crate) mod symbol;
pub mod visitor;

pub use evaluator::Bindings;
pub use expr::{Constant, Expr, ExprKind, expr_cmp};
pub use symbol::{Assumptions, InternedSymbol, Symbol, symb, symbol_count};
