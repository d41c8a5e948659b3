//! Builder pattern API for differentiation
//!
//! Provides a fluent interface for configuring and executing differentiation.
//!
//! # Example
//! ```
//! use symb_calculus::{Diff, symb};
//!
//! let x = symb("builder_doc_x");
//! let expr = x.pow(2.0) + x.sin();
//!
//! let derivative = Diff::new()
//!     .max_depth(50)
//!     .differentiate(&expr, &[x.into()])
//!     .unwrap();
//! assert_eq!(derivative, 2.0 * x + x.cos());
//! ```

use crate::diff::{Derivative, DiffArg, evaluate_derivative, parse_specs};
use crate::error::{CalculusError, Result};
use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Expr};

/// Builder for differentiation operations
#[derive(Clone, Debug)]
pub struct Diff {
    evaluate: bool,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
}

impl Default for Diff {
    fn default() -> Self {
        Self {
            evaluate: true,
            max_depth: None,
            max_nodes: None,
        }
    }
}

impl Diff {
    /// Create a new differentiation builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the derivative (default) or return an unevaluated `Derivative` node
    pub fn evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    /// Set maximum AST depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set maximum AST node count
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Differentiate `expr` according to `specs`
    ///
    /// An empty request, or one whose counts are all zero, returns `expr`.
    pub fn differentiate(&self, expr: &Expr, specs: &[DiffArg]) -> Result<Expr> {
        // Check limits
        if let Some(max_d) = self.max_depth
            && expr.max_depth() > max_d
        {
            return Err(CalculusError::MaxDepthExceeded);
        }
        if let Some(max_n) = self.max_nodes
            && expr.node_count() > max_n
        {
            return Err(CalculusError::MaxNodesExceeded);
        }

        let pairs = parse_specs(specs)?;
        if pairs.iter().all(|(_, n)| *n == 0) {
            return Ok(expr.clone());
        }

        Ok(if self.evaluate {
            evaluate_derivative(expr.clone(), pairs)
        } else {
            Derivative::new_unevaluated(expr.clone(), pairs)
        })
    }
}

fn default_limits() -> Diff {
    Diff::new()
        .max_depth(DEFAULT_MAX_DEPTH)
        .max_nodes(DEFAULT_MAX_NODES)
}

impl Expr {
    /// First derivative with respect to `var`
    pub fn diff(&self, var: impl Into<Expr>) -> Result<Expr> {
        default_limits().differentiate(self, &[DiffArg::Var(var.into())])
    }

    /// `n`-th derivative with respect to `var`
    pub fn diff_n(&self, var: impl Into<Expr>, n: u32) -> Result<Expr> {
        default_limits().differentiate(self, &[DiffArg::Pair(var.into(), n)])
    }

    /// Derivative for a full spec list: `e.derivative(&[x.into(), 2u32.into(), y.into()])`
    pub fn derivative(&self, specs: &[DiffArg]) -> Result<Expr> {
        default_limits().differentiate(self, specs)
    }
}
