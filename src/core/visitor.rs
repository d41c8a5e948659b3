//! Expression visitor pattern for AST traversal
//!
//! Provides a clean interface for walking the expression tree without
//! manually handling the recursive structure.

use crate::core::symbol::InternedSymbol;
use crate::diff::Derivative;
use crate::lambda::Lambda;
use crate::subs::Subs;
use crate::{Expr, ExprKind};
use std::sync::Arc;

/// Trait for visiting expression nodes in the AST
///
/// Each method returns a boolean indicating whether to continue visiting children.
/// Binder bodies (`Subs`, `Lambda`) are visited with their bound dummies still in place.
///
/// # Example
/// ```
/// use symb_calculus::visitor::{ExprVisitor, walk_expr};
/// use symb_calculus::{Expr, InternedSymbol};
///
/// #[derive(Default)]
/// struct SymbolNames(Vec<String>);
///
/// impl ExprVisitor for SymbolNames {
///     fn visit_symbol(&mut self, s: &InternedSymbol) -> bool {
///         self.0.push(s.name().to_owned());
///         true
///     }
/// }
///
/// let e = Expr::symbol("visit_a") + Expr::symbol("visit_b");
/// let mut names = SymbolNames::default();
/// walk_expr(&e, &mut names);
/// assert_eq!(names.0.len(), 2);
/// ```
pub trait ExprVisitor {
    fn visit_number(&mut self, _n: f64) -> bool {
        true
    }

    fn visit_constant(&mut self, _c: crate::Constant) -> bool {
        true
    }

    fn visit_symbol(&mut self, _s: &InternedSymbol) -> bool {
        true
    }

    /// Visit a function call, returns true to visit arguments
    fn visit_function(&mut self, _name: &str, _args: &[Arc<Expr>]) -> bool {
        true
    }

    /// Visit a sum, product or power (`"+"`, `"*"`, `"^"`), returns true to visit operands
    fn visit_operation(&mut self, _op: &str, _operands: &[&Expr]) -> bool {
        true
    }

    /// Visit a derivative, returns true to visit the inner expression and variables
    fn visit_derivative(&mut self, _d: &Derivative) -> bool {
        true
    }

    /// Visit a deferred substitution, returns true to visit body and point values
    fn visit_subs(&mut self, _s: &Subs) -> bool {
        true
    }

    /// Visit a lambda, returns true to visit the body
    fn visit_lambda(&mut self, _l: &Lambda) -> bool {
        true
    }
}

/// Walk an expression tree with a visitor
///
/// Visits nodes in pre-order (parent before children).
pub fn walk_expr<V: ExprVisitor>(expr: &Expr, visitor: &mut V) {
    let descend = match &expr.kind {
        ExprKind::Number(n) => visitor.visit_number(*n),
        ExprKind::Constant(c) => visitor.visit_constant(*c),
        ExprKind::Symbol(s) => visitor.visit_symbol(s),
        ExprKind::FunctionCall { name, args } => visitor.visit_function(name, args),
        ExprKind::Sum(terms) => {
            let ops: Vec<&Expr> = terms.iter().map(AsRef::as_ref).collect();
            visitor.visit_operation("+", &ops)
        }
        ExprKind::Product(factors) => {
            let ops: Vec<&Expr> = factors.iter().map(AsRef::as_ref).collect();
            visitor.visit_operation("*", &ops)
        }
        ExprKind::Pow(b, e) => visitor.visit_operation("^", &[b, e]),
        ExprKind::Derivative(d) => visitor.visit_derivative(d),
        ExprKind::Subs(s) => visitor.visit_subs(s),
        ExprKind::Lambda(l) => visitor.visit_lambda(l),
    };
    if descend {
        expr.for_each_child(|c| walk_expr(c, visitor));
    }
}

/// A simple visitor that counts nodes
#[derive(Default)]
pub struct NodeCounter {
    pub count: usize,
}

impl ExprVisitor for NodeCounter {
    fn visit_number(&mut self, _n: f64) -> bool {
        self.count += 1;
        true
    }

    fn visit_constant(&mut self, _c: crate::Constant) -> bool {
        self.count += 1;
        true
    }

    fn visit_symbol(&mut self, _s: &InternedSymbol) -> bool {
        self.count += 1;
        true
    }

    fn visit_function(&mut self, _name: &str, _args: &[Arc<Expr>]) -> bool {
        self.count += 1;
        true
    }

    fn visit_operation(&mut self, _op: &str, _operands: &[&Expr]) -> bool {
        self.count += 1;
        true
    }

    fn visit_derivative(&mut self, _d: &Derivative) -> bool {
        self.count += 1;
        true
    }

    fn visit_subs(&mut self, _s: &Subs) -> bool {
        self.count += 1;
        true
    }

    fn visit_lambda(&mut self, _l: &Lambda) -> bool {
        self.count += 1;
        true
    }
}

/// Collects names of applied functions
#[derive(Default)]
pub struct FunctionCollector {
    pub names: Vec<String>,
}

impl ExprVisitor for FunctionCollector {
    fn visit_function(&mut self, name: &str, _args: &[Arc<Expr>]) -> bool {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_owned());
        }
        true
    }
}
