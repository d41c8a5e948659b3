//! Generic substitution
//!
//! Replacement is simultaneous and matches whole nodes: once a node equals one of
//! the `old` expressions it is replaced and not descended into. Rebuilt nodes go
//! through the smart constructors and function evaluation rules, so substituting
//! a number folds what it can. Binder nodes handle their own bound variables.

use std::sync::Arc;

use crate::{Expr, ExprKind};

/// Rebuild children through `f`; `None` when every child came back unchanged
fn map_children(children: &[Arc<Expr>], f: impl Fn(&Expr) -> Expr) -> Option<Vec<Expr>> {
    let mut changed = false;
    let out: Vec<Expr> = children
        .iter()
        .map(|c| {
            let n = f(c);
            changed |= n != **c;
            n
        })
        .collect();
    changed.then_some(out)
}

pub(crate) fn substitute(expr: &Expr, pairs: &[(Expr, Expr)]) -> Expr {
    if let Some((_, new)) = pairs.iter().find(|(old, _)| old == expr) {
        return new.clone();
    }
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => expr.clone(),

        ExprKind::Sum(terms) => map_children(terms, |t| substitute(t, pairs))
            .map_or_else(|| expr.clone(), Expr::sum),

        ExprKind::Product(factors) => map_children(factors, |f| substitute(f, pairs))
            .map_or_else(|| expr.clone(), Expr::product),

        ExprKind::Pow(base, exp) => {
            let b = substitute(base, pairs);
            let e = substitute(exp, pairs);
            if b == **base && e == **exp {
                expr.clone()
            } else {
                Expr::pow(b, e)
            }
        }

        // Unchanged applications keep their node, so `call_unevaluated` survives
        ExprKind::FunctionCall { name, args } => map_children(args, |a| substitute(a, pairs))
            .map_or_else(
                || expr.clone(),
                |args| crate::functions::evaluate_call(name, args),
            ),

        ExprKind::Derivative(d) => d.substitute(expr, pairs),
        ExprKind::Subs(s) => s.substitute(expr, pairs),
        ExprKind::Lambda(l) => l.substitute(expr, pairs),
    }
}

impl Expr {
    /// Replace every occurrence of `old` with `new`
    ///
    /// # Example
    /// ```
    /// use symb_calculus::{Expr, symb};
    ///
    /// let x = symb("subs_doc_x");
    /// let e = x.pow(2.0) + 1.0;
    /// assert_eq!(e.subs(&x.to_expr(), &Expr::number(3.0)), Expr::number(10.0));
    /// ```
    pub fn subs(&self, old: &Expr, new: &Expr) -> Expr {
        substitute(self, &[(old.clone(), new.clone())])
    }

    /// Simultaneous substitution: `x -> y, y -> x` swaps
    pub fn subs_many(&self, pairs: &[(Expr, Expr)]) -> Expr {
        if pairs.is_empty() {
            return self.clone();
        }
        substitute(self, pairs)
    }
}
