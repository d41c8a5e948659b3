//! Deep forcing of unevaluated nodes

use std::sync::Arc;

use crate::diff::evaluate_derivative;
use crate::lambda::Lambda;
use crate::{Expr, ExprKind};

fn doit_all(children: &[Arc<Expr>]) -> Option<Vec<Expr>> {
    let mut changed = false;
    let out: Vec<Expr> = children
        .iter()
        .map(|c| {
            let n = c.doit();
            changed |= n != **c;
            n
        })
        .collect();
    changed.then_some(out)
}

impl Expr {
    /// Evaluate every derivative and substitution in the tree
    ///
    /// # Example
    /// ```
    /// use symb_calculus::{Diff, symb};
    ///
    /// let x = symb("doit_x");
    /// let lazy = Diff::new().evaluate(false).differentiate(&x.pow(2.0), &[x.into()]).unwrap();
    /// assert_eq!(lazy.doit(), 2.0 * x);
    /// ```
    pub fn doit(&self) -> Expr {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => self.clone(),
            ExprKind::Sum(terms) => doit_all(terms).map_or_else(|| self.clone(), Expr::sum),
            ExprKind::Product(factors) => {
                doit_all(factors).map_or_else(|| self.clone(), Expr::product)
            }
            ExprKind::Pow(base, exp) => {
                let (b, e) = (base.doit(), exp.doit());
                if b == **base && e == **exp {
                    self.clone()
                } else {
                    Expr::pow(b, e)
                }
            }
            ExprKind::FunctionCall { name, args } => doit_all(args).map_or_else(
                || self.clone(),
                |args| crate::functions::evaluate_call(name, args),
            ),
            ExprKind::Derivative(d) => evaluate_derivative(d.expr().doit(), d.pairs().to_vec()),
            ExprKind::Subs(s) => s.doit(),
            ExprKind::Lambda(l) => {
                let body = l.body().doit();
                if body == *l.body() {
                    self.clone()
                } else {
                    Lambda::from_parts(l.params().to_vec(), body)
                }
            }
        }
    }
}
