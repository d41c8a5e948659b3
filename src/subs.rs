//! Deferred substitution
//!
//! `Subs(expr, variables, point)` means "expr evaluated at variables = point".
//! The constructor renames every variable to a fresh dummy, so the body only
//! mentions private binders and outer substitutions can never capture them.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::core::substitute::substitute;
use crate::core::symbol::Symbol;
use crate::error::{CalculusError, Result};
use crate::{Expr, ExprKind};

/// Deferred substitution node over private dummies
#[derive(Debug, Clone)]
pub struct Subs {
    expr: Arc<Expr>,
    variables: Vec<Symbol>,
    point: Vec<Arc<Expr>>,
}

/// Fresh binder for a user-facing variable
fn binder_for(var: &Expr) -> Symbol {
    match var.as_symbol() {
        Some(s) => Symbol::dummy(&s.name()),
        None => Symbol::dummy("xi"),
    }
}

fn rename_pairs(from: &[Symbol], to: &[Symbol]) -> Vec<(Expr, Expr)> {
    from.iter()
        .zip(to)
        .map(|(a, b)| (a.to_expr(), b.to_expr()))
        .collect()
}

impl Subs {
    /// Build `Subs(expr, variables, point)`
    ///
    /// # Example
    /// ```
    /// use symb_calculus::{Expr, Function, Subs, symb};
    ///
    /// let x = symb("subs_new_x");
    /// let f = Function::new("subs_new_f");
    /// let s = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
    /// assert_eq!(s.doit(), f.of(0.0).unwrap());
    /// ```
    pub fn new(expr: &Expr, variables: &[Expr], point: &[Expr]) -> Result<Expr> {
        if variables.len() != point.len() {
            return Err(CalculusError::SubsLengthMismatch {
                variables: variables.len(),
                points: point.len(),
            });
        }
        for (i, v) in variables.iter().enumerate() {
            if variables[..i].contains(v) {
                return Err(CalculusError::DuplicateVariable(v.to_string()));
            }
        }
        let dummies: Vec<Symbol> = variables.iter().map(binder_for).collect();
        let renames: Vec<(Expr, Expr)> = variables
            .iter()
            .zip(&dummies)
            .map(|(v, d)| (v.clone(), d.to_expr()))
            .collect();
        let body = expr.subs_many(&renames);
        Ok(Self::from_parts(body, dummies, point.to_vec()))
    }

    /// Build a node whose body already refers to `variables`
    ///
    /// Binders the body does not mention are dropped; with none left the body
    /// itself is returned.
    pub(crate) fn from_parts(expr: Expr, variables: Vec<Symbol>, point: Vec<Expr>) -> Expr {
        let free = expr.free_symbols();
        let (variables, point): (Vec<Symbol>, Vec<Arc<Expr>>) = variables
            .into_iter()
            .zip(point)
            .filter(|(d, _)| free.contains(d))
            .map(|(d, p)| (d, Arc::new(p)))
            .unzip();
        if variables.is_empty() {
            return expr;
        }
        Expr::new(ExprKind::Subs(Arc::new(Subs {
            expr: Arc::new(expr),
            variables,
            point,
        })))
    }

    /// Defer `pairs` on `expr`: each distinct `old` becomes a fresh binder
    pub(crate) fn wrap(expr: &Expr, pairs: &[(Expr, Expr)]) -> Expr {
        let mut olds: Vec<&Expr> = Vec::with_capacity(pairs.len());
        let mut news: Vec<Expr> = Vec::with_capacity(pairs.len());
        for (old, new) in pairs {
            if !olds.contains(&old) {
                olds.push(old);
                news.push(new.clone());
            }
        }
        let dummies: Vec<Symbol> = olds.iter().map(|o| binder_for(o)).collect();
        let renames: Vec<(Expr, Expr)> = olds
            .iter()
            .zip(&dummies)
            .map(|(o, d)| ((*o).clone(), d.to_expr()))
            .collect();
        trace!(target: "symb_calculus::subs", expr = %expr, "wrapping in Subs");
        Self::from_parts(expr.subs_many(&renames), dummies, news)
    }

    /// Same binders and point around a new body
    pub(crate) fn with_expr(&self, expr: Expr) -> Expr {
        Self::from_parts(
            expr,
            self.variables.clone(),
            self.point.iter().map(|p| (**p).clone()).collect(),
        )
    }

    /// Body, written in terms of [`Subs::variables`]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Bound dummies
    pub fn variables(&self) -> &[Symbol] {
        &self.variables
    }

    pub fn point(&self) -> &[Arc<Expr>] {
        &self.point
    }

    /// Free symbols of the point plus those of the body that are not bound
    pub fn free_symbols(&self) -> FxHashSet<Symbol> {
        let mut out = self.expr.free_symbols();
        for d in &self.variables {
            out.remove(d);
        }
        for p in &self.point {
            out.extend(p.free_symbols());
        }
        out
    }

    /// Perform the substitution
    ///
    /// Residual unevaluated nodes in the body survive if they cannot reduce.
    pub fn doit(&self) -> Expr {
        let pairs: Vec<(Expr, Expr)> = self
            .variables
            .iter()
            .zip(&self.point)
            .map(|(d, p)| (d.to_expr(), p.doit()))
            .collect();
        self.expr.doit().subs_many(&pairs)
    }

    /// Equal up to a consistent renaming of binders
    pub(crate) fn alpha_eq(&self, other: &Subs) -> bool {
        let n = self.variables.len();
        if n != other.variables.len() {
            return false;
        }
        let mut assignment = vec![0usize; n];
        let mut used = vec![false; n];
        self.match_binders(other, 0, &mut assignment, &mut used)
    }

    fn match_binders(
        &self,
        other: &Subs,
        i: usize,
        assignment: &mut [usize],
        used: &mut [bool],
    ) -> bool {
        if i == assignment.len() {
            let targets: Vec<Symbol> = assignment.iter().map(|&j| other.variables[j]).collect();
            let renamed = self
                .expr
                .subs_many(&rename_pairs(&self.variables, &targets));
            return renamed == *other.expr;
        }
        for j in 0..used.len() {
            if used[j] || self.point[i] != other.point[j] {
                continue;
            }
            used[j] = true;
            assignment[i] = j;
            if self.match_binders(other, i + 1, assignment, used) {
                return true;
            }
            used[j] = false;
        }
        false
    }

    /// Substitution into a Subs node touches free occurrences and the point
    pub(crate) fn substitute(&self, whole: &Expr, pairs: &[(Expr, Expr)]) -> Expr {
        let bound: FxHashSet<Symbol> = self.variables.iter().copied().collect();

        // Replacements mentioning a binder go to the point only
        let body_pairs: Vec<(Expr, Expr)> = pairs
            .iter()
            .filter(|(old, _)| old.free_symbols().is_disjoint(&bound))
            .cloned()
            .collect();

        // Rebind when a replacement would be captured
        let captures = body_pairs
            .iter()
            .any(|(_, new)| !new.free_symbols().is_disjoint(&bound));
        let (variables, body) = if captures {
            let fresh: Vec<Symbol> = self
                .variables
                .iter()
                .map(|d| Symbol::dummy(&d.name()))
                .collect();
            let body = self
                .expr
                .subs_many(&rename_pairs(&self.variables, &fresh));
            (fresh, body)
        } else {
            (self.variables.clone(), (*self.expr).clone())
        };

        let new_body = substitute(&body, &body_pairs);
        let new_point: Vec<Expr> = self.point.iter().map(|p| substitute(p, pairs)).collect();

        let unchanged = !captures
            && new_body == *self.expr
            && new_point.iter().zip(&self.point).all(|(a, b)| a == &**b);
        if unchanged {
            return whole.clone();
        }
        Self::from_parts(new_body, variables, new_point)
    }
}
