//! Derivatives
//!
//! A [`Derivative`] node holds an expression and its canonical list of
//! `(variable, count)` pairs. Evaluation lives in [`engine`]; numeric
//! differentiation of unevaluated nodes lives in [`numeric`].
//!
//! # Canonical variables
//!
//! Maximal runs of symbols and maximal runs of non-symbols are each sorted with
//! [`expr_cmp`], runs never cross each other, and adjacent equal variables merge
//! into one pair. Derivatives with respect to symbols commute, so
//! `Derivative(f(x, y), y, x)` and `Derivative(f(x, y), x, y)` are one node.

pub(crate) mod engine;
pub(crate) mod numeric;

use std::sync::Arc;

use crate::core::symbol::Symbol;
use crate::core::substitute::substitute;
use crate::error::{CalculusError, Result};
use crate::subs::Subs;
use crate::{Expr, ExprKind, expr_cmp};

pub(crate) use engine::evaluate_derivative;

/// Unevaluated derivative node
#[derive(Debug, Clone, PartialEq)]
pub struct Derivative {
    expr: Arc<Expr>,
    pairs: Vec<(Expr, u32)>,
}

/// Sort each run of symbols and each run of non-symbols, keeping runs in place
fn sort_runs<T>(items: &mut [T], key: impl Fn(&T) -> &Expr) {
    let mut start = 0;
    while start < items.len() {
        let symbolic = key(&items[start]).is_symbol();
        let mut end = start + 1;
        while end < items.len() && key(&items[end]).is_symbol() == symbolic {
            end += 1;
        }
        items[start..end].sort_by(|a, b| expr_cmp(key(a), key(b)));
        start = end;
    }
}

impl Derivative {
    /// The differentiated expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Canonical `(variable, count)` pairs
    pub fn pairs(&self) -> &[(Expr, u32)] {
        &self.pairs
    }

    /// Variables with repetition: `Derivative(f, (x, 2), y)` gives `[x, x, y]`
    pub fn variables(&self) -> Vec<Expr> {
        self.pairs
            .iter()
            .flat_map(|(v, n)| std::iter::repeat_n(v.clone(), *n as usize))
            .collect()
    }

    /// Total order of the derivative
    pub fn derivative_count(&self) -> u32 {
        self.pairs.iter().map(|(_, n)| n).sum()
    }

    /// Canonical ordering of a variable list
    ///
    /// Runs of symbols and runs of non-symbols are sorted separately and never
    /// move past each other, since derivatives with respect to a function and to
    /// its argument do not commute.
    ///
    /// # Example
    /// ```
    /// use symb_calculus::{Derivative, Expr, Function, symb};
    ///
    /// let (x, y, z) = (symb("sv_x").to_expr(), symb("sv_y").to_expr(), symb("sv_z").to_expr());
    /// let f = Function::new("sv_f").of(x.clone()).unwrap();
    /// let sorted = Derivative::sort_variables(&[z.clone(), x.clone(), f.clone(), y.clone()]);
    /// assert_eq!(sorted, vec![x, z, f, y]);
    /// ```
    pub fn sort_variables(vars: &[Expr]) -> Vec<Expr> {
        let mut out = vars.to_vec();
        sort_runs(&mut out, |e| e);
        out
    }

    /// Sort and merge `(variable, count)` pairs into canonical form
    pub(crate) fn canonical_pairs(mut pairs: Vec<(Expr, u32)>) -> Vec<(Expr, u32)> {
        pairs.retain(|(_, n)| *n > 0);
        sort_runs(&mut pairs, |(v, _)| v);
        let mut merged: Vec<(Expr, u32)> = Vec::with_capacity(pairs.len());
        for (v, n) in pairs {
            match merged.last_mut() {
                Some((last, count)) if *last == v => *count += n,
                _ => merged.push((v, n)),
            }
        }
        merged
    }

    /// Build an unevaluated node; nested derivative nodes are flattened
    pub(crate) fn new_unevaluated(expr: Expr, pairs: Vec<(Expr, u32)>) -> Expr {
        let pairs: Vec<(Expr, u32)> = pairs.into_iter().filter(|(_, n)| *n > 0).collect();
        if pairs.is_empty() {
            return expr;
        }
        let (inner, all) = match &expr.kind {
            ExprKind::Derivative(d) => {
                let mut all = d.pairs.clone();
                all.extend(pairs);
                (Arc::clone(&d.expr), all)
            }
            _ => (Arc::new(expr), pairs),
        };
        Expr::new(ExprKind::Derivative(Arc::new(Derivative {
            expr: inner,
            pairs: Self::canonical_pairs(all),
        })))
    }

    /// Evaluate this derivative
    pub fn doit(&self) -> Expr {
        evaluate_derivative(self.expr.doit(), self.pairs.clone())
    }

    /// Substitution into an unevaluated derivative
    ///
    /// Replacing a differentiation variable by something that cannot be
    /// differentiated against defers the replacement with a `Subs` node.
    pub(crate) fn substitute(&self, whole: &Expr, pairs: &[(Expr, Expr)]) -> Expr {
        let (deferred, structural): (Vec<_>, Vec<_>) = pairs.iter().cloned().partition(|(old, new)| {
            !new.is_diff_wrt() && self.pairs.iter().any(|(v, _)| v == old)
        });

        let mut result = whole.clone();
        if !structural.is_empty() {
            let expr = substitute(&self.expr, &structural);
            let renamed: Vec<(Expr, u32)> = self
                .pairs
                .iter()
                .map(|(v, n)| (substitute(v, &structural), *n))
                .collect();
            if renamed.iter().all(|(v, _)| v.is_diff_wrt()) {
                if expr != *self.expr || renamed != self.pairs {
                    result = Self::new_unevaluated(expr, renamed);
                }
            } else {
                // A variable stopped being differentiable: defer everything
                result = Subs::wrap(whole, &structural);
            }
        }
        if !deferred.is_empty() {
            tracing::trace!(
                target: "symb_calculus::subs",
                derivative = %whole,
                "deferring substitution of a differentiation variable"
            );
            result = Subs::wrap(&result, &deferred);
        }
        result
    }
}

// =============================================================================
// DIFFERENTIATION SPECS
// =============================================================================

/// One item of a differentiation request
#[derive(Debug, Clone, PartialEq)]
pub enum DiffArg {
    /// Differentiate once more with respect to this variable
    Var(Expr),
    /// Total count for the preceding variable
    Count(u32),
    /// Variable with an explicit count
    Pair(Expr, u32),
}

impl From<Expr> for DiffArg {
    fn from(e: Expr) -> Self {
        DiffArg::Var(e)
    }
}

impl From<&Expr> for DiffArg {
    fn from(e: &Expr) -> Self {
        DiffArg::Var(e.clone())
    }
}

impl From<Symbol> for DiffArg {
    fn from(s: Symbol) -> Self {
        DiffArg::Var(s.to_expr())
    }
}

impl From<&Symbol> for DiffArg {
    fn from(s: &Symbol) -> Self {
        DiffArg::Var(s.to_expr())
    }
}

impl From<u32> for DiffArg {
    fn from(n: u32) -> Self {
        DiffArg::Count(n)
    }
}

impl From<(Expr, u32)> for DiffArg {
    fn from((e, n): (Expr, u32)) -> Self {
        DiffArg::Pair(e, n)
    }
}

impl From<(Symbol, u32)> for DiffArg {
    fn from((s, n): (Symbol, u32)) -> Self {
        DiffArg::Pair(s.to_expr(), n)
    }
}

/// Validate a spec list into `(variable, count)` pairs in call order
pub(crate) fn parse_specs(specs: &[DiffArg]) -> Result<Vec<(Expr, u32)>> {
    let mut pairs: Vec<(Expr, u32)> = Vec::with_capacity(specs.len());
    let mut count_allowed = false;
    for spec in specs {
        match spec {
            DiffArg::Var(v) => {
                pairs.push((v.clone(), 1));
                count_allowed = true;
            }
            DiffArg::Pair(v, n) => {
                pairs.push((v.clone(), *n));
                count_allowed = false;
            }
            DiffArg::Count(n) => match pairs.last_mut() {
                Some((_, count)) if count_allowed => {
                    *count = *n;
                    count_allowed = false;
                }
                Some(_) => {
                    return Err(CalculusError::InvalidDiffSpec(format!(
                        "count {n} does not follow a variable"
                    )));
                }
                None => {
                    return Err(CalculusError::InvalidDiffSpec(format!(
                        "count {n} given before any variable"
                    )));
                }
            },
        }
    }
    if let Some((v, _)) = pairs.iter().find(|(v, _)| !v.is_diff_wrt()) {
        return Err(CalculusError::InvalidDifferentiationVariable(v.to_string()));
    }
    Ok(pairs)
}
