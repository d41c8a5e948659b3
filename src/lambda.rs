//! Lambda abstraction
//!
//! Parameters are ordinary symbols; equality is alpha-equivalence, so only arity
//! and the positions of parameters inside the body matter. The one-parameter
//! identity is a process-wide singleton.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashSet;

use crate::core::substitute::substitute;
use crate::core::symbol::Symbol;
use crate::error::{CalculusError, Result};
use crate::{Expr, ExprKind};

#[derive(Debug, Clone)]
pub struct Lambda {
    params: Vec<Symbol>,
    body: Arc<Expr>,
}

static IDENTITY: OnceLock<Arc<Lambda>> = OnceLock::new();

fn identity_node() -> &'static Arc<Lambda> {
    IDENTITY.get_or_init(|| {
        let x = Symbol::dummy("x");
        Arc::new(Lambda {
            params: vec![x],
            body: Arc::new(x.to_expr()),
        })
    })
}

impl Lambda {
    /// Build `Lambda(params, body)`
    ///
    /// # Example
    /// ```
    /// use symb_calculus::{Expr, Lambda, symb};
    ///
    /// let x = symb("lam_doc_x");
    /// let double = Lambda::new(&[x.to_expr()], &(2.0 * x)).unwrap();
    /// let six = double.apply_lambda(&[Expr::number(3.0)]).unwrap();
    /// assert_eq!(six, Expr::number(6.0));
    /// ```
    pub fn new(params: &[Expr], body: &Expr) -> Result<Expr> {
        let mut symbols = Vec::with_capacity(params.len());
        for p in params {
            let s = p
                .as_symbol()
                .ok_or_else(|| CalculusError::InvalidParameter(p.to_string()))?;
            if symbols.contains(&s) {
                return Err(CalculusError::DuplicateVariable(p.to_string()));
            }
            symbols.push(s);
        }
        Ok(Self::from_parts(symbols, body.clone()))
    }

    /// Wrap into an expression, returning the shared identity where it applies
    pub(crate) fn from_parts(params: Vec<Symbol>, body: Expr) -> Expr {
        let node = match params.as_slice() {
            [p] if body.as_symbol() == Some(*p) => Arc::clone(identity_node()),
            _ => Arc::new(Lambda {
                params,
                body: Arc::new(body),
            }),
        };
        Expr::new(ExprKind::Lambda(node))
    }

    /// The cached `Lambda(x, x)`
    pub fn identity_function() -> Expr {
        Expr::new(ExprKind::Lambda(Arc::clone(identity_node())))
    }

    pub fn is_identity(&self) -> bool {
        std::ptr::eq(self, Arc::as_ptr(identity_node()))
    }

    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// Number of parameters
    pub fn nargs(&self) -> usize {
        self.params.len()
    }

    pub fn arity(&self) -> usize {
        self.nargs()
    }

    pub fn free_symbols(&self) -> FxHashSet<Symbol> {
        let mut out = self.body.free_symbols();
        for p in &self.params {
            out.remove(p);
        }
        out
    }

    /// Substitute arguments for parameters, positionally
    pub fn apply(&self, args: &[Expr]) -> Result<Expr> {
        if args.len() != self.params.len() {
            return Err(CalculusError::LambdaArity {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        let pairs: Vec<(Expr, Expr)> = self
            .params
            .iter()
            .zip(args)
            .map(|(p, a)| (p.to_expr(), a.clone()))
            .collect();
        Ok(self.body.subs_many(&pairs))
    }

    pub(crate) fn alpha_eq(&self, other: &Lambda) -> bool {
        if self.params.len() != other.params.len() {
            return false;
        }
        let pairs: Vec<(Expr, Expr)> = other
            .params
            .iter()
            .zip(&self.params)
            .map(|(o, s)| (o.to_expr(), s.to_expr()))
            .collect();
        other.body.subs_many(&pairs) == *self.body
    }

    /// Capture-avoiding substitution into the body
    pub(crate) fn substitute(&self, whole: &Expr, pairs: &[(Expr, Expr)]) -> Expr {
        let bound: FxHashSet<Symbol> = self.params.iter().copied().collect();
        let body_pairs: Vec<(Expr, Expr)> = pairs
            .iter()
            .filter(|(old, _)| old.free_symbols().is_disjoint(&bound))
            .cloned()
            .collect();
        if body_pairs.is_empty() {
            return whole.clone();
        }

        let captures = body_pairs
            .iter()
            .any(|(_, new)| !new.free_symbols().is_disjoint(&bound));
        let (params, body) = if captures {
            let fresh: Vec<Symbol> = self.params.iter().map(|p| Symbol::dummy(&p.name())).collect();
            let renames: Vec<(Expr, Expr)> = self
                .params
                .iter()
                .zip(&fresh)
                .map(|(p, f)| (p.to_expr(), f.to_expr()))
                .collect();
            (fresh, self.body.subs_many(&renames))
        } else {
            (self.params.clone(), (*self.body).clone())
        };

        let new_body = substitute(&body, &body_pairs);
        if !captures && new_body == *self.body {
            return whole.clone();
        }
        Self::from_parts(params, new_body)
    }
}

impl Expr {
    /// Apply a lambda expression to arguments
    pub fn apply_lambda(&self, args: &[Expr]) -> Result<Expr> {
        match &self.kind {
            ExprKind::Lambda(l) => l.apply(args),
            _ => Err(CalculusError::NotCallable(self.to_string())),
        }
    }
}
