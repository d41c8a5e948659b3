//! Smart constructors.
//!
//! `sum`, `product` and `pow` return canonical trees: nested sums and products are
//! flattened, numbers folded, like terms and like bases collected, and commutative
//! operands sorted with `expr_cmp`. Every rebuild of a tree (substitution,
//! differentiation) goes through these, so equal values always get equal trees.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::ordering::expr_cmp;
use super::{Constant, Expr, ExprKind};
use crate::core::symbol::{InternedSymbol, symb};
use crate::traits::{COEFF_EPSILON, FLOAT_TOLERANCE, as_integer};

fn sort_canonical(items: &mut [Arc<Expr>]) {
    items.sort_by(|a, b| expr_cmp(a, b).then_with(|| a.hash.cmp(&b.hash)));
}

/// Split a term into numeric coefficient and remaining factor
fn split_coefficient(term: &Arc<Expr>) -> (f64, Arc<Expr>) {
    if let ExprKind::Product(factors) = &term.kind
        && let ExprKind::Number(c) = factors[0].kind
    {
        let rest = if factors.len() == 2 {
            Arc::clone(&factors[1])
        } else {
            Arc::new(Expr::new(ExprKind::Product(factors[1..].to_vec())))
        };
        return (c, rest);
    }
    (1.0, Arc::clone(term))
}

/// Split a factor into base and exponent
fn split_power(factor: &Arc<Expr>) -> (Expr, Expr) {
    match &factor.kind {
        ExprKind::Pow(b, e) => ((**b).clone(), (**e).clone()),
        _ => ((**factor).clone(), Expr::number(1.0)),
    }
}

/// Numeric power, folded only when the result is exact
fn fold_numeric_pow(b: f64, e: f64) -> Option<f64> {
    if b == 0.0 {
        // 0^negative stays symbolic so the pole is visible
        return (e > 0.0).then_some(0.0);
    }
    if as_integer(e).is_some() {
        let v = b.powf(e);
        return v.is_finite().then_some(v);
    }
    if b < 0.0 {
        return None;
    }
    let v = b.powf(e);
    if v.is_finite() && v.fract() == 0.0 && (v.powf(1.0 / e) - b).abs() < FLOAT_TOLERANCE {
        Some(v)
    } else {
        None
    }
}

/// A factor that makes `0 * factor` undefined rather than zero
fn is_singular_factor(e: &Expr) -> bool {
    match &e.kind {
        ExprKind::Number(n) => !n.is_finite(),
        ExprKind::Pow(b, exp) => {
            b.is_zero_num() && exp.as_number().is_some_and(|n| n < 0.0)
        }
        _ => false,
    }
}

impl Expr {
    // -------------------------------------------------------------------------
    // Atoms
    // -------------------------------------------------------------------------

    pub fn number(n: f64) -> Self {
        Expr::new(ExprKind::Number(n))
    }

    /// Create a symbol expression (auto-interned, default assumptions)
    pub fn symbol(name: impl AsRef<str>) -> Self {
        symb(name.as_ref()).to_expr()
    }

    pub(crate) fn from_interned(interned: InternedSymbol) -> Self {
        Expr::new(ExprKind::Symbol(interned))
    }

    pub fn pi() -> Self {
        Expr::new(ExprKind::Constant(Constant::Pi))
    }

    pub fn e() -> Self {
        Expr::new(ExprKind::Constant(Constant::E))
    }

    /// Imaginary unit
    pub fn i() -> Self {
        Expr::new(ExprKind::Constant(Constant::I))
    }

    /// Function application node with no arity check and no evaluation
    pub(crate) fn func_raw(name: &str, args: Vec<Expr>) -> Self {
        Expr::new(ExprKind::FunctionCall {
            name: Arc::from(name),
            args: args.into_iter().map(Arc::new).collect(),
        })
    }

    // -------------------------------------------------------------------------
    // N-ary Sum constructor
    // -------------------------------------------------------------------------

    pub fn sum(terms: Vec<Expr>) -> Self {
        let mut flat: Vec<Arc<Expr>> = Vec::with_capacity(terms.len());
        let mut numeric_sum = 0.0;

        for t in terms {
            match t.kind {
                ExprKind::Number(n) => numeric_sum += n,
                ExprKind::Sum(inner) => {
                    for i in inner {
                        match i.as_number() {
                            Some(n) => numeric_sum += n,
                            None => flat.push(i),
                        }
                    }
                }
                _ => flat.push(Arc::new(t)),
            }
        }

        if numeric_sum.is_nan() {
            return Expr::number(f64::NAN);
        }

        // Collect like terms: 2*x + 3*x -> 5*x
        let mut collected: Vec<(Arc<Expr>, f64)> = Vec::with_capacity(flat.len());
        let mut index: FxHashMap<Arc<Expr>, usize> = FxHashMap::default();
        for term in &flat {
            let (coeff, rest) = split_coefficient(term);
            match index.get(&rest) {
                Some(&i) => collected[i].1 += coeff,
                None => {
                    index.insert(Arc::clone(&rest), collected.len());
                    collected.push((rest, coeff));
                }
            }
        }

        let mut out: Vec<Arc<Expr>> = collected
            .into_iter()
            .filter(|(_, c)| c.abs() > COEFF_EPSILON)
            .map(|(rest, c)| {
                if c == 1.0 {
                    rest
                } else {
                    Arc::new(Expr::product(vec![Expr::number(c), (*rest).clone()]))
                }
            })
            .collect();

        sort_canonical(&mut out);
        if numeric_sum.abs() > COEFF_EPSILON {
            out.insert(0, Arc::new(Expr::number(numeric_sum)));
        }

        match out.len() {
            0 => Expr::number(0.0),
            1 => Arc::try_unwrap(out.remove(0)).unwrap_or_else(|arc| (*arc).clone()),
            _ => Expr::new(ExprKind::Sum(out)),
        }
    }

    // -------------------------------------------------------------------------
    // N-ary Product constructor
    // -------------------------------------------------------------------------

    pub fn product(factors: Vec<Expr>) -> Self {
        let mut coeff = 1.0;
        let mut commutative: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
        let mut ordered: Vec<Arc<Expr>> = Vec::new();

        let mut push = |f: Arc<Expr>, coeff: &mut f64| {
            if let Some(n) = f.as_number() {
                *coeff *= n;
            } else if f.is_commutative() {
                commutative.push(f);
            } else {
                ordered.push(f);
            }
        };
        for f in factors {
            match f.kind {
                ExprKind::Product(inner) => inner.into_iter().for_each(|i| push(i, &mut coeff)),
                _ => push(Arc::new(f), &mut coeff),
            }
        }

        if coeff.is_nan() {
            return Expr::number(f64::NAN);
        }
        if coeff == 0.0 {
            let singular = commutative
                .iter()
                .chain(ordered.iter())
                .any(|f| is_singular_factor(f));
            return Expr::number(if singular { f64::NAN } else { 0.0 });
        }

        // Merge like bases among commutative factors: x * x^2 -> x^3
        let mut bases: Vec<(Expr, Vec<Expr>)> = Vec::with_capacity(commutative.len());
        let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
        for f in &commutative {
            let (base, exp) = split_power(f);
            match index.get(&base) {
                Some(&i) => bases[i].1.push(exp),
                None => {
                    index.insert(base.clone(), bases.len());
                    bases.push((base, vec![exp]));
                }
            }
        }

        let mut reflatten = false;
        let mut merged: Vec<Arc<Expr>> = Vec::with_capacity(bases.len());
        for (base, mut exps) in bases {
            let factor = if exps.len() == 1 {
                let exp = exps.remove(0);
                if exp.is_one_num() {
                    base
                } else {
                    Expr::pow(base, exp)
                }
            } else {
                Expr::pow(base, Expr::sum(exps))
            };
            match &factor.kind {
                ExprKind::Number(n) => coeff *= n,
                ExprKind::Product(_) => {
                    reflatten = true;
                    merged.push(Arc::new(factor));
                }
                _ => merged.push(Arc::new(factor)),
            }
        }

        // Adjacent equal bases merge among non-commutative factors
        let mut nc: Vec<Arc<Expr>> = Vec::with_capacity(ordered.len());
        for f in ordered {
            if let Some(last) = nc.last_mut() {
                let (lb, le) = split_power(last);
                let (fb, fe) = split_power(&f);
                if lb == fb {
                    *last = Arc::new(Expr::pow(lb, Expr::sum(vec![le, fe])));
                    continue;
                }
            }
            nc.push(f);
        }

        if reflatten {
            let mut all: Vec<Expr> = vec![Expr::number(coeff)];
            all.extend(merged.into_iter().map(|a| (*a).clone()));
            all.extend(nc.into_iter().map(|a| (*a).clone()));
            return Expr::product(all);
        }

        merged.retain(|f| !f.is_one_num());
        nc.retain(|f| !f.is_one_num());
        if coeff == 0.0 {
            return Expr::number(0.0);
        }

        // Numeric coefficient distributes over a lone sum: 2*(x + 1) -> 2*x + 2
        if coeff != 1.0
            && nc.is_empty()
            && merged.len() == 1
            && let ExprKind::Sum(terms) = &merged[0].kind
        {
            return Expr::sum(
                terms
                    .iter()
                    .map(|t| Expr::product(vec![Expr::number(coeff), (**t).clone()]))
                    .collect(),
            );
        }

        sort_canonical(&mut merged);
        let mut out = Vec::with_capacity(merged.len() + nc.len() + 1);
        if coeff != 1.0 {
            out.push(Arc::new(Expr::number(coeff)));
        }
        out.extend(merged);
        out.extend(nc);

        match out.len() {
            0 => Expr::number(coeff),
            1 => Arc::try_unwrap(out.remove(0)).unwrap_or_else(|arc| (*arc).clone()),
            _ => Expr::new(ExprKind::Product(out)),
        }
    }

    // -------------------------------------------------------------------------
    // Power constructor
    // -------------------------------------------------------------------------

    pub fn pow(base: Expr, exp: Expr) -> Self {
        if let Some(e) = exp.as_number() {
            if e == 0.0 {
                return Expr::number(1.0);
            }
            if e == 1.0 {
                return base;
            }
        }
        if base.as_number() == Some(1.0) {
            return Expr::number(1.0);
        }
        if let (Some(b), Some(e)) = (base.as_number(), exp.as_number())
            && let Some(v) = fold_numeric_pow(b, e)
        {
            return Expr::number(v);
        }

        if let Some(n) = exp.as_number().and_then(as_integer) {
            match &base.kind {
                // (b^e)^n -> b^(e*n)
                ExprKind::Pow(b, e) => {
                    return Expr::pow(
                        (**b).clone(),
                        Expr::product(vec![(**e).clone(), exp]),
                    );
                }
                // (a*b)^n -> a^n * b^n
                ExprKind::Product(factors) if base.is_commutative() => {
                    return Expr::product(
                        factors
                            .iter()
                            .map(|f| Expr::pow((**f).clone(), exp.clone()))
                            .collect(),
                    );
                }
                ExprKind::Constant(Constant::I) => {
                    return match n.rem_euclid(4) {
                        0 => Expr::number(1.0),
                        1 => Expr::i(),
                        2 => Expr::number(-1.0),
                        _ => Expr::product(vec![Expr::number(-1.0), Expr::i()]),
                    };
                }
                _ => {}
            }
        }

        Expr::new(ExprKind::Pow(Arc::new(base), Arc::new(exp)))
    }

    // -------------------------------------------------------------------------
    // Binary conveniences
    // -------------------------------------------------------------------------

    pub fn add_expr(a: Expr, b: Expr) -> Self {
        Expr::sum(vec![a, b])
    }

    pub fn mul_expr(a: Expr, b: Expr) -> Self {
        Expr::product(vec![a, b])
    }

    pub fn sub_expr(a: Expr, b: Expr) -> Self {
        Expr::sum(vec![a, b.negate()])
    }

    pub fn div_expr(a: Expr, b: Expr) -> Self {
        Expr::product(vec![a, Expr::pow(b, Expr::number(-1.0))])
    }

    pub fn negate(self) -> Self {
        Expr::product(vec![Expr::number(-1.0), self])
    }

    /// Raise to a power (method form)
    pub fn pow_of(self, exp: impl Into<Expr>) -> Self {
        Expr::pow(self, exp.into())
    }

    pub fn sqrt(self) -> Self {
        Expr::pow(self, Expr::number(0.5))
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Self::number(f64::from(n))
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

impl From<Arc<Expr>> for Expr {
    fn from(arc: Arc<Expr>) -> Self {
        Arc::try_unwrap(arc).unwrap_or_else(|arc| (*arc).clone())
    }
}

impl From<&Arc<Expr>> for Expr {
    fn from(arc: &Arc<Expr>) -> Self {
        (**arc).clone()
    }
}
