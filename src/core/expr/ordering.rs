//! Canonical ordering for expressions.
//!
//! Provides comparison functions for sorting expressions into canonical form.

use std::cmp::Ordering as CmpOrdering;
use std::sync::LazyLock;

use super::{Expr, ExprKind};

static EXPR_ONE: LazyLock<Expr> = LazyLock::new(|| Expr::number(1.0));

fn cmp_slices(a: &[std::sync::Arc<Expr>], b: &[std::sync::Arc<Expr>]) -> CmpOrdering {
    for (x, y) in a.iter().zip(b.iter()) {
        match expr_cmp(x, y) {
            CmpOrdering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Compare expressions for canonical ordering.
/// Order: Numbers < Constants < Symbols (by power) < Sum < Product < `FunctionCall`
/// < Pow < Derivative < Subs < Lambda
pub fn expr_cmp(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{Number, Pow, Product};

    // Sort key (Base, Exponent, Coefficient, IsAtomic); Exponent None means 1
    fn extract_key(e: &Expr) -> (&Expr, Option<&Expr>, f64, bool) {
        match &e.kind {
            Pow(b, exp) => (b.as_ref(), Some(exp.as_ref()), 1.0, false),
            Product(factors) if factors.len() == 2 => {
                if let Number(n) = &factors[0].kind {
                    (&factors[1], None, *n, false)
                } else {
                    (e, None, 1.0, true)
                }
            }
            _ => (e, None, 1.0, true),
        }
    }

    if let (Number(x), Number(y)) = (&a.kind, &b.kind) {
        return x.partial_cmp(y).unwrap_or(CmpOrdering::Equal);
    }
    if matches!(a.kind, Number(_)) {
        return CmpOrdering::Less;
    }
    if matches!(b.kind, Number(_)) {
        return CmpOrdering::Greater;
    }

    let (base_a, exp_a, coeff_a, atomic_a) = extract_key(a);
    let (base_b, exp_b, coeff_b, atomic_b) = extract_key(b);

    if atomic_a && atomic_b {
        return expr_cmp_type_strict(a, b);
    }

    // Recursion is safe because at least one side is composite
    let base_cmp = expr_cmp(base_a, base_b);
    if base_cmp != CmpOrdering::Equal {
        return base_cmp;
    }

    let exp_cmp = match (exp_a, exp_b) {
        (Some(e_a), Some(e_b)) => expr_cmp(e_a, e_b),
        (Some(e_a), None) => expr_cmp(e_a, &EXPR_ONE),
        (None, Some(e_b)) => expr_cmp(&EXPR_ONE, e_b),
        (None, None) => CmpOrdering::Equal,
    };
    if exp_cmp != CmpOrdering::Equal {
        return exp_cmp;
    }

    coeff_a.partial_cmp(&coeff_b).unwrap_or(CmpOrdering::Equal)
}

/// Fallback: strict type comparison for atomic terms
pub fn expr_cmp_type_strict(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{
        Constant, Derivative, FunctionCall, Lambda, Number, Pow, Product, Subs, Sum, Symbol,
    };
    match (&a.kind, &b.kind) {
        (Number(x), Number(y)) => x.partial_cmp(y).unwrap_or(CmpOrdering::Equal),
        (Number(_), _) => CmpOrdering::Less,
        (_, Number(_)) => CmpOrdering::Greater,

        (Constant(x), Constant(y)) => x.cmp(y),
        (Constant(_), _) => CmpOrdering::Less,
        (_, Constant(_)) => CmpOrdering::Greater,

        (Symbol(x), Symbol(y)) => x.cmp(y),
        (Symbol(_), _) => CmpOrdering::Less,
        (_, Symbol(_)) => CmpOrdering::Greater,

        (Sum(t1), Sum(t2)) => t1.len().cmp(&t2.len()).then_with(|| cmp_slices(t1, t2)),
        (Sum(_), _) => CmpOrdering::Less,
        (_, Sum(_)) => CmpOrdering::Greater,

        (Product(f1), Product(f2)) => f1.len().cmp(&f2.len()).then_with(|| cmp_slices(f1, f2)),
        (Product(_), _) => CmpOrdering::Less,
        (_, Product(_)) => CmpOrdering::Greater,

        (FunctionCall { name: n1, args: a1 }, FunctionCall { name: n2, args: a2 }) => {
            n1.cmp(n2).then_with(|| cmp_slices(a1, a2))
        }
        (FunctionCall { .. }, _) => CmpOrdering::Less,
        (_, FunctionCall { .. }) => CmpOrdering::Greater,

        (Pow(b1, e1), Pow(b2, e2)) => expr_cmp(b1, b2).then_with(|| expr_cmp(e1, e2)),
        (Pow(_, _), _) => CmpOrdering::Less,
        (_, Pow(_, _)) => CmpOrdering::Greater,

        (Derivative(d1), Derivative(d2)) => expr_cmp(d1.expr(), d2.expr()).then_with(|| {
            for ((v1, n1), (v2, n2)) in d1.pairs().iter().zip(d2.pairs()) {
                match expr_cmp(v1, v2).then(n1.cmp(n2)) {
                    CmpOrdering::Equal => {}
                    other => return other,
                }
            }
            d1.pairs().len().cmp(&d2.pairs().len())
        }),
        (Derivative(_), _) => CmpOrdering::Less,
        (_, Derivative(_)) => CmpOrdering::Greater,

        // Binders order by their alpha-invariant hash so renaming never moves them
        (Subs(_), Subs(_)) | (Lambda(_), Lambda(_)) => {
            if a == b {
                CmpOrdering::Equal
            } else {
                a.hash.cmp(&b.hash)
            }
        }
        (Subs(_), _) => CmpOrdering::Less,
        (_, Subs(_)) => CmpOrdering::Greater,
    }
}
