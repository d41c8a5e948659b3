//! Property-Based Testing
//!
//! Uses quickcheck for property-based testing of:
//! - Differentiation rules (linearity, product rule, order independence)
//! - Alpha-equivalence of substitution nodes
//! - Agreement between symbolic and numeric derivatives

use num_complex::Complex64;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use std::fmt;

use crate::{Bindings, Diff, Expr, Subs, Symbol, diff, symb};

// ============================================================
// PART 1: EXPRESSION GENERATORS FOR PROPERTY TESTS
// ============================================================

fn x() -> Symbol {
    symb("prop_x")
}

fn y() -> Symbol {
    symb("prop_y")
}

fn gen_expr(g: &mut Gen, depth: usize) -> Expr {
    if depth == 0 {
        return match u8::arbitrary(g) % 4 {
            0 => Expr::number(f64::from(i8::arbitrary(g) % 5)),
            1 | 2 => x().to_expr(),
            _ => y().to_expr(),
        };
    }
    match u8::arbitrary(g) % 8 {
        0 | 1 => gen_expr(g, depth - 1) + gen_expr(g, depth - 1),
        2 | 3 => gen_expr(g, depth - 1) * gen_expr(g, depth - 1),
        4 => gen_expr(g, depth - 1).sin(),
        5 => gen_expr(g, depth - 1).cos(),
        6 => gen_expr(g, depth - 1).exp(),
        _ => {
            let exp = if bool::arbitrary(g) { 2.0 } else { 3.0 };
            Expr::pow(gen_expr(g, depth - 1), Expr::number(exp))
        }
    }
}

/// Random expression in `prop_x` and `prop_y`
#[derive(Clone)]
struct ArbExpr(Expr);

impl fmt::Debug for ArbExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Arbitrary for ArbExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(3); // Keep trees small
        ArbExpr(gen_expr(g, depth))
    }
}

// ============================================================
// PART 2: NUMERIC COMPARISON HELPERS
// ============================================================

fn bindings() -> Bindings {
    let mut b = Bindings::default();
    b.insert(x(), Complex64::new(0.3, 0.0));
    b.insert(y(), Complex64::new(0.7, 0.0));
    b
}

/// `None` when either side has no finite value
fn agree(a: &Expr, b: &Expr, tol: f64) -> Option<bool> {
    let vars = bindings();
    let va = a.evalf_with(&vars).ok()?;
    let vb = b.evalf_with(&vars).ok()?;
    if !va.is_finite() || !vb.is_finite() {
        return None;
    }
    Some((va - vb).norm() <= tol * (1.0 + va.norm().max(vb.norm())))
}

fn verdict(result: Option<bool>) -> TestResult {
    match result {
        Some(ok) => TestResult::from_bool(ok),
        None => TestResult::discard(),
    }
}

// ============================================================
// PART 3: DIFFERENTIATION PROPERTIES
// ============================================================

#[cfg(test)]
mod derivative_properties {
    use super::*;

    /// Property: d(a + b)/dx = da/dx + db/dx
    #[test]
    fn test_linearity() {
        fn prop_linear(a: ArbExpr, b: ArbExpr) -> TestResult {
            let sum = a.0.clone() + b.0.clone();
            let (Ok(ds), Ok(da), Ok(db)) = (sum.diff(x()), a.0.diff(x()), b.0.diff(x())) else {
                return TestResult::discard();
            };
            verdict(agree(&ds, &(da + db), 1e-7))
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_linear as fn(ArbExpr, ArbExpr) -> TestResult);
    }

    /// Property: d(a*b)/dx = a'b + ab'
    #[test]
    fn test_product_rule() {
        fn prop_product(a: ArbExpr, b: ArbExpr) -> TestResult {
            let prod = a.0.clone() * b.0.clone();
            let (Ok(dp), Ok(da), Ok(db)) = (prod.diff(x()), a.0.diff(x()), b.0.diff(x())) else {
                return TestResult::discard();
            };
            let expected = da * b.0.clone() + a.0.clone() * db;
            verdict(agree(&dp, &expected, 1e-7))
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_product as fn(ArbExpr, ArbExpr) -> TestResult);
    }

    /// Property: the order of differentiation does not matter
    #[test]
    fn test_order_independence() {
        fn prop_order(e: ArbExpr) -> TestResult {
            let (xs, ys) = (x(), y());
            let Ok(xy) = diff(&e.0, &[xs.into(), ys.into()]) else {
                return TestResult::discard();
            };
            // Combined requests are canonical: identical trees
            if diff(&e.0, &[ys.into(), xs.into()]).ok() != Some(xy.clone()) {
                return TestResult::failed();
            }
            let chained = e.0.diff(ys).and_then(|d| d.diff(xs));
            match chained {
                Ok(c) => verdict(agree(&xy, &c, 1e-7)),
                Err(_) => TestResult::discard(),
            }
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_order as fn(ArbExpr) -> TestResult);
    }

    /// Property: a zeroth derivative is the expression itself
    #[test]
    fn test_zeroth_derivative_is_identity() {
        fn prop_zeroth(e: ArbExpr) -> bool {
            diff(&e.0, &[(x(), 0u32).into()]).ok() == Some(e.0.clone())
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_zeroth as fn(ArbExpr) -> bool);
    }

    /// Property: forcing an unevaluated derivative matches direct evaluation
    #[test]
    fn test_doit_matches_direct() {
        fn prop_doit(e: ArbExpr) -> TestResult {
            let lazy = Diff::new().evaluate(false).differentiate(&e.0, &[x().into()]);
            let (Ok(lazy), Ok(direct)) = (lazy, e.0.diff(x())) else {
                return TestResult::discard();
            };
            TestResult::from_bool(lazy.doit() == direct)
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_doit as fn(ArbExpr) -> TestResult);
    }

    /// Property: the numeric derivative agrees with the symbolic one
    #[test]
    fn test_numeric_matches_symbolic() {
        fn prop_numeric(e: ArbExpr) -> TestResult {
            // Fix y so that x is the only free symbol
            let e = e.0.subs(&y().to_expr(), &Expr::number(0.7));
            let Ok(symbolic) = e.diff(x()) else {
                return TestResult::discard();
            };
            let lazy = Diff::new().evaluate(false).differentiate(&e, &[x().into()]);
            let Some(node) = lazy.ok().and_then(|l| l.as_derivative().cloned()) else {
                return TestResult::discard();
            };
            let z0 = Complex64::new(0.3, 0.0);
            let (Ok(numeric), Ok(exact)) = (node.doit_numerically(z0), symbolic.evalf_with(&bindings()))
            else {
                return TestResult::discard();
            };
            if !exact.is_finite() || exact.norm() > 1e6 {
                return TestResult::discard();
            }
            TestResult::from_bool((numeric - exact).norm() <= 1e-5 * (1.0 + exact.norm()))
        }
        QuickCheck::new()
            .tests(100)
            .quickcheck(prop_numeric as fn(ArbExpr) -> TestResult);
    }
}

// ============================================================
// PART 4: SUBSTITUTION NODE PROPERTIES
// ============================================================

#[cfg(test)]
mod subs_properties {
    use super::*;

    /// Property: renaming the bound variable gives an equal node with an equal hash
    #[test]
    fn test_alpha_renaming() {
        fn prop_rename(e: ArbExpr, p: ArbExpr) -> TestResult {
            let z = symb("prop_z");
            let renamed = e.0.subs(&x().to_expr(), &z.to_expr());
            let (Ok(a), Ok(b)) = (
                Subs::new(&e.0, &[x().to_expr()], &[p.0.clone()]),
                Subs::new(&renamed, &[z.to_expr()], &[p.0.clone()]),
            ) else {
                return TestResult::failed();
            };
            TestResult::from_bool(a == b && a.hash == b.hash)
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_rename as fn(ArbExpr, ArbExpr) -> TestResult);
    }

    /// Property: building the same node twice is deterministic
    #[test]
    fn test_rebuild_is_equal() {
        fn prop_rebuild(e: ArbExpr) -> bool {
            let build = || Subs::new(&e.0, &[x().to_expr()], &[Expr::number(2.0)]);
            match (build(), build()) {
                (Ok(a), Ok(b)) => a == b && a.hash == b.hash,
                _ => false,
            }
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_rebuild as fn(ArbExpr) -> bool);
    }

    /// Property: forcing a substitution node agrees with direct substitution
    #[test]
    fn test_doit_matches_subs() {
        fn prop_doit(e: ArbExpr, p: ArbExpr) -> TestResult {
            let Ok(node) = Subs::new(&e.0, &[x().to_expr()], &[p.0.clone()]) else {
                return TestResult::failed();
            };
            let direct = e.0.subs(&x().to_expr(), &p.0);
            verdict(agree(&node.doit(), &direct, 1e-9))
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop_doit as fn(ArbExpr, ArbExpr) -> TestResult);
    }
}
