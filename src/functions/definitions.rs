//! Builtin elementary function definitions for the function registry
//!
//! Each builtin folds its special values, evaluates numerically on complex
//! arguments and supplies its slot-0 partial derivative.
//!
//! # Derivative References
//!
//! Derivative formulas follow standard calculus and DLMF:
//! - Trigonometric: DLMF §4.21-4.28
//! - Hyperbolic: DLMF §4.35-4.37 <https://dlmf.nist.gov/4.35>

use super::builtin;
use super::registry::FunctionDefinition;
use crate::traits::as_integer;
use crate::{Constant, Expr, ExprKind};
use num_complex::Complex64;

/// Integer `k` such that `e == k*pi`
fn pi_multiple(e: &Expr) -> Option<i64> {
    match &e.kind {
        ExprKind::Number(n) if *n == 0.0 => Some(0),
        ExprKind::Constant(Constant::Pi) => Some(1),
        ExprKind::Product(factors) if factors.len() == 2 => {
            if matches!(factors[1].kind, ExprKind::Constant(Constant::Pi)) {
                factors[0].as_number().and_then(as_integer)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_value(e: &Expr, v: f64) -> bool {
    e.as_number() == Some(v)
}

/// `(1 - u^2)^(-1/2)`
fn inv_sqrt_one_minus_square(u: &Expr) -> Expr {
    Expr::pow(
        Expr::sub_expr(Expr::number(1.0), Expr::pow(u.clone(), Expr::number(2.0))),
        Expr::number(-0.5),
    )
}

fn square(e: Expr) -> Expr {
    Expr::pow(e, Expr::number(2.0))
}

fn unary(name: &str) -> FunctionDefinition {
    FunctionDefinition::new(name).arity(1..=1)
}

/// Return all function definitions for populating the registry
pub(crate) fn all_definitions() -> Vec<FunctionDefinition> {
    vec![
        // Trigonometric
        unary("sin")
            .eval(|args| pi_multiple(&args[0]).map(|_| Expr::number(0.0)))
            .numeric(|z| Some(z[0].sin()))
            // d/du sin(u) = cos(u)
            .partial(|args, _| Some(builtin("cos", args[0].clone()))),
        unary("cos")
            .eval(|args| {
                pi_multiple(&args[0]).map(|k| Expr::number(if k % 2 == 0 { 1.0 } else { -1.0 }))
            })
            .numeric(|z| Some(z[0].cos()))
            // d/du cos(u) = -sin(u)
            .partial(|args, _| Some(builtin("sin", args[0].clone()).negate())),
        unary("tan")
            .eval(|args| pi_multiple(&args[0]).map(|_| Expr::number(0.0)))
            .numeric(|z| Some(z[0].tan()))
            // d/du tan(u) = 1 + tan(u)^2
            .partial(|args, _| {
                Some(Expr::add_expr(
                    Expr::number(1.0),
                    square(builtin("tan", args[0].clone())),
                ))
            }),
        unary("cot")
            .numeric(|z| Some(Complex64::new(1.0, 0.0) / z[0].tan()))
            // d/du cot(u) = -1 - cot(u)^2
            .partial(|args, _| {
                Some(Expr::sub_expr(
                    Expr::number(-1.0),
                    square(builtin("cot", args[0].clone())),
                ))
            }),
        unary("sec")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(1.0)))
            .numeric(|z| Some(Complex64::new(1.0, 0.0) / z[0].cos()))
            // d/du sec(u) = sec(u)tan(u)
            .partial(|args, _| {
                Some(Expr::mul_expr(
                    builtin("sec", args[0].clone()),
                    builtin("tan", args[0].clone()),
                ))
            }),
        unary("csc")
            .numeric(|z| Some(Complex64::new(1.0, 0.0) / z[0].sin()))
            // d/du csc(u) = -csc(u)cot(u)
            .partial(|args, _| {
                Some(
                    Expr::mul_expr(
                        builtin("csc", args[0].clone()),
                        builtin("cot", args[0].clone()),
                    )
                    .negate(),
                )
            }),
        // Inverse Trigonometric
        unary("asin")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(0.0)))
            .numeric(|z| Some(z[0].asin()))
            // d/du asin(u) = 1/sqrt(1 - u^2)
            .partial(|args, _| Some(inv_sqrt_one_minus_square(&args[0]))),
        unary("acos")
            .eval(|args| is_value(&args[0], 1.0).then(|| Expr::number(0.0)))
            .numeric(|z| Some(z[0].acos()))
            // d/du acos(u) = -1/sqrt(1 - u^2)
            .partial(|args, _| Some(inv_sqrt_one_minus_square(&args[0]).negate())),
        unary("atan")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(0.0)))
            .numeric(|z| Some(z[0].atan()))
            // d/du atan(u) = 1/(1 + u^2)
            .partial(|args, _| {
                Some(Expr::pow(
                    Expr::add_expr(Expr::number(1.0), square(args[0].clone())),
                    Expr::number(-1.0),
                ))
            }),
        // Hyperbolic
        unary("sinh")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(0.0)))
            .numeric(|z| Some(z[0].sinh()))
            .partial(|args, _| Some(builtin("cosh", args[0].clone()))),
        unary("cosh")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(1.0)))
            .numeric(|z| Some(z[0].cosh()))
            .partial(|args, _| Some(builtin("sinh", args[0].clone()))),
        unary("tanh")
            .eval(|args| is_value(&args[0], 0.0).then(|| Expr::number(0.0)))
            .numeric(|z| Some(z[0].tanh()))
            // d/du tanh(u) = 1 - tanh(u)^2
            .partial(|args, _| {
                Some(Expr::sub_expr(
                    Expr::number(1.0),
                    square(builtin("tanh", args[0].clone())),
                ))
            }),
        // Exponential and logarithmic
        unary("exp")
            .eval(|args| {
                let u = &args[0];
                if is_value(u, 0.0) {
                    return Some(Expr::number(1.0));
                }
                if is_value(u, 1.0) {
                    return Some(Expr::e());
                }
                // exp(ln(v)) = v
                match u.as_function() {
                    Some(("ln", inner)) => Some((*inner[0]).clone()),
                    _ => None,
                }
            })
            .numeric(|z| Some(z[0].exp()))
            .partial(|args, _| Some(builtin("exp", args[0].clone()))),
        unary("ln")
            .eval(|args| {
                let u = &args[0];
                if is_value(u, 1.0) {
                    Some(Expr::number(0.0))
                } else if matches!(u.kind, ExprKind::Constant(Constant::E)) {
                    Some(Expr::number(1.0))
                } else {
                    None
                }
            })
            .numeric(|z| Some(z[0].ln()))
            // d/du ln(u) = 1/u
            .partial(|args, _| Some(Expr::pow(args[0].clone(), Expr::number(-1.0)))),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{Expr, symb};

    #[test]
    fn test_special_values() {
        let pi = Expr::pi();
        assert_eq!(pi.clone().sin(), Expr::number(0.0));
        assert_eq!(pi.clone().cos(), Expr::number(-1.0));
        assert_eq!((2.0 * pi).cos(), Expr::number(1.0));
        assert_eq!(Expr::number(1.0).ln(), Expr::number(0.0));
        assert_eq!(Expr::e().ln(), Expr::number(1.0));
        assert_eq!(Expr::number(1.0).acos(), Expr::number(0.0));
        assert_eq!(Expr::number(0.0).cosh(), Expr::number(1.0));
    }

    #[test]
    fn test_non_special_values_stay() {
        let e = Expr::number(1.0).sin();
        assert_eq!(e.to_string(), "sin(1)");
        let x = symb("def_x");
        assert_eq!(x.ln().exp(), x.to_expr());
    }

    #[test]
    fn test_numeric_capability() {
        let v = Expr::number(1.0).sin().evalf().unwrap();
        assert!((v.re - 1.0_f64.sin()).abs() < 1e-12);
        let pole = Expr::number(0.0).csc().evalf().unwrap();
        assert!(!pole.is_finite());
    }
}
