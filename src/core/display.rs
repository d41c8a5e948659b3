//! Display implementations for expressions.
//!
//! Human-readable infix notation:
//! - `x^2 + 2*x + 1`
//! - `sin(x) - 3*y/(x + 1)`
//! - `Derivative(f(x), (x, 2))`, `Subs(f(_xi), (_xi,), (2*x,))`, `Lambda((x, y), x*y)`
//!
//! # Display Behavior Notes for N-ary AST
//! - Sum displays terms with +/- signs based on leading coefficients
//! - Product displays with explicit `*`, factors with negative exponents go below `/`
//! - Dummies display with a leading underscore

use crate::traits::is_one;
use crate::{Expr, ExprKind};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Leading coefficient of a product or number, if negative
fn negative_coefficient(expr: &Expr) -> Option<f64> {
    match &expr.kind {
        ExprKind::Number(n) if *n < 0.0 => Some(*n),
        ExprKind::Product(factors) => factors[0].as_number().filter(|n| *n < 0.0),
        _ => None,
    }
}

/// Base and positive exponent of a factor that belongs in a denominator
fn denominator_part(expr: &Expr) -> Option<(&Expr, f64)> {
    if let ExprKind::Pow(b, e) = &expr.kind
        && let Some(n) = e.as_number()
        && n < 0.0
    {
        return Some((b, -n));
    }
    None
}

/// Helper for Power base parenthesis
fn needs_parens_as_base(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Sum(_) | ExprKind::Product(_) | ExprKind::Pow(_, _) => true,
        ExprKind::Number(n) => *n < 0.0 || n.fract() != 0.0,
        _ => false,
    }
}

fn format_wrapped(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if matches!(expr.kind, ExprKind::Sum(_)) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn format_number_expr(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return write!(f, "NaN");
    }
    if n.is_infinite() {
        return write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" });
    }

    #[allow(clippy::float_cmp)]
    let is_int = n.trunc() == n;
    if is_int && n.abs() < 1e10 {
        #[allow(clippy::cast_possible_truncation)]
        let n_int = n as i64;
        write!(f, "{n_int}")
    } else {
        write!(f, "{n}")
    }
}

fn format_power(f: &mut fmt::Formatter<'_>, base: &Expr, exp: &Expr) -> fmt::Result {
    if needs_parens_as_base(base) {
        write!(f, "({base})")?;
    } else {
        write!(f, "{base}")?;
    }
    let exp_simple = match &exp.kind {
        ExprKind::Number(n) => *n >= 0.0,
        ExprKind::Symbol(_) | ExprKind::Constant(_) => true,
        _ => false,
    };
    if exp_simple {
        write!(f, "^{exp}")
    } else {
        write!(f, "^({exp})")
    }
}

/// Factor `base^n` as it appears below a fraction bar
fn format_denominator_factor(f: &mut fmt::Formatter<'_>, base: &Expr, n: f64) -> fmt::Result {
    if is_one(n) {
        format_wrapped(f, base)
    } else {
        format_power(f, base, &Expr::number(n))
    }
}

/// Product formatting; with `magnitude` set, a negative coefficient prints without its sign
fn format_product_expr(
    f: &mut fmt::Formatter<'_>,
    factors: &[Arc<Expr>],
    magnitude: bool,
) -> fmt::Result {
    let (coeff, rest) = match factors[0].as_number() {
        Some(n) => (n, &factors[1..]),
        None => (1.0, factors),
    };
    if coeff < 0.0 && !magnitude {
        write!(f, "-")?;
    }
    let coeff = coeff.abs();

    let mut numerator: Vec<&Expr> = Vec::with_capacity(rest.len());
    let mut denominator: Vec<(&Expr, f64)> = Vec::new();
    for fac in rest {
        match denominator_part(fac) {
            Some(part) => denominator.push(part),
            None => numerator.push(fac),
        }
    }

    let mut first = true;
    if !is_one(coeff) || numerator.is_empty() {
        format_number_expr(f, coeff)?;
        first = false;
    }
    for fac in numerator {
        if !first {
            write!(f, "*")?;
        }
        format_wrapped(f, fac)?;
        first = false;
    }

    match denominator.as_slice() {
        [] => Ok(()),
        [(base, n)] if is_one(*n) && !matches!(base.kind, ExprKind::Product(_)) => {
            write!(f, "/")?;
            format_wrapped(f, base)
        }
        [(base, n)] => {
            write!(f, "/")?;
            format_denominator_factor(f, base, *n)
        }
        parts => {
            write!(f, "/(")?;
            for (i, (base, n)) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, "*")?;
                }
                format_denominator_factor(f, base, *n)?;
            }
            write!(f, ")")
        }
    }
}

fn format_sum_expr(f: &mut fmt::Formatter<'_>, terms: &[Arc<Expr>]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        let negative = negative_coefficient(term).is_some();
        match (i, negative) {
            (0, true) => write!(f, "-")?,
            (0, false) => {}
            (_, true) => write!(f, " - ")?,
            (_, false) => write!(f, " + ")?,
        }
        match &term.kind {
            ExprKind::Product(factors) if negative => format_product_expr(f, factors, true)?,
            ExprKind::Number(n) => format_number_expr(f, n.abs())?,
            _ => format_wrapped(f, term)?,
        }
    }
    Ok(())
}

fn format_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    if items.len() == 1 {
        write!(f, ",")?;
    }
    write!(f, ")")
}

// =============================================================================
// DISPLAY IMPLEMENTATION
// =============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => format_number_expr(f, *n),

            ExprKind::Constant(c) => write!(f, "{}", c.name()),

            ExprKind::Symbol(s) => {
                if s.is_dummy() {
                    write!(f, "_{}", s.name())
                } else {
                    write!(f, "{}", s.name())
                }
            }

            ExprKind::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }

            // N-ary Sum: display with + and - signs
            ExprKind::Sum(terms) => format_sum_expr(f, terms),

            ExprKind::Product(factors) => format_product_expr(f, factors, false),

            ExprKind::Pow(base, exp) => match denominator_part(self) {
                Some((b, n)) => {
                    write!(f, "1/")?;
                    format_denominator_factor(f, b, n)
                }
                None => format_power(f, base, exp),
            },

            ExprKind::Derivative(d) => {
                write!(f, "Derivative({}", d.expr())?;
                for (v, n) in d.pairs() {
                    if *n == 1 {
                        write!(f, ", {v}")?;
                    } else {
                        write!(f, ", ({v}, {n})")?;
                    }
                }
                write!(f, ")")
            }

            ExprKind::Subs(s) => {
                write!(f, "Subs({}, ", s.expr())?;
                format_list(f, s.variables())?;
                write!(f, ", ")?;
                format_list(f, s.point())?;
                write!(f, ")")
            }

            ExprKind::Lambda(l) => {
                match l.params() {
                    [p] => write!(f, "Lambda({p}, ")?,
                    params => {
                        write!(f, "Lambda(")?;
                        format_list(f, params)?;
                        write!(f, ", ")?;
                    }
                }
                write!(f, "{})", l.body())
            }
        }
    }
}
