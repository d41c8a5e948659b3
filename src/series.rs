//! Truncated Taylor expansion with pole detection
//!
//! Coefficients come from repeated differentiation followed by substitution of
//! the expansion point. A coefficient whose value at the point is singular is
//! retried as a one-sided numeric limit, which recovers removable singularities
//! such as `acos(1 - x^2)` at 0. When that limit does not settle there is no
//! Taylor series at the point and the expansion fails with
//! [`CalculusError::Pole`].

use std::fmt;

use num_complex::Complex64;
use tracing::debug;

use crate::core::evaluator::Bindings;
use crate::core::symbol::Symbol;
use crate::diff::evaluate_derivative;
use crate::error::{CalculusError, Result};
use crate::functions::registry::Registry;
use crate::traits::factorial;
use crate::{Expr, ExprKind};

/// `Σ c_k (x - a)^k + O((x - a)^n)`
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesExpansion {
    var: Symbol,
    point: Expr,
    order: u32,
    coefficients: Vec<Expr>,
}

impl SeriesExpansion {
    pub fn var(&self) -> Symbol {
        self.var
    }

    pub fn point(&self) -> &Expr {
        &self.point
    }

    /// Exponent of the order term
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Coefficients `c_0 .. c_{n-1}`
    pub fn coefficients(&self) -> &[Expr] {
        &self.coefficients
    }

    fn shifted_var(&self) -> Expr {
        if self.point.is_zero_num() {
            self.var.to_expr()
        } else {
            Expr::sub_expr(self.var.to_expr(), self.point.clone())
        }
    }

    fn term(&self, k: usize) -> Expr {
        let power = Expr::pow(self.shifted_var(), Expr::number(k as f64));
        Expr::mul_expr(self.coefficients[k].clone(), power)
    }

    /// The polynomial part without the order term
    pub fn truncated(&self) -> Expr {
        Expr::sum((0..self.coefficients.len()).map(|k| self.term(k)).collect())
    }

    fn fmt_order_term(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.order == 0 {
            return write!(f, "O(1)");
        }
        let base = match self.point.as_number() {
            Some(a) if a == 0.0 => self.var.to_string(),
            Some(a) if a < 0.0 => format!("({} + {})", self.var, Expr::number(-a)),
            _ => format!("({} - {})", self.var, self.point),
        };
        if self.order == 1 {
            write!(f, "O({})", base.trim_start_matches('(').trim_end_matches(')'))
        } else {
            write!(f, "O({}^{})", base, self.order)
        }
    }
}

impl fmt::Display for SeriesExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for k in 0..self.coefficients.len() {
            if self.coefficients[k].is_zero_num() {
                continue;
            }
            let text = self.term(k).to_string();
            match (first, text.strip_prefix('-')) {
                (true, _) => write!(f, "{}", text)?,
                (false, Some(rest)) => write!(f, " - {}", rest)?,
                (false, None) => write!(f, " + {}", text)?,
            }
            first = false;
        }
        if !first {
            write!(f, " + ")?;
        }
        self.fmt_order_term(f)
    }
}

/// Whether a value obtained at the expansion point is singular
fn has_pole(e: &Expr) -> bool {
    match &e.kind {
        ExprKind::Number(n) => !n.is_finite(),
        ExprKind::Pow(base, exp)
            if base.is_zero_num() && exp.as_number().is_some_and(|n| n < 0.0) =>
        {
            true
        }
        ExprKind::FunctionCall { name, args } => {
            let closed_builtin = Registry::get(name).is_some_and(|d| d.numeric.is_some())
                && args.iter().all(|a| a.free_symbols().is_empty());
            if closed_builtin && e.evalf().is_ok_and(|z| !z.is_finite()) {
                return true;
            }
            args.iter().any(|a| has_pole(a))
        }
        _ => {
            let mut found = false;
            e.for_each_child(|c| found = found || has_pole(c));
            found
        }
    }
}

/// Relative agreement required between the last two extrapolated samples
const LIMIT_TOLERANCE: f64 = 1e-5;

/// Limit of `e` as `var` approaches a real `point` from above
///
/// Samples at `point + 10^-k` for k = 2..=5 are extrapolated pairwise assuming a
/// linear leading error. Diverging and oscillating samples never agree.
fn limit_from_above(e: &Expr, var: Symbol, point: &Expr) -> Option<f64> {
    let a = point.evalf().ok().filter(|z| z.im == 0.0 && z.re.is_finite())?.re;
    let mut vars = Bindings::default();
    let mut samples = Vec::with_capacity(4);
    for k in 2..=5 {
        vars.insert(var, Complex64::new(a + 10f64.powi(-k), 0.0));
        let value = e.evalf_with(&vars).ok().filter(|z| z.is_finite())?;
        samples.push(value);
    }
    let extrapolated: Vec<Complex64> = samples
        .windows(2)
        .map(|w| (w[1] * 10.0 - w[0]) / 9.0)
        .collect();
    let (prev, last) = (extrapolated[1], extrapolated[2]);
    let scale = LIMIT_TOLERANCE * (1.0 + last.norm());
    if (last - prev).norm() > scale || last.im.abs() > scale {
        return None;
    }
    Some(last.re)
}

impl Expr {
    /// Taylor expansion about `point` up to (not including) `(var - point)^order`
    ///
    /// # Example
    /// ```
    /// use symb_calculus::symb;
    ///
    /// let x = symb("series_doc_x");
    /// let s = x.sin().series(x, 0.0, 2).unwrap();
    /// assert_eq!(s.to_string(), "series_doc_x + O(series_doc_x^2)");
    /// ```
    pub fn series(&self, var: Symbol, point: impl Into<Expr>, order: u32) -> Result<SeriesExpansion> {
        let point = point.into();
        let var_expr = var.to_expr();
        let mut coefficients = Vec::with_capacity(order as usize);
        let mut current = self.clone();

        for k in 0..order {
            if k > 0 {
                current = evaluate_derivative(current, vec![(var_expr.clone(), 1)]);
            }
            let mut value = current.subs(&var_expr, &point).doit();
            if has_pole(&value)
                && let Some(limit) = limit_from_above(&current, var, &point)
            {
                debug!(
                    target: "symb_calculus::series",
                    expr = %self,
                    order = k,
                    limit,
                    "removable singularity, coefficient taken as a limit"
                );
                value = Expr::number(limit);
            }
            if has_pole(&value) {
                debug!(
                    target: "symb_calculus::series",
                    expr = %self,
                    order = k,
                    "pole at expansion point"
                );
                return Err(CalculusError::Pole {
                    expr: self.to_string(),
                    var: var.to_string(),
                    point: point.to_string(),
                });
            }
            coefficients.push(Expr::mul_expr(Expr::number(1.0 / factorial(k)), value));
        }

        Ok(SeriesExpansion {
            var,
            point,
            order,
            coefficients,
        })
    }
}
