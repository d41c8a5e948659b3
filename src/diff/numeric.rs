//! Numeric differentiation of unevaluated derivatives
//!
//! Holomorphic integrands are differentiated with a Cauchy contour integral
//! sampled at two radii. When the radii disagree or a sample is not finite the
//! result comes from a central finite difference instead.

use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

use crate::core::evaluator::Bindings;
use crate::error::{CalculusError, Result};
use crate::traits::factorial;
use crate::{Derivative, Expr};

/// Sample points on each contour
const CONTOUR_POINTS: usize = 64;

/// Contour radius relative to `1 + |z0|`
const CONTOUR_RADIUS: f64 = 0.1;

/// Relative agreement required between the two contour estimates
const CONTOUR_AGREEMENT: f64 = 1e-6;

fn sample(expr: &Expr, bindings: &mut Bindings, sym: crate::Symbol, z: Complex64) -> Result<Complex64> {
    bindings.insert(sym, z);
    expr.evalf_with(bindings)
}

/// `n!/(N r^n) Σ f(z0 + r w_k) w_k^-n` over the N-th roots of unity
fn contour_estimate(
    f: &mut impl FnMut(Complex64) -> Result<Complex64>,
    z0: Complex64,
    n: u32,
    radius: f64,
) -> Result<Option<Complex64>> {
    let mut acc = Complex64::new(0.0, 0.0);
    for k in 0..CONTOUR_POINTS {
        let w = Complex64::from_polar(1.0, 2.0 * PI * k as f64 / CONTOUR_POINTS as f64);
        let v = f(z0 + w * radius)?;
        if !v.is_finite() {
            return Ok(None);
        }
        acc += v * w.powi(-(n as i32));
    }
    Ok(Some(
        acc * factorial(n) / (CONTOUR_POINTS as f64 * radius.powi(n as i32)),
    ))
}

/// `Σ (-1)^k C(n, k) f(z0 + (n/2 - k) h) / h^n`
fn central_difference(
    f: &mut impl FnMut(Complex64) -> Result<Complex64>,
    z0: Complex64,
    n: u32,
) -> Result<Complex64> {
    let h = f64::EPSILON.powf(1.0 / (f64::from(n) + 2.0)) * (1.0 + z0.norm());
    let mut acc = Complex64::new(0.0, 0.0);
    let mut binom = 1.0;
    for k in 0..=n {
        let offset = (f64::from(n) / 2.0 - f64::from(k)) * h;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        acc += f(z0 + offset)? * (sign * binom);
        binom = binom * f64::from(n - k) / f64::from(k + 1);
    }
    Ok(acc / h.powi(n as i32))
}

impl Derivative {
    /// Numeric value of this derivative at `z0`
    ///
    /// Only derivatives with respect to a single symbol are supported; the
    /// differentiated expression must evaluate numerically once that symbol is
    /// bound.
    ///
    /// # Example
    /// ```
    /// use num_complex::Complex64;
    /// use symb_calculus::{Diff, symb};
    ///
    /// let x = symb("dn_x");
    /// let d = Diff::new().evaluate(false).differentiate(&x.sin(), &[x.into()]).unwrap();
    /// let v = d.as_derivative().unwrap().doit_numerically(Complex64::new(0.0, 0.0)).unwrap();
    /// assert!((v.re - 1.0).abs() < 1e-8);
    /// ```
    pub fn doit_numerically(&self, z0: Complex64) -> Result<Complex64> {
        let [(var, n)] = self.pairs() else {
            return Err(CalculusError::NotNumeric(format!(
                "numeric derivative needs exactly one variable, got {}",
                self.pairs().len()
            )));
        };
        let sym = var.as_symbol().ok_or_else(|| {
            CalculusError::NotNumeric(format!("numeric derivative with respect to {var}"))
        })?;
        let n = *n;

        let expr = self.expr();
        let mut bindings = Bindings::default();
        let mut f = |z: Complex64| sample(expr, &mut bindings, sym, z);

        if n == 0 {
            return f(z0);
        }

        let radius = CONTOUR_RADIUS * (1.0 + z0.norm());
        if let Some(outer) = contour_estimate(&mut f, z0, n, radius)?
            && let Some(inner) = contour_estimate(&mut f, z0, n, radius / 2.0)?
            && (outer - inner).norm() <= CONTOUR_AGREEMENT * (1.0 + outer.norm())
        {
            return Ok(outer);
        }

        debug!(
            target: "symb_calculus::diff",
            derivative = %var,
            order = n,
            "contour estimates disagree, using central difference"
        );
        let value = central_difference(&mut f, z0, n)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalculusError::NotNumeric(format!(
                "derivative of {expr} is not finite at {z0}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Derivative, Expr, symb};
    use num_complex::Complex64;

    fn node(e: Expr, x: &Expr, n: u32) -> Derivative {
        let d = Derivative::new_unevaluated(e, vec![(x.clone(), n)]);
        (**d.as_derivative().unwrap()).clone()
    }

    #[test]
    fn test_first_and_second_derivative() {
        let x = symb("num_x");
        let xe = x.to_expr();
        let z0 = Complex64::new(0.5, 0.0);

        let d = node(x.exp(), &xe, 1);
        let v = d.doit_numerically(z0).unwrap();
        assert!((v.re - 0.5_f64.exp()).abs() < 1e-8);

        let d = node(x.sin(), &xe, 2);
        let v = d.doit_numerically(z0).unwrap();
        assert!((v.re + 0.5_f64.sin()).abs() < 1e-8);
        assert!(v.im.abs() < 1e-8);
    }

    #[test]
    fn test_free_symbol_is_not_numeric() {
        let x = symb("num_fx");
        let y = symb("num_fy");
        let d = node(x.to_expr() * y.to_expr(), &x.to_expr(), 1);
        assert!(d.doit_numerically(Complex64::new(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_multiple_variables_rejected() {
        let x = symb("num_mx");
        let y = symb("num_my");
        let d = Derivative::new_unevaluated(
            x.to_expr() * y.to_expr(),
            vec![(x.to_expr(), 1), (y.to_expr(), 1)],
        );
        let err = d
            .as_derivative()
            .unwrap()
            .doit_numerically(Complex64::new(1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, crate::CalculusError::NotNumeric(_)));
    }
}
