//! Numeric evaluation to complex values
//!
//! Walks the tree once with a table of symbol bindings. Builtin functions use the
//! numeric capability of their registry record; undefined functions, unevaluated
//! derivatives and lambdas have no value.
//!
//! # Example
//! ```
//! use symb_calculus::{Expr, symb};
//! use num_complex::Complex64;
//! use rustc_hash::FxHashMap;
//!
//! let x = symb("eval_doc_x");
//! let e = x.sin() * x.cos() + x.pow(2.0);
//! let mut vars = FxHashMap::default();
//! vars.insert(x, Complex64::new(0.5, 0.0));
//! let v = e.evalf_with(&vars).unwrap();
//! assert!((v.re - (0.5_f64.sin() * 0.5_f64.cos() + 0.25)).abs() < 1e-10);
//! ```

use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::core::symbol::Symbol;
use crate::error::{CalculusError, Result};
use crate::functions::registry::Registry;
use crate::traits::as_integer;
use crate::{Constant, Expr, ExprKind};

/// Symbol values used by [`Expr::evalf_with`]
pub type Bindings = FxHashMap<Symbol, Complex64>;

fn not_numeric(expr: &Expr) -> CalculusError {
    CalculusError::NotNumeric(expr.to_string())
}

fn complex_pow(base: Complex64, exp: &Expr, exp_value: Complex64) -> Complex64 {
    if let Some(n) = exp.as_number().and_then(as_integer)
        && let Ok(n) = i32::try_from(n)
    {
        // Integer powers stay exact and send 0^-n to infinity
        if base == Complex64::new(0.0, 0.0) && n < 0 {
            return Complex64::new(f64::INFINITY, 0.0);
        }
        return base.powi(n);
    }
    if base == Complex64::new(0.0, 0.0) {
        return if exp_value.re > 0.0 {
            Complex64::new(0.0, 0.0)
        } else {
            Complex64::new(f64::INFINITY, 0.0)
        };
    }
    if base.im == 0.0 && base.re > 0.0 && exp_value.im == 0.0 {
        return Complex64::new(base.re.powf(exp_value.re), 0.0);
    }
    base.powc(exp_value)
}

fn eval_complex(expr: &Expr, bindings: &Bindings) -> Result<Complex64> {
    match &expr.kind {
        ExprKind::Number(n) => Ok(Complex64::new(*n, 0.0)),

        ExprKind::Constant(c) => Ok(match c {
            Constant::Pi => Complex64::new(std::f64::consts::PI, 0.0),
            Constant::E => Complex64::new(std::f64::consts::E, 0.0),
            Constant::I => Complex64::new(0.0, 1.0),
        }),

        ExprKind::Symbol(s) => bindings
            .get(&Symbol::from_id(s.id()))
            .copied()
            .ok_or_else(|| not_numeric(expr)),

        ExprKind::Sum(terms) => terms
            .iter()
            .try_fold(Complex64::new(0.0, 0.0), |acc, t| {
                Ok(acc + eval_complex(t, bindings)?)
            }),

        ExprKind::Product(factors) => factors
            .iter()
            .try_fold(Complex64::new(1.0, 0.0), |acc, f| {
                Ok(acc * eval_complex(f, bindings)?)
            }),

        ExprKind::Pow(base, exp) => {
            let b = eval_complex(base, bindings)?;
            let e = eval_complex(exp, bindings)?;
            Ok(complex_pow(b, exp, e))
        }

        ExprKind::FunctionCall { name, args } => {
            let def = Registry::get(name).ok_or_else(|| not_numeric(expr))?;
            let numeric = def.numeric.as_ref().ok_or_else(|| not_numeric(expr))?;
            let values = args
                .iter()
                .map(|a| eval_complex(a, bindings))
                .collect::<Result<Vec<_>>>()?;
            numeric(&values).ok_or_else(|| not_numeric(expr))
        }

        // Bound dummies take the values of their points
        ExprKind::Subs(s) => {
            let mut inner = bindings.clone();
            for (d, p) in s.variables().iter().zip(s.point()) {
                inner.insert(*d, eval_complex(p, bindings)?);
            }
            eval_complex(s.expr(), &inner)
        }

        ExprKind::Derivative(_) | ExprKind::Lambda(_) => Err(not_numeric(expr)),
    }
}

impl Expr {
    /// Numeric value of a closed expression
    pub fn evalf(&self) -> Result<Complex64> {
        eval_complex(self, &Bindings::default())
    }

    /// Numeric value with the given symbol values
    pub fn evalf_with(&self, bindings: &Bindings) -> Result<Complex64> {
        eval_complex(self, bindings)
    }
}
