//! Function application API
//!
//! `Expr::call` applies builtin, registered and undefined functions by name.
//! [`Function`] is a handle for an undefined function that remembers its arity.

use std::sync::{Arc, OnceLock};

use super::registry::Registry;
use super::{builtin, evaluate_call};
use crate::Expr;
use crate::error::{CalculusError, Result};

fn check_registered_arity(name: &str, got: usize) -> Result<()> {
    match Registry::get(name) {
        Some(def) if !def.validate_arity(got) => {
            Err(CalculusError::arity(name, def.arity_description(), got))
        }
        _ => Ok(()),
    }
}

impl Expr {
    /// Apply a function by name
    ///
    /// Registered functions check their arity and fold special values; any other
    /// name gives an opaque application.
    ///
    /// # Example
    /// ```
    /// use symb_calculus::Expr;
    ///
    /// let zero = Expr::call("sin", vec![Expr::number(0.0)]).unwrap();
    /// assert_eq!(zero, Expr::number(0.0));
    /// assert!(Expr::call("sin", vec![]).is_err());
    /// ```
    pub fn call(name: &str, args: Vec<Expr>) -> Result<Expr> {
        check_registered_arity(name, args.len())?;
        Ok(evaluate_call(name, args))
    }

    /// Apply a function without running its evaluation rule
    pub fn call_unevaluated(name: &str, args: Vec<Expr>) -> Result<Expr> {
        check_registered_arity(name, args.len())?;
        Ok(Expr::func_raw(name, args))
    }

    pub(crate) fn builtin(name: &str, arg: Expr) -> Expr {
        builtin(name, arg)
    }
}

/// Handle for an undefined (opaque) function
///
/// A handle created with [`Function::new`] binds its arity to the argument count
/// of its first application; clones share that binding.
///
/// # Example
/// ```
/// use symb_calculus::{Function, symb};
///
/// let f = Function::new("doc_f");
/// let x = symb("doc_fx");
/// let fx = f.call(vec![x.to_expr()]).unwrap();
/// assert_eq!(fx.to_string(), "doc_f(doc_fx)");
/// assert!(f.call(vec![x.to_expr(), x.to_expr()]).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Function {
    name: Arc<str>,
    arity: Arc<OnceLock<usize>>,
    variadic: bool,
}

impl Function {
    /// Undefined function whose arity is fixed by its first call
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            arity: Arc::new(OnceLock::new()),
            variadic: false,
        }
    }

    /// Undefined function with a declared arity
    pub fn with_arity(name: &str, arity: usize) -> Self {
        Self {
            name: Arc::from(name),
            arity: Arc::new(OnceLock::from(arity)),
            variadic: false,
        }
    }

    /// Undefined function accepting any number of arguments
    pub fn variadic(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            arity: Arc::new(OnceLock::new()),
            variadic: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound arity, if declared or fixed by a previous call
    pub fn arity(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            self.arity.get().copied()
        }
    }

    /// Apply to arguments
    pub fn call(&self, args: Vec<Expr>) -> Result<Expr> {
        if !self.variadic {
            let bound = *self.arity.get_or_init(|| args.len());
            if bound != args.len() {
                return Err(CalculusError::arity(&self.name, bound, args.len()));
            }
        }
        Expr::call(&self.name, args)
    }

    /// Apply to a single argument
    pub fn of(&self, arg: impl Into<Expr>) -> Result<Expr> {
        self.call(vec![arg.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symb;

    #[test]
    fn test_first_call_binds_arity() {
        let f = Function::new("app_f");
        let x = symb("app_x").to_expr();
        assert_eq!(f.arity(), None);
        f.call(vec![x.clone(), x.clone()]).unwrap();
        assert_eq!(f.arity(), Some(2));
        let err = f.call(vec![x.clone()]).unwrap_err();
        assert!(err.is_type_error());
        // Clones share the binding
        assert!(f.clone().of(x).is_err());
    }

    #[test]
    fn test_declared_and_variadic() {
        let g = Function::with_arity("app_g", 1);
        assert!(g.call(vec![]).is_err());
        let h = Function::variadic("app_h");
        assert!(h.call(vec![]).is_ok());
        assert!(h.call(vec![Expr::number(1.0); 3]).is_ok());
    }

    #[test]
    fn test_unevaluated_keeps_special_value() {
        let e = Expr::call_unevaluated("cos", vec![Expr::number(0.0)]).unwrap();
        assert_eq!(e.to_string(), "cos(0)");
        assert_ne!(e, Expr::number(1.0));
    }
}
