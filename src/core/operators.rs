//! Operator overloading and builtin function methods
//!
//! `x + y`, `2.0 * x`, `-e`, `x.sin()` all build canonical trees through the
//! smart constructors and the builtin evaluation rules.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::core::symbol::Symbol;
use crate::Expr;

// ============================================================================
// Builtin function methods
// ============================================================================

macro_rules! impl_math_functions_ref {
    ($type:ty, $converter:expr, $($fn_name:ident => $func_str:literal),* $(,)?) => {
        impl $type {
            $(
                pub fn $fn_name(&self) -> Expr {
                    Expr::builtin($func_str, $converter(self))
                }
            )*
        }
    };
}

macro_rules! impl_math_functions_owned {
    ($type:ty, $converter:expr, $($fn_name:ident => $func_str:literal),* $(,)?) => {
        impl $type {
            $(
                pub fn $fn_name(self) -> Expr {
                    Expr::builtin($func_str, $converter(self))
                }
            )*
        }
    };
}

macro_rules! math_function_list {
    ($macro_name:ident, $type:ty, $converter:expr) => {
        $macro_name!($type, $converter,
            sin => "sin", cos => "cos", tan => "tan",
            cot => "cot", sec => "sec", csc => "csc",
            asin => "asin", acos => "acos", atan => "atan",
            sinh => "sinh", cosh => "cosh", tanh => "tanh",
            exp => "exp", ln => "ln",
        );
    };
}

math_function_list!(impl_math_functions_ref, Symbol, |s: &Symbol| s.to_expr());
math_function_list!(impl_math_functions_owned, Expr, |e: Expr| e);

impl Symbol {
    pub fn sqrt(&self) -> Expr {
        self.to_expr().sqrt()
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

macro_rules! impl_binary_ops {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = Expr;
            fn add(self, rhs: $rhs) -> Expr {
                Expr::add_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = Expr;
            fn sub(self, rhs: $rhs) -> Expr {
                Expr::sub_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = Expr;
            fn mul(self, rhs: $rhs) -> Expr {
                Expr::mul_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = Expr;
            fn div(self, rhs: $rhs) -> Expr {
                Expr::div_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
    };
}

// Symbol operations
impl_binary_ops!(Symbol, Symbol, |s: Symbol| s.to_expr(), |r: Symbol| r.to_expr());
impl_binary_ops!(Symbol, Expr, |s: Symbol| s.to_expr(), |r: Expr| r);
impl_binary_ops!(Symbol, &Expr, |s: Symbol| s.to_expr(), |r: &Expr| r.clone());
impl_binary_ops!(Symbol, f64, |s: Symbol| s.to_expr(), |r: f64| Expr::number(r));

// Expr operations
impl_binary_ops!(Expr, Expr, |s: Expr| s, |r: Expr| r);
impl_binary_ops!(Expr, &Expr, |s: Expr| s, |r: &Expr| r.clone());
impl_binary_ops!(Expr, Symbol, |s: Expr| s, |r: Symbol| r.to_expr());
impl_binary_ops!(Expr, f64, |s: Expr| s, |r: f64| Expr::number(r));

// &Expr operations (allows &a + &b without explicit .clone())
impl_binary_ops!(&Expr, &Expr, |e: &Expr| e.clone(), |r: &Expr| r.clone());
impl_binary_ops!(&Expr, Expr, |e: &Expr| e.clone(), |r: Expr| r);
impl_binary_ops!(&Expr, Symbol, |e: &Expr| e.clone(), |r: Symbol| r.to_expr());
impl_binary_ops!(&Expr, f64, |e: &Expr| e.clone(), |r: f64| Expr::number(r));

// f64 on the left
impl_binary_ops!(f64, Expr, |n: f64| Expr::number(n), |r: Expr| r);
impl_binary_ops!(f64, &Expr, |n: f64| Expr::number(n), |r: &Expr| r.clone());
impl_binary_ops!(f64, Symbol, |n: f64| Expr::number(n), |r: Symbol| r.to_expr());

// Negation
impl Neg for Symbol {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.to_expr().negate()
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.negate()
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.clone().negate()
    }
}
