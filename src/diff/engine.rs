//! Differentiation engine - applies calculus rules node by node
//!
//! One pass differentiates with respect to a single symbol. Differentiation with
//! respect to a function application or a derivative node is done by swapping it
//! for a fresh dummy symbol, differentiating, and swapping back.
//!
//! A pass returns `None` only when the node at the top declines: a function whose
//! derivative hook returns `None`, or a lambda that depends on the variable.
//! Declining children are kept as unevaluated `Derivative` nodes instead.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::core::symbol::Symbol;
use crate::functions::registry::Registry;
use crate::subs::Subs;
use crate::{Derivative, Expr, ExprKind};

/// The symbol of the current pass
pub(crate) struct Wrt {
    sym: Symbol,
    expr: Expr,
}

impl Wrt {
    pub(crate) fn new(sym: Symbol) -> Self {
        Self {
            sym,
            expr: sym.to_expr(),
        }
    }
}

/// Derivative of a child; a declining child stays as an unevaluated node
fn diff_child(e: &Expr, wrt: &Wrt) -> Expr {
    derive(e, wrt)
        .unwrap_or_else(|| Derivative::new_unevaluated(e.clone(), vec![(wrt.expr.clone(), 1)]))
}

/// Partial derivative of an application at `slot` when no rule is known
///
/// `Derivative(f(u), u)` when the slot holds a valid differentiation variable
/// (symbol, application or derivative) that no other argument mentions, otherwise
/// the derivative is taken at a dummy point: `Subs(Derivative(f(xi), xi), xi, arg)`.
fn default_partial(name: &str, args: &[Expr], slot: usize) -> Expr {
    let arg = &args[slot];
    if arg.is_diff_wrt() {
        let shared = args.iter().enumerate().any(|(i, a)| {
            i != slot
                && match arg.as_symbol() {
                    Some(s) => a.contains_symbol(s),
                    None => a.has(arg),
                }
        });
        if !shared {
            let call = Expr::func_raw(name, args.to_vec());
            return Derivative::new_unevaluated(call, vec![(arg.clone(), 1)]);
        }
    }
    let xi = Symbol::dummy(&format!("xi_{}", slot + 1));
    let mut point_args = args.to_vec();
    point_args[slot] = xi.to_expr();
    let inner =
        Derivative::new_unevaluated(Expr::func_raw(name, point_args), vec![(xi.to_expr(), 1)]);
    Subs::from_parts(inner, vec![xi], vec![arg.clone()])
}

fn derive_function(name: &str, args: &[Arc<Expr>], wrt: &Wrt) -> Option<Expr> {
    let args: Vec<Expr> = args.iter().map(|a| (**a).clone()).collect();
    let def = Registry::get(name);

    // A derivative hook replaces the chain rule and may decline
    if let Some(hook) = def.as_ref().and_then(|d| d.derivative.clone()) {
        trace!(target: "symb_calculus::diff", function = name, "derivative hook");
        return hook(&args, &wrt.expr);
    }

    // Chain rule: dF/dx = Σ (∂F/∂arg[i]) * (darg[i]/dx)
    let partial = def.as_ref().and_then(|d| d.partial.clone());
    let mut terms = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let da = diff_child(arg, wrt);
        if da.is_zero_num() {
            continue;
        }
        let df = partial
            .as_ref()
            .and_then(|p| p(&args, i))
            .unwrap_or_else(|| default_partial(name, &args, i));
        terms.push(Expr::mul_expr(df, da));
    }
    Some(Expr::sum(terms))
}

/// One differentiation pass: d(expr)/d(wrt)
pub(crate) fn derive(expr: &Expr, wrt: &Wrt) -> Option<Expr> {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Constant(_) => Some(Expr::number(0.0)),

        ExprKind::Symbol(s) => Some(Expr::number(if s.id() == wrt.sym.id() {
            1.0
        } else {
            0.0
        })),

        // Sum rule: (a + b + c + ...)' = a' + b' + c' + ...
        ExprKind::Sum(terms) => Some(Expr::sum(
            terms.iter().map(|t| diff_child(t, wrt)).collect(),
        )),

        // N-ary product rule, factor order preserved for non-commuting factors
        ExprKind::Product(factors) => {
            let mut result_terms = Vec::with_capacity(factors.len());
            for i in 0..factors.len() {
                let factor_prime = diff_child(&factors[i], wrt);
                if factor_prime.is_zero_num() {
                    continue;
                }
                let mut all_factors: Vec<Expr> = factors.iter().map(|f| (**f).clone()).collect();
                all_factors[i] = factor_prime;
                result_terms.push(Expr::product(all_factors));
            }
            Some(Expr::sum(result_terms))
        }

        ExprKind::Pow(base, exp) => {
            let b = (**base).clone();
            let e = (**exp).clone();
            if !exp.contains_symbol(wrt.sym) {
                // Power rule: (u^n)' = n * u^(n-1) * u'
                let db = diff_child(base, wrt);
                if db.is_zero_num() {
                    return Some(Expr::number(0.0));
                }
                let lowered = Expr::pow(b, Expr::sub_expr(e.clone(), Expr::number(1.0)));
                return Some(Expr::product(vec![e, lowered, db]));
            }
            // General rule: (u^v)' = u^v * (v' * ln(u) + v * u'/u)
            let db = diff_child(base, wrt);
            let de = diff_child(exp, wrt);
            let log_term = Expr::mul_expr(de, Expr::builtin("ln", b.clone()));
            let base_term = Expr::product(vec![e.clone(), db, Expr::pow(b.clone(), Expr::number(-1.0))]);
            Some(Expr::mul_expr(
                Expr::pow(b, e),
                Expr::add_expr(log_term, base_term),
            ))
        }

        ExprKind::FunctionCall { name, args } => {
            trace!(target: "symb_calculus::diff", function = %name, "chain rule");
            derive_function(name, args, wrt)
        }

        ExprKind::Derivative(d) => {
            if !expr.contains_symbol(wrt.sym) {
                return Some(Expr::number(0.0));
            }
            // Already attempted for this variable: bump its count
            if d.pairs().iter().any(|(v, _)| *v == wrt.expr) {
                let mut pairs = d.pairs().to_vec();
                pairs.push((wrt.expr.clone(), 1));
                return Some(Derivative::new_unevaluated(d.expr().clone(), pairs));
            }
            let obj = diff_child(d.expr(), wrt);
            if obj.is_zero_num() {
                return Some(obj);
            }
            if obj.as_derivative().is_some() {
                return Some(Derivative::new_unevaluated(obj, d.pairs().to_vec()));
            }
            // The new expression may now allow the remaining derivatives
            Some(evaluate_derivative(obj, d.pairs().to_vec()))
        }

        // Chain rule through the substitution point, plus explicit dependence
        ExprKind::Subs(s) => {
            if !expr.contains_symbol(wrt.sym) {
                return Some(Expr::number(0.0));
            }
            trace!(target: "symb_calculus::diff", subs = %expr, "chain rule through point");
            let mut terms = Vec::with_capacity(s.variables().len() + 1);
            if s.expr().contains_symbol(wrt.sym) {
                let direct = diff_child(s.expr(), wrt);
                terms.push(s.with_expr(direct).doit());
            }
            for (d, p) in s.variables().iter().zip(s.point()) {
                let dp = diff_child(p, wrt);
                if dp.is_zero_num() {
                    continue;
                }
                let inner = evaluate_derivative(s.expr().clone(), vec![(d.to_expr(), 1)]);
                terms.push(Expr::mul_expr(dp, s.with_expr(inner).doit()));
            }
            Some(Expr::sum(terms))
        }

        ExprKind::Lambda(_) => {
            if expr.contains_symbol(wrt.sym) {
                None
            } else {
                Some(Expr::number(0.0))
            }
        }
    }
}

/// Evaluate `d^n expr / d v1^n1 d v2^n2 ...`
///
/// Pairs are canonicalized first. Variables the engine cannot handle end up in an
/// unevaluated `Derivative` around the partial result; after an unhandled
/// non-symbol variable all later variables are left unhandled too.
pub(crate) fn evaluate_derivative(expr: Expr, pairs: Vec<(Expr, u32)>) -> Expr {
    let pairs = Derivative::canonical_pairs(pairs);
    if pairs.is_empty() {
        return expr;
    }

    // Differentiating by a symbol the expression does not contain gives zero
    if pairs
        .iter()
        .filter_map(|(v, _)| v.as_symbol())
        .any(|s| !expr.contains_symbol(s))
    {
        return Expr::number(0.0);
    }

    let mut expr = expr;
    let mut unhandled: Vec<(Expr, u32)> = Vec::new();
    let mut unhandled_non_symbol = false;

    for (v, count) in pairs {
        if unhandled_non_symbol {
            unhandled.push((v, count));
            continue;
        }

        let symbol = v.as_symbol();
        let (wrt, target) = match symbol {
            Some(s) => (Wrt::new(s), expr.clone()),
            None => {
                let dummy = Symbol::dummy("diff_wrt");
                let replaced = expr.subs(&v, &dummy.to_expr());
                (Wrt::new(dummy), replaced)
            }
        };

        let mut obj = target;
        let mut done = 0;
        while done < count {
            let Some(next) = derive(&obj, &wrt) else {
                break;
            };
            if next == obj {
                done = count;
                break;
            }
            obj = next;
            done += 1;
            if obj.is_zero_num() {
                break;
            }
        }

        if obj.is_zero_num() {
            return obj;
        }

        if done > 0 {
            if symbol.is_none() && obj.contains_symbol(wrt.sym) {
                // Derivative nodes rename their variables back structurally
                obj = obj.subs(&wrt.expr, &v);
            }
            expr = obj;
        }

        if done < count {
            debug!(
                target: "symb_calculus::diff",
                variable = %v,
                remaining = count - done,
                "derivative left unevaluated"
            );
            unhandled.push((v, count - done));
            unhandled_non_symbol |= symbol.is_none();
        }
    }

    Derivative::new_unevaluated(expr, unhandled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, symb};

    #[test]
    fn test_power_rule() {
        let x = symb("eng_x");
        let e = x.pow(3.0);
        let d = evaluate_derivative(e, vec![(x.to_expr(), 1)]);
        assert_eq!(d, 3.0 * x.pow(2.0));
    }

    #[test]
    fn test_symbol_not_free_is_zero() {
        let x = symb("eng_zx");
        let y = symb("eng_zy");
        let d = evaluate_derivative(x.sin(), vec![(x.to_expr(), 1), (y.to_expr(), 1)]);
        assert_eq!(d, Expr::number(0.0));
    }

    #[test]
    fn test_undefined_function_of_symbol() {
        let x = symb("eng_fx");
        let fx = Function::new("eng_f").of(x).unwrap();
        let d = evaluate_derivative(fx.clone(), vec![(x.to_expr(), 1)]);
        let node = d.as_derivative().expect("unevaluated derivative");
        assert_eq!(node.expr(), &fx);
        assert_eq!(node.pairs(), &[(x.to_expr(), 1)]);
    }

    #[test]
    fn test_declining_hook_stays_unevaluated() {
        crate::register_function(
            crate::FunctionDefinition::new("eng_opaque").derivative(|_, _| None),
        );
        let x = symb("eng_hx");
        let e = Expr::call("eng_opaque", vec![x.to_expr()]).unwrap();
        let d = evaluate_derivative(e.clone(), vec![(x.to_expr(), 1)]);
        assert_eq!(d, Derivative::new_unevaluated(e.clone(), vec![(x.to_expr(), 1)]));

        // Inside a sum only the declining term stays unevaluated
        let sum = Expr::add_expr(e.clone(), x.pow(2.0));
        let d = evaluate_derivative(sum, vec![(x.to_expr(), 1)]);
        let expected = Expr::add_expr(
            Derivative::new_unevaluated(e, vec![(x.to_expr(), 1)]),
            2.0 * x,
        );
        assert_eq!(d, expected);
    }
}
