use crate::{
    CalculusError, Derivative, Diff, DiffArg, Expr, Function, FunctionDefinition, Lambda, Subs,
    diff, register_function, symb,
};

fn unevaluated(e: &Expr, specs: &[DiffArg]) -> Expr {
    Diff::new().evaluate(false).differentiate(e, specs).unwrap()
}

#[test]
fn test_elementary_rules() {
    let x = symb("dt_x");
    let e = x.pow(3.0) + x.sin();
    assert_eq!(diff(&e, &[x.into()]).unwrap(), 3.0 * x.pow(2.0) + x.cos());

    let e = x.to_expr() * x.exp();
    assert_eq!(
        diff(&e, &[x.into()]).unwrap(),
        x.exp() + x.to_expr() * x.exp()
    );

    // d/dx x^x = x^x * (ln(x) + 1)
    let e = Expr::pow(x.to_expr(), x.to_expr());
    let expected = Expr::pow(x.to_expr(), x.to_expr()) * (x.ln() + 1.0);
    assert_eq!(diff(&e, &[x.into()]).unwrap(), expected);
}

#[test]
fn test_repeated_variable_equals_count() {
    let x = symb("dt_rx");
    let f = Function::new("dt_rf");
    let fx = f.of(x).unwrap();
    let repeated = diff(&fx, &[x.into(), x.into(), x.into()]).unwrap();
    let counted = diff(&fx, &[x.into(), 3u32.into()]).unwrap();
    let paired = diff(&fx, &[(x, 3u32).into()]).unwrap();
    assert_eq!(repeated, counted);
    assert_eq!(counted, paired);
    assert_eq!(repeated.to_string(), "Derivative(dt_rf(dt_rx), (dt_rx, 3))");

    let lazy = unevaluated(&fx, &[x.into(), x.into(), x.into()]);
    assert_eq!(lazy, counted);
}

#[test]
fn test_chained_equals_combined() {
    let (x, y) = (symb("dt_cx"), symb("dt_cy"));
    let f = Function::new("dt_cf");
    let fxy = f.call(vec![x.to_expr(), y.to_expr()]).unwrap();

    let combined = diff(&fxy, &[x.into(), y.into()]).unwrap();
    let x_then_y = diff(&diff(&fxy, &[x.into()]).unwrap(), &[y.into()]).unwrap();
    let y_then_x = diff(&diff(&fxy, &[y.into()]).unwrap(), &[x.into()]).unwrap();
    assert_eq!(combined, x_then_y);
    assert_eq!(combined, y_then_x);

    let d = combined.as_derivative().unwrap();
    assert_eq!(d.pairs(), &[(x.to_expr(), 1), (y.to_expr(), 1)]);
}

#[test]
fn test_point_derivative_wrapping() {
    let x = symb("dt_px");
    let v = symb("dt_pv");
    let f = Function::new("dt_pf");

    let result = diff(&f.of(2.0 * x).unwrap(), &[x.into()]).unwrap();

    let dfv = unevaluated(&f.of(v).unwrap(), &[v.into()]);
    let at_point = Subs::new(&dfv, &[v.to_expr()], &[2.0 * x]).unwrap();
    assert_eq!(result, 2.0 * at_point.clone());
    assert_eq!(result.hash, (2.0 * at_point).hash);
}

#[test]
fn test_dependent_symbol_chain_rule() {
    let t = symb("dt_t");
    let q = Function::new("dt_q");
    let qt = q.of(t).unwrap();

    let result = diff(&qt.clone().sin(), &[t.into()]).unwrap();
    let qdot = unevaluated(&qt, &[t.into()]);
    assert_eq!(result, qt.cos() * qdot);
}

#[test]
fn test_derivative_node_as_variable() {
    let t = symb("dt_lt");
    let q = Function::new("dt_lq");
    let qt = q.of(t).unwrap();
    let qdot = unevaluated(&qt, &[t.into()]);

    // L = qdot^2/2 + q^2 treats velocity and position as independent
    let lagrangian = 0.5 * Expr::pow(qdot.clone(), Expr::number(2.0)) + Expr::pow(qt.clone(), Expr::number(2.0));
    assert_eq!(diff(&lagrangian, &[qdot.clone().into()]).unwrap(), qdot);
    assert_eq!(diff(&lagrangian, &[qt.clone().into()]).unwrap(), 2.0 * qt);
}

#[test]
fn test_function_as_variable() {
    let x = symb("dt_fx");
    let f = Function::new("dt_ff");
    let fx = f.of(x).unwrap();
    let e = Expr::pow(fx.clone(), Expr::number(2.0)) + x.to_expr();
    assert_eq!(diff(&e, &[fx.clone().into()]).unwrap(), 2.0 * fx.clone());

    // Factors that are other applications are constants
    let g = Function::new("dt_fg");
    let gx = g.of(x).unwrap();
    let prod = fx.clone() * gx.clone();
    assert_eq!(diff(&prod, &[fx.into()]).unwrap(), gx);
}

#[test]
fn test_application_argument_as_variable() {
    let x = symb("dt_ax");
    let f = Function::new("dt_af");
    let g = Function::new("dt_ag");
    let gx = g.of(x).unwrap();
    let fgx = f.of(gx.clone()).unwrap();

    let result = diff(&fgx, &[gx.clone().into()]).unwrap();
    assert_eq!(result, unevaluated(&fgx, &[gx.into()]));
    assert_eq!(result.to_string(), "Derivative(dt_af(dt_ag(dt_ax)), dt_ag(dt_ax))");
    assert_eq!(result.doit(), result);
}

#[test]
fn test_chain_rule_through_applications() {
    let x = symb("dt_chx");
    let f = Function::new("dt_chf");
    let g = Function::new("dt_chg");
    let gx = g.of(x).unwrap();

    // f(g(x))' = Derivative(f(g(x)), g(x)) * Derivative(g(x), x)
    let fgx = f.of(gx.clone()).unwrap();
    let result = diff(&fgx, &[x.into()]).unwrap();
    let expected = unevaluated(&fgx, &[gx.clone().into()]) * unevaluated(&gx, &[x.into()]);
    assert_eq!(result, expected);
    assert_eq!(result.doit(), result);

    // f(sin(x))' = Derivative(f(sin(x)), sin(x)) * cos(x)
    let fsin = f.of(x.sin()).unwrap();
    let result = diff(&fsin, &[x.into()]).unwrap();
    assert_eq!(result, unevaluated(&fsin, &[x.sin().into()]) * x.cos());

    // One term per application argument
    let h = Function::new("dt_chh");
    let hx = h.of(x).unwrap();
    let f2 = Function::new("dt_ch2");
    let fgh = f2.call(vec![gx.clone(), hx.clone()]).unwrap();
    let result = diff(&fgh, &[x.into()]).unwrap();
    let expected = unevaluated(&fgh, &[gx.clone().into()]) * unevaluated(&gx, &[x.into()])
        + unevaluated(&fgh, &[hx.clone().into()]) * unevaluated(&hx, &[x.into()]);
    assert_eq!(result, expected);
}

#[test]
fn test_invalid_variables() {
    let x = symb("dt_ix");
    let e = x.pow(3.0);
    let err = diff(&e, &[x.pow(2.0).into()]).unwrap_err();
    assert!(matches!(err, CalculusError::InvalidDifferentiationVariable(_)));
    assert!(err.is_value_error());
    let err = diff(&e, &[Expr::number(2.0).into()]).unwrap_err();
    assert!(matches!(err, CalculusError::InvalidDifferentiationVariable(_)));
}

#[test]
fn test_zero_when_independent() {
    let (x, y) = (symb("dt_zx"), symb("dt_zy"));
    let f = Function::new("dt_zf");
    assert_eq!(diff(&f.of(x).unwrap(), &[y.into()]).unwrap(), Expr::number(0.0));
    let lam = Lambda::new(&[x.to_expr()], &x.sin()).unwrap();
    assert_eq!(diff(&lam, &[x.into()]).unwrap(), Expr::number(0.0));
}

#[test]
fn test_lambda_depending_on_variable_stays() {
    let (x, y) = (symb("dt_lx"), symb("dt_ly"));
    let lam = Lambda::new(&[y.to_expr()], &(x.to_expr() * y.to_expr())).unwrap();
    let d = diff(&lam, &[x.into()]).unwrap();
    let node = d.as_derivative().unwrap();
    assert_eq!(node.expr(), &lam);
}

#[test]
fn test_subs_chain_rule() {
    let (x, y) = (symb("dt_sx"), symb("dt_sy"));
    let f = Function::new("dt_sf");
    let s = Subs::new(&f.of(y).unwrap(), &[y.to_expr()], &[x.pow(2.0)]).unwrap();

    let result = diff(&s, &[x.into()]).unwrap();
    let dfy = unevaluated(&f.of(y).unwrap(), &[y.into()]);
    let expected = 2.0 * x * Subs::new(&dfy, &[y.to_expr()], &[x.pow(2.0)]).unwrap();
    assert_eq!(result, expected);
}

#[test]
fn test_subs_explicit_dependence() {
    let (x, y) = (symb("dt_ex"), symb("dt_ey"));
    let f = Function::new("dt_ef");
    let body = x.to_expr() * f.of(y).unwrap();
    let s = Subs::new(&body, &[y.to_expr()], &[Expr::number(0.0)]).unwrap();
    assert_eq!(diff(&s, &[x.into()]).unwrap(), f.of(0.0).unwrap());
}

#[test]
fn test_multi_argument_partials() {
    // F(u, v) = u * sin(v)
    register_function(
        FunctionDefinition::new("dt_F")
            .arity(2..=2)
            .partial(|args, slot| match slot {
                0 => Some(args[1].clone().sin()),
                _ => Some(args[0].clone() * args[1].clone().cos()),
            }),
    );
    let x = symb("dt_mx");
    let e = Expr::call("dt_F", vec![x.to_expr(), x.pow(2.0)]).unwrap();
    let result = diff(&e, &[x.into()]).unwrap();
    let expected = x.pow(2.0).sin() + 2.0 * x * (x.to_expr() * x.pow(2.0).cos());
    assert_eq!(result, expected);
}

#[test]
fn test_declining_partial_uses_default() {
    register_function(
        FunctionDefinition::new("dt_half")
            .arity(2..=2)
            .partial(|_, slot| (slot == 0).then(|| Expr::number(1.0))),
    );
    let (x, y) = (symb("dt_hx"), symb("dt_hy"));
    let e = Expr::call("dt_half", vec![x.to_expr(), y.to_expr()]).unwrap();
    let result = diff(&e, &[y.into()]).unwrap();
    assert_eq!(result, unevaluated(&e, &[y.into()]));
}

#[test]
fn test_derivative_hook() {
    register_function(
        FunctionDefinition::new("dt_hooked").derivative(|args, var| {
            Some(Expr::number(7.0) * diff(&args[0], &[var.into()]).ok()?)
        }),
    );
    let x = symb("dt_kx");
    let e = Expr::call("dt_hooked", vec![x.pow(2.0)]).unwrap();
    assert_eq!(diff(&e, &[x.into()]).unwrap(), 14.0 * x);
}

#[test]
fn test_doit_matches_evaluated() {
    let x = symb("dt_dx");
    let e = x.to_expr() * x.sin();
    let lazy = unevaluated(&e, &[x.into(), 2u32.into()]);
    assert!(lazy.as_derivative().is_some());
    assert_eq!(lazy.doit(), diff(&e, &[x.into(), 2u32.into()]).unwrap());
}

#[test]
fn test_sort_variables_public() {
    let (x, y) = (symb("dt_vx").to_expr(), symb("dt_vy").to_expr());
    let f = Function::new("dt_vf").of(x.clone()).unwrap();
    let g = Function::new("dt_vg").of(x.clone()).unwrap();
    let sorted = Derivative::sort_variables(&[y.clone(), x.clone(), g.clone(), f.clone(), x.clone()]);
    assert_eq!(sorted, vec![x.clone(), y, f, g, x]);
}
