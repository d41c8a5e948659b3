use crate::{CalculusError, Expr, Function, Subs, symb};
use rustc_hash::FxHashSet;

#[test]
fn test_doit_single_and_multiple() {
    let (x, y) = (symb("st_x"), symb("st_y"));
    let f = Function::new("st_f");
    let g = Function::new("st_g");

    let s = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
    assert_eq!(s.doit(), f.of(0.0).unwrap());

    let gxy = g.call(vec![x.to_expr(), y.to_expr()]).unwrap();
    let s = Subs::new(
        &gxy,
        &[x.to_expr(), y.to_expr()],
        &[Expr::number(0.0), Expr::number(1.0)],
    )
    .unwrap();
    let expected = g.call(vec![Expr::number(0.0), Expr::number(1.0)]).unwrap();
    assert_eq!(s.doit(), expected);
}

#[test]
fn test_substitution_is_simultaneous() {
    let (x, y) = (symb("st_sx"), symb("st_sy"));
    let g = Function::new("st_sg");
    let gxy = g.call(vec![x.to_expr(), y.to_expr()]).unwrap();
    // x -> y, y -> x swaps rather than collapsing
    let s = Subs::new(&gxy, &[x.to_expr(), y.to_expr()], &[y.to_expr(), x.to_expr()]).unwrap();
    assert_eq!(s.doit(), g.call(vec![y.to_expr(), x.to_expr()]).unwrap());
}

#[test]
fn test_alpha_equivalence() {
    let (x, y) = (symb("st_ax"), symb("st_ay"));
    let f = Function::new("st_af");
    let a = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
    let b = Subs::new(&f.of(y).unwrap(), &[y.to_expr()], &[Expr::number(0.0)]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hash, b.hash);

    let mut set = FxHashSet::default();
    set.insert(a.clone());
    assert!(set.contains(&b));

    // Alpha-equivalent nodes collect as like terms
    assert_eq!(a.clone() + b, 2.0 * a);
}

#[test]
fn test_different_points_differ() {
    let x = symb("st_dx");
    let f = Function::new("st_df");
    let a = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
    let b = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(1.0)]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_construction_errors() {
    let (x, y) = (symb("st_ex"), symb("st_ey"));
    let g = Function::new("st_eg");
    let gxy = g.call(vec![x.to_expr(), y.to_expr()]).unwrap();
    let zero = Expr::number(0.0);

    let err = Subs::new(
        &gxy,
        &[x.to_expr(), y.to_expr()],
        &[zero.clone(), zero.clone(), Expr::number(1.0)],
    )
    .unwrap_err();
    assert_eq!(
        err,
        CalculusError::SubsLengthMismatch {
            variables: 2,
            points: 3
        }
    );

    let err = Subs::new(&gxy, &[x.to_expr(), x.to_expr()], &[zero.clone(), zero]).unwrap_err();
    assert!(matches!(err, CalculusError::DuplicateVariable(_)));
}

#[test]
fn test_free_symbols() {
    let (x, y, z) = (symb("st_fx"), symb("st_fy"), symb("st_fz"));
    let g = Function::new("st_fg");
    let gxy = g.call(vec![x.to_expr(), y.to_expr()]).unwrap();
    let s = Subs::new(&gxy, &[x.to_expr()], &[z.to_expr()]).unwrap();

    let free = s.free_symbols();
    assert!(free.contains(&y));
    assert!(free.contains(&z));
    assert!(!free.contains(&x));
    assert_eq!(s.as_subs().unwrap().free_symbols(), free);
}

#[test]
fn test_compound_variable() {
    let x = symb("st_cx");
    let e = x.pow(2.0).sin();
    let s = Subs::new(&e, &[x.pow(2.0)], &[Expr::number(0.0)]).unwrap();
    assert!(s.as_subs().is_some());
    assert_eq!(s.doit(), Expr::number(0.0));
}

#[test]
fn test_outer_renaming_cannot_capture() {
    let (x, y) = (symb("st_rx"), symb("st_ry"));
    let g = Function::new("st_rg");
    let gxy = g.call(vec![x.to_expr(), y.to_expr()]).unwrap();
    let s = Subs::new(&gxy, &[x.to_expr()], &[Expr::number(2.0)]).unwrap();

    // Renaming the free y to x must keep it distinct from the bound x
    let renamed = s.subs(&y.to_expr(), &x.to_expr());
    let expected = g.call(vec![Expr::number(2.0), x.to_expr()]).unwrap();
    assert_eq!(renamed.doit(), expected);
}

#[test]
fn test_display() {
    let x = symb("st_px");
    let f = Function::new("st_pf");
    let s = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(1.0)]).unwrap();
    assert_eq!(s.to_string(), "Subs(st_pf(_st_px), (_st_px,), (1,))");
}

#[test]
fn test_numeric_evaluation() {
    let x = symb("st_nx");
    let s = Subs::new(&x.sin(), &[x.to_expr()], &[Expr::number(0.5)]).unwrap();
    let v = s.evalf().unwrap();
    assert!((v.re - 0.5_f64.sin()).abs() < 1e-12);
}

#[test]
fn test_outer_substitution_reaches_point_only() {
    let (x, y) = (symb("st_ox"), symb("st_oy"));
    let f = Function::new("st_of");
    let at_y = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[y.to_expr()]).unwrap();
    let at_zero = Subs::new(&f.of(x).unwrap(), &[x.to_expr()], &[Expr::number(0.0)]).unwrap();
    assert_eq!(at_y.subs(&y.to_expr(), &Expr::number(0.0)), at_zero);
    // The bound variable is private: substituting x changes nothing
    assert_eq!(at_y.subs(&x.to_expr(), &Expr::number(5.0)), at_y);
}
