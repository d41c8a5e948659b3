use std::sync::Arc;

use crate::{CalculusError, Expr, Lambda, symb};

#[test]
fn test_identity_is_cached() {
    let (x, y) = (symb("lt_x").to_expr(), symb("lt_y").to_expr());
    let a = Lambda::new(&[x.clone()], &x).unwrap();
    let b = Lambda::new(&[y.clone()], &y).unwrap();
    assert!(Arc::ptr_eq(a.as_lambda().unwrap(), b.as_lambda().unwrap()));
    assert!(
        Lambda::identity_function()
            .as_lambda()
            .unwrap()
            .is_identity()
    );

    // Not the identity: two parameters, or a body other than the parameter
    let c = Lambda::new(&[x.clone(), y.clone()], &x).unwrap();
    assert!(!c.as_lambda().unwrap().is_identity());
    let d = Lambda::new(&[x.clone()], &y).unwrap();
    assert!(!d.as_lambda().unwrap().is_identity());
}

#[test]
fn test_application() {
    let x = symb("lt_ax");
    let double = Lambda::new(&[x.to_expr()], &(2.0 * x)).unwrap();
    assert_eq!(double.apply_lambda(&[Expr::number(3.0)]).unwrap(), Expr::number(6.0));

    let err = double
        .apply_lambda(&[Expr::number(1.0), Expr::number(2.0)])
        .unwrap_err();
    assert_eq!(err, CalculusError::LambdaArity { expected: 1, got: 2 });
    assert!(err.is_type_error());
}

#[test]
fn test_multi_parameter_application() {
    let (x, y) = (symb("lt_mx"), symb("lt_my"));
    let l = Lambda::new(&[x.to_expr(), y.to_expr()], &(x.to_expr() - y.to_expr())).unwrap();
    let node = l.as_lambda().unwrap();
    assert_eq!(node.nargs(), 2);
    assert_eq!(node.arity(), 2);
    let r = node.apply(&[Expr::number(5.0), Expr::number(3.0)]).unwrap();
    assert_eq!(r, Expr::number(2.0));
    // Positional: swapping the arguments swaps the result
    let swapped = node.apply(&[y.to_expr(), x.to_expr()]).unwrap();
    assert_eq!(swapped, y.to_expr() - x.to_expr());
}

#[test]
fn test_composition() {
    let (x, y) = (symb("lt_cx"), symb("lt_cy"));
    let square = Lambda::new(&[x.to_expr()], &x.pow(2.0)).unwrap();
    let inc = Lambda::new(&[y.to_expr()], &(y.to_expr() + 1.0)).unwrap();
    let inner = inc.apply_lambda(&[Expr::number(2.0)]).unwrap();
    assert_eq!(square.apply_lambda(&[inner]).unwrap(), Expr::number(9.0));
}

#[test]
fn test_alpha_equivalence_requires_positions() {
    let (x, y) = (symb("lt_px"), symb("lt_py"));
    let a = Lambda::new(&[x.to_expr(), y.to_expr()], &x.to_expr()).unwrap();
    let b = Lambda::new(&[y.to_expr(), x.to_expr()], &y.to_expr()).unwrap();
    let c = Lambda::new(&[x.to_expr(), y.to_expr()], &y.to_expr()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hash, b.hash);
    assert_ne!(a, c);

    // One ignored argument still changes the arity
    let one = Lambda::new(&[x.to_expr()], &Expr::number(1.0)).unwrap();
    let two = Lambda::new(&[x.to_expr(), y.to_expr()], &Expr::number(1.0)).unwrap();
    assert_ne!(one, two);
}

#[test]
fn test_free_symbols() {
    let (x, y) = (symb("lt_fx"), symb("lt_fy"));
    let l = Lambda::new(&[x.to_expr()], &(x.to_expr() * y.to_expr())).unwrap();
    let free = l.free_symbols();
    assert!(free.contains(&y));
    assert!(!free.contains(&x));
    assert_eq!(l.as_lambda().unwrap().free_symbols(), free);
}

#[test]
fn test_errors() {
    let x = symb("lt_ex");
    let err = Lambda::new(&[Expr::number(1.0)], &x.to_expr()).unwrap_err();
    assert!(matches!(err, CalculusError::InvalidParameter(_)));
    let err = Lambda::new(&[x.to_expr(), x.to_expr()], &x.to_expr()).unwrap_err();
    assert!(matches!(err, CalculusError::DuplicateVariable(_)));
    let err = Expr::number(2.0).apply_lambda(&[]).unwrap_err();
    assert!(matches!(err, CalculusError::NotCallable(_)));
}

#[test]
fn test_display() {
    let (x, y) = (symb("lt_dx"), symb("lt_dy"));
    let l = Lambda::new(&[x.to_expr()], &(2.0 * x)).unwrap();
    assert_eq!(l.to_string(), "Lambda(lt_dx, 2*lt_dx)");
    let l = Lambda::new(&[x.to_expr(), y.to_expr()], &(x.to_expr() * y.to_expr())).unwrap();
    assert_eq!(l.to_string(), "Lambda((lt_dx, lt_dy), lt_dx*lt_dy)");
}
