use num_traits::Float;

/// Default tolerance for floating-point comparisons
pub(crate) const FLOAT_TOLERANCE: f64 = 1e-10;

/// Coefficients below this magnitude are dropped when like terms cancel
pub(crate) const COEFF_EPSILON: f64 = 1e-14;

// ===== Float tolerance helpers =====

/// Check if a float is approximately zero (within tolerance)
#[inline]
pub(crate) fn is_zero(n: f64) -> bool {
    n.abs() < FLOAT_TOLERANCE
}

/// Check if a float is approximately one (within tolerance)
#[inline]
pub(crate) fn is_one(n: f64) -> bool {
    (n - 1.0).abs() < FLOAT_TOLERANCE
}

/// Check if a float is approximately negative one (within tolerance)
#[inline]
pub(crate) fn is_neg_one(n: f64) -> bool {
    (n + 1.0).abs() < FLOAT_TOLERANCE
}

/// Exact integer value of a float, if it has one
#[inline]
pub(crate) fn as_integer<T: Float>(n: T) -> Option<i64> {
    if n.is_finite() && n.fract() == T::zero() {
        n.to_i64()
    } else {
        None
    }
}

/// `n!` as a float (used for Taylor coefficients and contour integrals)
pub(crate) fn factorial(n: u32) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * f64::from(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zero() {
        assert!(is_zero(0.0));
        assert!(is_zero(-0.0));
        assert!(is_zero(1e-11));
        assert!(!is_zero(1e-3));
    }

    #[test]
    fn test_is_neg_one() {
        assert!(is_neg_one(-1.0));
        assert!(!is_neg_one(1.0));
    }

    #[test]
    fn test_is_one() {
        assert!(is_one(1.0));
        assert!(is_one(1.0 + 1e-11));
        assert!(!is_one(1.1));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(3.0), Some(3));
        assert_eq!(as_integer(-2.0), Some(-2));
        assert_eq!(as_integer(0.5), None);
        assert_eq!(as_integer(f64::NAN), None);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(5), 120.0);
    }
}
