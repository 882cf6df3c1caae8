use crate::HydroError;

/// Floating point type used throughout the system
pub type Real = f64;

/// Comparison tolerances for readings and dose volumes.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// Approximate equality under the given tolerances. The reference scale
/// for the relative part is the larger magnitude of the two operands.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Round to two decimal places. Reporting precision for sensor readings;
/// internal state always keeps full precision.
pub fn round2(v: Real) -> Real {
    (v * 100.0).round() / 100.0
}

/// Reject NaN and infinite values at configuration boundaries.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HydroError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HydroError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_respects_both_tolerances() {
        let tol = Tolerances::default();
        assert!(nearly_equal(6.5, 6.5 + 1e-13, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(nearly_equal(1.4, 1.4 * (1.0 + 1e-10), tol));
        assert!(!nearly_equal(6.5, 6.51, tol));
    }

    #[test]
    fn round2_reporting_precision() {
        assert_eq!(round2(7.199_999_9), 7.2);
        assert_eq!(round2(7.066), 7.07);
        assert_eq!(round2(7.064), 7.06);
        assert_eq!(round2(5.0), 5.0);
    }

    #[test]
    fn ensure_finite_accepts_ordinary_values() {
        assert_eq!(ensure_finite(6.5, "target").unwrap(), 6.5);
    }

    #[test]
    fn ensure_finite_rejects_nan_and_infinity() {
        assert!(ensure_finite(Real::NAN, "target").is_err());
        assert!(ensure_finite(Real::INFINITY, "target").is_err());
        let msg = format!("{}", ensure_finite(Real::NAN, "target").unwrap_err());
        assert!(msg.contains("target"));
    }
}
