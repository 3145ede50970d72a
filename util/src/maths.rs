//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range `[0, 2pi)`.
pub fn bound_radians<T>(angle: T) -> T
where
    T: Float
{
    // TAU is always representable in a float type
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let r = rem_euclid(angle, tau_t);

    // Guard the round-off case noted on `rem_euclid`
    if r >= tau_t { T::zero() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.5f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.25f64, &0.0, &1.0), 0.25);
    }

    #[test]
    fn test_bound_radians() {
        const TAU: f64 = std::f64::consts::TAU;
        const PI: f64 = std::f64::consts::PI;

        assert_eq!(bound_radians(0f64), 0f64);
        assert_relative_eq!(bound_radians(-PI / 2.0), 1.5 * PI);
        assert_relative_eq!(bound_radians(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(bound_radians(-TAU - 1.0), TAU - 1.0, epsilon = 1e-12);
        assert!(bound_radians(-1e-20f64) < TAU);
    }
}
