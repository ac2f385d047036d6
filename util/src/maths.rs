//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value between a minimum and maximum.
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

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();
    
    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        return -c
    }
    else {
        return d
    }
}

/// Get the unsigned angular separation between two angles, in the range
/// [0, pi].
///
/// Computed as `|pi - ||a - b| - pi||`, which is correct for any pair of
/// angles whose absolute difference is less than 2pi, i.e. both already in
/// [0, 2pi).
pub fn abs_ang_sep<T>(a: T, b: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();

    (pi_t - ((a - b).abs() - pi_t).abs()).abs()
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

/// Wrap any angle into [0, 2pi).
///
/// Unlike `rem_euclid` the upper bound is strict, a round-off result of
/// exactly 2pi is mapped to zero.
pub fn wrap_2pi<T>(value: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let r = rem_euclid(value, tau_t);
    if r >= tau_t { T::zero() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const TAU: f64 = std::f64::consts::TAU;
    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_get_ang_dist_2pi() {
        assert_eq!(get_ang_dist_2pi(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_2pi(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist_2pi(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist_2pi(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU - 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(TAU - 1f64, 1f64), 2f64);
    }

    #[test]
    fn test_abs_ang_sep() {
        assert_eq!(abs_ang_sep(0f64, 0f64), 0f64);
        assert!((abs_ang_sep(PI, 0f64) - PI).abs() < 1e-12);
        assert!((abs_ang_sep(0.1f64, TAU - 0.1) - 0.2).abs() < 1e-12);
        assert!((abs_ang_sep(TAU - 0.1, 0.1f64) - 0.2).abs() < 1e-12);
        assert!((abs_ang_sep(1.0f64, 2.5) - 1.5).abs() < 1e-12);
        assert!((abs_ang_sep(0.0f64, 4.0) - (TAU - 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_2pi() {
        assert_eq!(wrap_2pi(0f64), 0f64);
        assert!((wrap_2pi(-0.5f64) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_2pi(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert_eq!(wrap_2pi(TAU), 0f64);
        assert!(wrap_2pi(-1e-18f64) < TAU);
        assert!((wrap_2pi(-PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&75.0f64, &3.0, &70.0), 70.0);
        assert_eq!(clamp(&1.0f64, &3.0, &70.0), 3.0);
        assert_eq!(clamp(&10.0f64, &3.0, &70.0), 10.0);
    }
}
