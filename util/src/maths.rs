//! Utility maths functions
//!
//! Angle handling follows two conventions:
//!
//! - Headings in radians live in the half-open range (-pi, pi], so that a
//!   heading of exactly pi is represented as pi rather than -pi.
//! - Differences between bearings in degrees live in the closed range
//!   [-180, 180].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Normalise an angle in radians into the range (-pi, pi].
///
/// The angle is brought into range by repeatedly adding or subtracting 2pi.
/// Inputs of exactly `pi` and `-pi` both map to `pi`.
///
/// Angles several turns away from zero are first reduced with `rem_euclid`,
/// as subtracting 2pi from a very large float does not change its value.
pub fn norm_angle_pi<T>(angle_rad: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let mut a = angle_rad;

    if a.abs() > tau_t + tau_t {
        a = rem_euclid(a, tau_t);
    }

    while a > pi_t {
        a = a - tau_t;
    }
    while a <= -pi_t {
        a = a + tau_t;
    }

    a
}

/// Normalise a difference between two angles in degrees into the range
/// [-180, 180].
///
/// Used for comparing bearings against headings, both given in degrees.
pub fn norm_ang_diff_deg<T>(diff_deg: T) -> T
where
    T: Float
{
    let half_turn: T = T::from(180.0).unwrap();
    let full_turn: T = T::from(360.0).unwrap();

    let mut d = diff_deg;

    if d.abs() > full_turn + full_turn {
        d = rem_euclid(d, full_turn);
    }

    while d > half_turn {
        d = d - full_turn;
    }
    while d < -half_turn {
        d = d + full_turn;
    }

    d
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Map a value in the range [-pi, pi] to [0, 2pi]
pub fn map_pi_to_2pi<T>(value: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    if value < T::zero() {
        tau_t + value
    }
    else {
        value
    }
}
