//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Linearly interpolate between `a` and `b`.
///
/// `fraction = 0` yields `a`, `fraction = 1` yields `b`. Fractions outside
/// `[0, 1]` extrapolate.
pub fn lerp<T>(a: T, b: T, fraction: T) -> T
where
    T: Float
{
    fraction * b + (T::one() - fraction) * a
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value > max {
        return max
    }
    if value < min {
        return min
    }

    value
}

/// Return the euclidian norm of a vector.
pub fn norm<T>(vector: &[T]) -> T
where
    T: Float + std::ops::AddAssign
{
    let mut sum = T::zero();

    for v in vector {
        sum += v.powi(2);
    }

    sum.sqrt()
}

/// Normalise an angle in degrees into the range `(-180, 180]`.
///
/// The lower bound is exclusive, so -180 maps to +180.
pub fn wrap_deg(angle_deg: f64) -> f64 {
    let wrapped = (angle_deg + 180f64).rem_euclid(360f64) - 180f64;

    if wrapped == -180f64 {
        180f64
    }
    else {
        wrapped
    }
}

/// Get the shortest signed angular distance `a - b` between two headings in
/// degrees.
///
/// The result is in `(-180, 180]` and accounts for wrapping across the
/// +/-180 degree boundary.
pub fn ang_diff_deg(a_deg: f64, b_deg: f64) -> f64 {
    wrap_deg(a_deg - b_deg)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
