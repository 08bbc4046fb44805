use num_traits::Float;
use std::fmt::Display;

/// Assert two float values are the same up to `eps`.
#[allow(dead_code)]
pub fn assert_float_eq<T>(left: T, right: T, eps: T)
where
    T: Float + Display,
{
    if left.is_nan() {
        assert!(right.is_nan(), "left is NaN, but right is not");
    } else {
        let diff = (left - right).abs();
        assert!(
            diff < eps,
            "values |{} - {}| ≥ {} (diff: {})",
            left,
            right,
            eps,
            diff
        );
    }
}

/// Assert two float slices are elementwise the same up to `eps`.
#[allow(dead_code)]
pub fn assert_floats_eq<T>(left: &[T], right: &[T], eps: T)
where
    T: Float + Display,
{
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(right.iter()) {
        assert_float_eq(*l, *r, eps)
    }
}

/// Linearly interpolate the value at `x0` on the line through `(x1, y1)`
/// and `(x2, y2)`.
///
/// `x1 == x2` divides by zero; the non-finite result propagates to the
/// caller rather than being handled here.
pub fn lerp<T: Float>(x1: T, x2: T, x0: T, y1: T, y2: T) -> T {
    y1 + (x0 - x1) / (x2 - x1) * (y2 - y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_midpoint() {
        assert_float_eq(lerp(0.0, 10.0, 5.0, 0.0, 1.0), 0.5, 1e-12);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_float_eq(lerp(1000.0, 2000.0, 1000.0, 0.0, 5.0), 0.0, 1e-12);
        assert_float_eq(lerp(1000.0, 2000.0, 2000.0, 0.0, 5.0), 5.0, 1e-12);
    }

    #[test]
    fn test_lerp_flat_line() {
        // equal y endpoints interpolate to the same value everywhere
        assert_float_eq(lerp(0.0, 4.0, 3.0, 2.5, 2.5), 2.5, 1e-12);
    }

    #[test]
    fn test_lerp_degenerate_x_is_not_finite() {
        assert!(lerp(5.0, 5.0, 5.0, 0.0, 1.0).is_nan());
    }
}
