//! Scalar helpers used by crossfades and blends.

/// Clamp a value to the unit interval `[0, 1]`.
///
/// NaN maps to 0 so a corrupted progress value can never escape the range.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Linear interpolation between `a` and `b`, with `t` clamped to `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use glade_core::lerp;
///
/// assert_eq!(lerp(0.0, 2.0, 0.5), 1.0);
/// assert_eq!(lerp(0.0, 2.0, 4.0), 2.0);
/// ```
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = clamp01(t);
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if span == 0.0 {
        return 0.0;
    }
    clamp01((value - a) / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(1.0, 3.0, 0.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 1.0), 3.0);
        assert_eq!(lerp(3.0, 1.0, 0.5), 2.0);
    }

    #[test]
    fn inverse_lerp_degenerate_span() {
        assert_eq!(inverse_lerp(2.0, 2.0, 5.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 4.0, 1.0), 0.25);
    }
}
