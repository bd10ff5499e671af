//! Scalar tone transforms shared by every effect.
//!
//! All "strength", "amount" and "recontrast" knobs go through [`contrast`],
//! a linear stretch around mid-gray (128).

/// Clamp a value into the byte range `[0, 255]`. NaN maps to 0.
#[inline]
pub fn clamp_byte(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 255.0)
}

/// Linear contrast around mid-gray: `clamp_byte((v - 128) * c + 128)`.
#[inline]
pub fn contrast(v: f32, c: f32) -> f32 {
    clamp_byte((v - 128.0) * c + 128.0)
}

/// Gamma curve on the byte range: `255 * (v / 255)^(1 / g)`.
///
/// Non-positive or NaN gamma leaves the (clamped) value unchanged.
#[inline]
pub fn gamma(v: f32, g: f32) -> f32 {
    let v = clamp_byte(v);
    if g.is_nan() || g <= 0.0 {
        return v;
    }
    clamp_byte(255.0 * (v / 255.0).powf(1.0 / g))
}

/// Replace a non-finite knob value with `fallback`.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Quantize a value to a byte, rounding to nearest.
#[inline]
pub fn to_byte(v: f32) -> u8 {
    clamp_byte(v).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_byte() {
        assert_eq!(clamp_byte(-5.0), 0.0);
        assert_eq!(clamp_byte(300.0), 255.0);
        assert_eq!(clamp_byte(12.5), 12.5);
        assert_eq!(clamp_byte(f32::NAN), 0.0);
        assert_eq!(clamp_byte(f32::INFINITY), 255.0);
    }

    #[test]
    fn test_mid_gray_is_fixed_point() {
        for c in [-10.0, -1.0, 0.0, 0.5, 1.0, 1.8, 3.0, 1000.0] {
            assert_eq!(contrast(128.0, c), 128.0, "c = {c}");
        }
    }

    #[test]
    fn test_contrast_stretch() {
        assert_relative_eq!(contrast(138.0, 2.0), 148.0);
        assert_relative_eq!(contrast(0.0, 0.0), 128.0);
        assert_eq!(contrast(255.0, 1.8), 255.0);
        assert_eq!(contrast(0.0, 1.8), 0.0);
        // negative contrast inverts around mid-gray
        assert_relative_eq!(contrast(100.0, -1.0), 156.0);
    }

    #[test]
    fn test_gamma() {
        assert_eq!(gamma(0.0, 2.2), 0.0);
        assert_relative_eq!(gamma(255.0, 2.2), 255.0);
        assert!(gamma(64.0, 2.0) > 64.0);
        assert!(gamma(64.0, 0.5) < 64.0);
        assert_eq!(gamma(64.0, 0.0), 64.0);
        assert_eq!(gamma(300.0, -1.0), 255.0);
    }

    #[test]
    fn test_to_byte_rounds() {
        assert_eq!(to_byte(127.4), 127);
        assert_eq!(to_byte(127.6), 128);
        assert_eq!(to_byte(-1.0), 0);
        assert_eq!(to_byte(1e9), 255);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(2.5, 1.0), 2.5);
        assert_eq!(finite_or(f32::NAN, 1.0), 1.0);
        assert_eq!(finite_or(f32::NEG_INFINITY, 1.8), 1.8);
    }
}
