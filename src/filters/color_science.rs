//! Color science helpers: HSV to RGB conversion and screen compositing.

use serde::{Deserialize, Serialize};

use super::color_adjust::to_byte;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// HSV color: hue in degrees, saturation and value in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl HsvColor {
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    pub fn to_rgb(self) -> RgbColor {
        hsv_to_rgb(self.h, self.s, self.v)
    }
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Convert HSV to RGB.
///
/// Hue wraps modulo 360; saturation and value are clamped to 0.0-1.0.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> RgbColor {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let (s, v) = (unit(s), unit(v));

    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());

    let (r, g, b) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = v - c;
    RgbColor::new(
        to_byte((r + m) * 255.0),
        to_byte((g + m) * 255.0),
        to_byte((b + m) * 255.0),
    )
}

/// Screen-blend one channel: `1 - (1 - base) * (1 - blend * alpha)`.
///
/// Works in normalized 0.0-1.0 space; `alpha` is clamped to 0.0-1.0.
#[inline]
pub fn screen_channel(base: u8, blend: u8, alpha: f32) -> u8 {
    let alpha = unit(alpha);
    if alpha == 0.0 {
        return base;
    }
    let base = base as f32 / 255.0;
    let blend = blend as f32 / 255.0;
    to_byte((1.0 - (1.0 - base) * (1.0 - blend * alpha)) * 255.0)
}

/// Screen-blend an overlay color onto an RGB triple.
#[inline]
pub fn screen_blend(base: [u8; 3], overlay: RgbColor, alpha: f32) -> [u8; 3] {
    [
        screen_channel(base[0], overlay.r, alpha),
        screen_channel(base[1], overlay.g, alpha),
        screen_channel(base[2], overlay.b, alpha),
    ]
}
