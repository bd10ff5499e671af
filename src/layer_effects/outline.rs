//! Colored outline overlay.
//!
//! Screen-blends a solid HSV color onto the original image, weighted by the
//! normalized Sobel magnitude:
//! 1. Luma -> Sobel magnitude -> normalize to 0.0-1.0
//! 2. Optionally dilate by `width` (on the 0-255 representation)
//! 3. Per pixel `alpha = clamp(magnitude * opacity, 0, 1)`
//! 4. `screen(original_rgb, color, alpha)`, alpha forced to 255

use log::trace;
use ndarray::{parallel::prelude::*, Zip};
use serde::{Deserialize, Serialize};

use crate::filters::color_adjust::finite_or;
use crate::filters::color_science::{hsv_to_rgb, screen_channel, RgbColor};
use crate::filters::gradient::{gradient_magnitude, normalize};
use crate::filters::grayscale::luma_field;
use crate::filters::morphology::{dilate, effective_radius};
use crate::raster::{RasterBuffer, ScalarField};

/// Knobs for [`outline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineParams {
    /// Dilation radius in pixels; `<= 0` keeps the raw one-pixel edges.
    pub width: f32,
    /// Overlay hue in degrees.
    pub hue: f32,
    /// Saturation on a 0-3 scale; values above 3 saturate fully.
    pub saturation: f32,
    /// Multiplier on the edge magnitude before it becomes blend alpha.
    pub opacity: f32,
}

impl OutlineParams {
    pub const DEFAULT_WIDTH: f32 = 1.0;
    pub const DEFAULT_HUE: f32 = 30.0;
    pub const DEFAULT_SATURATION: f32 = 3.0;
    pub const DEFAULT_OPACITY: f32 = 1.0;

    /// Same knobs with non-finite values replaced by the defaults.
    pub fn sanitized(&self) -> Self {
        Self {
            width: finite_or(self.width, Self::DEFAULT_WIDTH),
            hue: finite_or(self.hue, Self::DEFAULT_HUE),
            saturation: finite_or(self.saturation, Self::DEFAULT_SATURATION),
            opacity: finite_or(self.opacity, Self::DEFAULT_OPACITY),
        }
    }

    /// The overlay color: full value, saturation rescaled from 0-3.
    pub fn color(&self) -> RgbColor {
        let p = self.sanitized();
        hsv_to_rgb(p.hue, (p.saturation / 3.0).min(1.0), 1.0)
    }
}

impl Default for OutlineParams {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            hue: Self::DEFAULT_HUE,
            saturation: Self::DEFAULT_SATURATION,
            opacity: Self::DEFAULT_OPACITY,
        }
    }
}

/// Edge weights in 0.0-1.0, optionally widened by `width`.
fn edge_weights(input: &RasterBuffer, width: f32) -> ScalarField {
    let magnitude = normalize(&gradient_magnitude(&luma_field(input)), 1.0);
    if effective_radius(width).is_none() {
        return magnitude;
    }
    let bytes = magnitude.map(|m| m * 255.0);
    dilate(&bytes, width).map(|v| v / 255.0)
}

/// Overlay a colored outline on the edges of `input`.
pub fn outline(input: &RasterBuffer, params: &OutlineParams) -> RasterBuffer {
    let p = params.sanitized();
    let color = p.color();
    trace!("outline: {p:?}, color {}", color.to_hex());

    let weights = edge_weights(input, p.width);
    let weights = weights.view();
    let overlay = [color.r, color.g, color.b];
    let src = input.view();
    let mut output = input.clone();

    Zip::indexed(output.view_mut()).par_for_each(|(y, x, c), out| {
        *out = if c == 3 {
            255
        } else {
            let alpha = (weights[[y, x]] * p.opacity).clamp(0.0, 1.0);
            screen_channel(src[[y, x, c]], overlay[c], alpha)
        };
    });

    output
}
