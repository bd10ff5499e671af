//! Stylize filters: binary luma threshold.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::color_adjust::finite_or;
use super::grayscale::luma;
use crate::raster::{RasterBuffer, CHANNELS};

/// Knobs for [`threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Multiplier on the mid-gray cut-off: pixels with luma >= `128 * shift`
    /// turn white.
    pub shift: f32,
    /// Swap black and white.
    pub invert: bool,
}

impl ThresholdParams {
    pub const DEFAULT_SHIFT: f32 = 1.0;

    /// Luma cut-off in the 0-255 range.
    pub fn cutoff(&self) -> f32 {
        128.0 * finite_or(self.shift, Self::DEFAULT_SHIFT)
    }
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            shift: Self::DEFAULT_SHIFT,
            invert: false,
        }
    }
}

/// Binarize `input` on luma. Output channels are only ever 0 or 255;
/// alpha is forced to 255.
pub fn threshold(input: &RasterBuffer, params: &ThresholdParams) -> RasterBuffer {
    let cutoff = params.cutoff();
    let invert = params.invert;
    let mut output = input.clone();

    output
        .as_bytes_mut()
        .par_chunks_exact_mut(CHANNELS)
        .for_each(|px| {
            let g = luma(px[0] as f32, px[1] as f32, px[2] as f32);
            let v = if (g >= cutoff) != invert { 255 } else { 0 };
            px.copy_from_slice(&[v, v, v, 255]);
        });

    output
}
