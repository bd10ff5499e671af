//! Sharpen effect: 4-neighbour sharpen kernel followed by a contrast stretch.
//!
//! Only interior pixels are sharpened (see [`super::convolve`]); they become
//! fully opaque. The one-pixel border keeps its original RGBA values.

use ndarray::{parallel::prelude::*, Zip};
use serde::{Deserialize, Serialize};

use super::color_adjust::{contrast, finite_or, to_byte};
use super::convolve::{convolve_rgb, is_interior, Kernel3};
use crate::raster::RasterBuffer;

/// Knobs for [`sharpen`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenParams {
    /// Contrast factor applied to the sharpened channels.
    pub amount: f32,
}

impl SharpenParams {
    pub const DEFAULT_AMOUNT: f32 = 1.0;

    /// Same knobs with a non-finite amount replaced by the default.
    pub fn sanitized(&self) -> Self {
        Self { amount: finite_or(self.amount, Self::DEFAULT_AMOUNT) }
    }
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self { amount: Self::DEFAULT_AMOUNT }
    }
}

/// Sharpen the RGB channels of `input`.
pub fn sharpen(input: &RasterBuffer, params: &SharpenParams) -> RasterBuffer {
    let amount = params.sanitized().amount;
    let mut output = convolve_rgb(input, &Kernel3::SHARPEN, |raw| to_byte(contrast(raw, amount)));

    let (width, height) = (input.width() as usize, input.height() as usize);
    Zip::indexed(output.view_mut()).par_for_each(|(y, x, c), out| {
        if c == 3 && is_interior(x, y, width, height) {
            *out = 255;
        }
    });

    output
}
