//! 3x3 convolution over scalar fields and RGB channels.
//!
//! ## Border Handling
//!
//! Only interior pixels (`1 <= x < width-1`, `1 <= y < height-1`) are
//! recomputed. The outer one-pixel ring is zero in a fresh field and left
//! unchanged in RGB output, so filtered images always show a thin
//! unprocessed border. Images smaller than 3x3 have no interior.

use ndarray::{parallel::prelude::*, Array2, Zip};

use crate::raster::{RasterBuffer, ScalarField};

/// Row-major 3x3 kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3(pub [f32; 9]);

impl Kernel3 {
    /// Horizontal Sobel derivative.
    pub const SOBEL_X: Self = Self([-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0]);
    /// Vertical Sobel derivative.
    pub const SOBEL_Y: Self = Self([-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0]);
    /// 4-neighbour sharpen.
    pub const SHARPEN: Self = Self([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0]);

    /// Weighted sum of the 3x3 neighbourhood centred on `(x, y)`.
    ///
    /// `(x, y)` must be an interior pixel.
    #[inline]
    fn apply_at(&self, x: usize, y: usize, sample: impl Fn(usize, usize) -> f32) -> f32 {
        // f64 accumulation keeps integer-weighted kernels exact on flat regions
        let mut sum = 0.0f64;
        for ky in 0..3 {
            for kx in 0..3 {
                let weight = self.0[ky * 3 + kx];
                if weight != 0.0 {
                    sum += weight as f64 * sample(x + kx - 1, y + ky - 1) as f64;
                }
            }
        }
        sum as f32
    }
}

/// Whether `(x, y)` has a full 3x3 neighbourhood.
#[inline]
pub fn is_interior(x: usize, y: usize, width: usize, height: usize) -> bool {
    x >= 1 && y >= 1 && x + 1 < width && y + 1 < height
}

/// Convolve a scalar field. Border values are zero.
pub fn convolve_field(input: &ScalarField, kernel: &Kernel3) -> ScalarField {
    let src = input.view();
    let (height, width) = src.dim();
    let mut output = Array2::<f32>::zeros((height, width));

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        if is_interior(x, y, width, height) {
            *out = kernel.apply_at(x, y, |sx, sy| src[[sy, sx]]);
        }
    });

    ScalarField::from_array(output)
}

/// Convolve each RGB channel of a raster independently.
///
/// Interior channel values become `finish(raw_sum)`; the border ring and all
/// alpha values are copied from `input`.
pub fn convolve_rgb(
    input: &RasterBuffer,
    kernel: &Kernel3,
    finish: impl Fn(f32) -> u8 + Sync + Send,
) -> RasterBuffer {
    let src = input.view();
    let (height, width, _) = src.dim();
    let mut output = input.clone();

    Zip::indexed(output.view_mut()).par_for_each(|(y, x, c), out| {
        if c < 3 && is_interior(x, y, width, height) {
            *out = finish(kernel.apply_at(x, y, |sx, sy| src[[sy, sx, c]] as f32));
        }
    });

    output
}
