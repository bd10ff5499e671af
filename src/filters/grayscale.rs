//! Grayscale (luma) projection.
//!
//! Uses ITU-R BT.709 luminosity coefficients. Alpha is ignored.

use ndarray::{parallel::prelude::*, Array2, Array3, Zip};

use super::color_adjust::to_byte;
use crate::raster::{RasterBuffer, ScalarField, CHANNELS};

/// ITU-R BT.709 luminosity coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Luminosity of a single RGB triple, in the 0-255 range of its inputs.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Project an RGBA raster onto a luma field of the same dimensions.
pub fn luma_field(input: &RasterBuffer) -> ScalarField {
    let pixels = input.view();
    let mut output = Array2::<f32>::zeros((input.height() as usize, input.width() as usize));

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        *out = luma(
            pixels[[y, x, 0]] as f32,
            pixels[[y, x, 1]] as f32,
            pixels[[y, x, 2]] as f32,
        );
    });

    ScalarField::from_array(output)
}

/// Write a field into an opaque gray raster: R=G=B=value, A=255.
///
/// Values are clamped and rounded to bytes.
pub fn field_to_rgba(field: &ScalarField) -> RasterBuffer {
    let values = field.view();
    let (height, width) = values.dim();
    let mut output = Array3::<u8>::zeros((height, width, CHANNELS));

    Zip::indexed(&mut output).par_for_each(|(y, x, c), out| {
        *out = if c == 3 { 255 } else { to_byte(values[[y, x]]) };
    });

    RasterBuffer::from_parts(output)
}
