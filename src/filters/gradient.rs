//! Sobel gradient magnitude and its normalization.

use log::trace;
use ndarray::{parallel::prelude::*, Zip};

use super::convolve::{convolve_field, Kernel3};
use crate::raster::ScalarField;

/// Gradient magnitude `hypot(gx, gy)` of a luma field.
///
/// The result is unnormalized; border values are zero.
pub fn gradient_magnitude(luma: &ScalarField) -> ScalarField {
    let gx = convolve_field(luma, &Kernel3::SOBEL_X);
    let mut magnitude = convolve_field(luma, &Kernel3::SOBEL_Y);

    Zip::from(magnitude.view_mut())
        .and(gx.view())
        .par_for_each(|m, &x| *m = x.hypot(*m));

    magnitude
}

/// Rescale a magnitude field so its maximum maps to `scale`.
///
/// A field whose maximum is zero (flat image) is scaled by 1.
pub fn normalize(magnitude: &ScalarField, scale: f32) -> ScalarField {
    let max = magnitude.max();
    let factor = if max > 0.0 { scale / max } else { 1.0 };
    trace!("normalize: max magnitude {max}, factor {factor}");
    magnitude.map(|v| v * factor)
}
