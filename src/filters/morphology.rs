//! Morphological dilation (max filter) over scalar fields.
//!
//! Uses a square structuring element. Window pixels outside the field are
//! skipped rather than treated as zero, so border pixels see a smaller
//! window and are not darkened.
//!
//! The square max is computed as a horizontal pass followed by a vertical
//! pass, O(width * height * r). Radii are capped at `max(width, height)`;
//! larger windows already cover the whole field.

use ndarray::{parallel::prelude::*, Array2, ArrayView2, Axis, Zip};

use crate::raster::ScalarField;

/// Effective window radius for a user-supplied radius.
///
/// Returns `None` (identity) for `radius <= 0` or NaN, otherwise
/// `max(1, round(radius))`.
pub fn effective_radius(radius: f32) -> Option<usize> {
    if radius > 0.0 {
        // saturating float -> int cast
        Some((radius.round() as usize).max(1))
    } else {
        None
    }
}

/// Max over `[i - r, i + r]` along `axis`, truncated at the field edges.
fn max_along(src: ArrayView2<'_, f32>, axis: Axis, r: usize) -> Array2<f32> {
    let len = src.len_of(axis);
    let mut output = Array2::<f32>::zeros(src.dim());

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let i = if axis == Axis(0) { y } else { x };
        let lo = i.saturating_sub(r);
        let hi = i.saturating_add(r).min(len - 1);

        let mut max_val = f32::NEG_INFINITY;
        for j in lo..=hi {
            let v = if axis == Axis(0) { src[[j, x]] } else { src[[y, j]] };
            max_val = max_val.max(v);
        }
        *out = max_val;
    });

    output
}

/// Dilate a field with a square window of the given radius.
pub fn dilate(input: &ScalarField, radius: f32) -> ScalarField {
    let Some(r) = effective_radius(radius) else {
        return input.clone();
    };

    let src = input.view();
    let (height, width) = src.dim();
    let r = r.min(height.max(width));

    let rows = max_along(src, Axis(1), r);
    let output = max_along(rows.view(), Axis(0), r);

    ScalarField::from_array(output)
}
