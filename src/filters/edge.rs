//! Edge sketch effect: dark Sobel edges on a white background.
//!
//! Pipeline: luma -> Sobel magnitude -> normalize to 0-255 -> invert ->
//! scale by `threshold` -> contrast(`strength`) -> optional dilation by
//! `thickness` -> contrast(`recontrast`) -> opaque gray raster.
//!
//! The one-pixel border has zero gradient and therefore maps like a flat
//! region.

use log::trace;
use serde::{Deserialize, Serialize};

use super::color_adjust::{contrast, finite_or};
use super::gradient::{gradient_magnitude, normalize};
use super::grayscale::{field_to_rgba, luma_field};
use super::morphology::dilate;
use crate::raster::RasterBuffer;

/// Knobs for [`edges`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgesParams {
    /// Contrast applied right after inversion.
    pub strength: f32,
    /// Multiplier on the inverted magnitude.
    pub threshold: f32,
    /// Dilation radius; `<= 0` disables dilation.
    pub thickness: f32,
    /// Final contrast pass.
    pub recontrast: f32,
}

impl EdgesParams {
    pub const DEFAULT_STRENGTH: f32 = 1.8;
    pub const DEFAULT_THRESHOLD: f32 = 1.0;
    pub const DEFAULT_THICKNESS: f32 = 0.0;
    pub const DEFAULT_RECONTRAST: f32 = 1.0;

    /// Same knobs with non-finite values replaced by the defaults.
    pub fn sanitized(&self) -> Self {
        Self {
            strength: finite_or(self.strength, Self::DEFAULT_STRENGTH),
            threshold: finite_or(self.threshold, Self::DEFAULT_THRESHOLD),
            thickness: finite_or(self.thickness, Self::DEFAULT_THICKNESS),
            recontrast: finite_or(self.recontrast, Self::DEFAULT_RECONTRAST),
        }
    }
}

impl Default for EdgesParams {
    fn default() -> Self {
        Self {
            strength: Self::DEFAULT_STRENGTH,
            threshold: Self::DEFAULT_THRESHOLD,
            thickness: Self::DEFAULT_THICKNESS,
            recontrast: Self::DEFAULT_RECONTRAST,
        }
    }
}

/// Render the edge sketch of `input`.
pub fn edges(input: &RasterBuffer, params: &EdgesParams) -> RasterBuffer {
    let p = params.sanitized();
    trace!("edges: {p:?}");

    let magnitude = normalize(&gradient_magnitude(&luma_field(input)), 255.0);
    let toned = magnitude.map(|m| contrast((255.0 - m) * p.threshold, p.strength));
    let thick = dilate(&toned, p.thickness);
    let finished = thick.map(|v| contrast(v, p.recontrast));

    field_to_rgba(&finished)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_raster() -> RasterBuffer {
        // left half black, right half white
        let mut raster = RasterBuffer::filled(8, 6, [0, 0, 0, 255]).unwrap();
        for y in 0..6 {
            for x in 4..8 {
                raster.set_pixel(x, y, [255, 255, 255, 255]).unwrap();
            }
        }
        raster
    }

    #[test]
    fn test_flat_image_is_white() {
        let raster = RasterBuffer::filled(4, 4, [255, 255, 255, 255]).unwrap();
        let out = edges(&raster, &EdgesParams::default());
        assert!(out.as_bytes().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_step_edge_is_dark() {
        let out = edges(&step_raster(), &EdgesParams::default());
        // strongest gradient -> m = 255 -> inverted 0 -> contrast stays 0
        assert_eq!(out.pixel(3, 2).unwrap(), [0, 0, 0, 255]);
        assert_eq!(out.pixel(4, 2).unwrap(), [0, 0, 0, 255]);
        assert_eq!(out.pixel(1, 2).unwrap(), [255, 255, 255, 255]);
        assert_eq!(out.pixel(6, 2).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_thickness_dilates_white() {
        let thick = EdgesParams { thickness: 1.0, ..EdgesParams::default() };
        let out = edges(&step_raster(), &thick);
        // the max filter spreads the bright background over the thin edge
        assert_eq!(out.pixel(3, 2).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_non_finite_knobs_fall_back_to_defaults() {
        let broken = EdgesParams {
            strength: f32::NAN,
            threshold: f32::INFINITY,
            thickness: f32::NAN,
            recontrast: f32::NEG_INFINITY,
        };
        assert_eq!(broken.sanitized(), EdgesParams::default());
        assert_eq!(
            edges(&step_raster(), &broken),
            edges(&step_raster(), &EdgesParams::default())
        );
    }
}
