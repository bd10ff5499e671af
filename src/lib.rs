//! Rover Effects
//!
//! Deterministic raster effects for rover photos: edge sketch, sharpen,
//! threshold and colored outline, with Python bindings via PyO3 and WASM
//! bindings for JavaScript.
//!
//! ## Image Format
//! Every effect consumes and produces RGBA8 rasters, (height, width, 4),
//! channel order R, G, B, A. Container formats (PNG, JPEG) are decoded and
//! encoded by collaborators outside the pipeline (see [`io`]).
//!
//! ## Architecture
//! - [`raster`]: `RasterBuffer` and `ScalarField`
//! - [`filters`]: luma, 3x3 convolution, Sobel gradient, dilation, tone and
//!   color helpers, and the pixel effects built from them
//! - [`layer_effects`]: overlays composited on the original colors
//! - [`pipeline`]: `apply_effect(raster, params)`, the single entry point
//! - [`render`]: exact export vs. approximate declarative preview
//! - [`session`]: fetch/apply/save orchestration with generation tokens
//! - [`catalog`]: photo catalog query URLs and listings

pub mod catalog;
pub mod error;
pub mod filters;
pub mod layer_effects;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod session;

#[cfg(feature = "cli")]
pub mod io;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{EffectError, Result};
pub use pipeline::{apply_effect, EffectKind, EffectParameters};
pub use raster::{RasterBuffer, ScalarField};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::pipeline::{apply_effect, EffectKind, EffectParameters};
    use crate::raster::RasterBuffer;
    use crate::render::PreviewRenderer;

    fn parse_params(effect: &str, params_json: Option<&str>) -> PyResult<EffectParameters> {
        let kind: EffectKind = effect.parse().map_err(PyValueError::new_err)?;
        let Some(json) = params_json else {
            return Ok(EffectParameters::defaults(kind));
        };
        let mut value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| PyValueError::new_err("params must be a JSON object"))?;
        object.insert("effect".into(), kind.as_str().into());
        serde_json::from_value(value).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Apply an effect to an RGBA u8 image of shape (H, W, 4).
    ///
    /// # Arguments
    /// * `image` - Source RGBA image
    /// * `effect` - "none", "edges", "sharpen", "threshold" or "outline"
    /// * `params` - Optional JSON object of knob overrides
    #[pyfunction]
    #[pyo3(signature = (image, effect="none", params=None))]
    pub fn apply<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        effect: &str,
        params: Option<&str>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = parse_params(effect, params)?;
        let raster = RasterBuffer::from_array(image.as_array().to_owned())
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let result = py.allow_threads(|| apply_effect(&raster, &params));
        Ok(result.into_array().into_pyarray(py))
    }

    /// CSS filter string approximating an effect for live preview.
    #[pyfunction]
    #[pyo3(signature = (effect="none", params=None))]
    pub fn preview_css(effect: &str, params: Option<&str>) -> PyResult<String> {
        let params = parse_params(effect, params)?;
        Ok(PreviewRenderer.graph(&params).to_css())
    }

    #[pymodule]
    pub fn rover_effects(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(apply, m)?)?;
        m.add_function(wrap_pyfunction!(preview_css, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::rover_effects;
