//! WebAssembly exports for the rover effects.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Pixels cross
//! the boundary as flat RGBA bytes (length = width * height * 4), effect
//! knobs as a JSON object tagged with `"effect"`.

use wasm_bindgen::prelude::*;

use crate::pipeline::{apply_effect, EffectParameters};
use crate::raster::RasterBuffer;
use crate::render::PreviewRenderer;

fn parse_params(params_json: &str) -> Result<EffectParameters, JsValue> {
    if params_json.trim().is_empty() {
        return Ok(EffectParameters::None);
    }
    EffectParameters::from_json(params_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

// ============================================================================
// Exact export
// ============================================================================

/// Apply an effect to RGBA u8 pixels.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `params_json` - e.g. `{"effect": "edges", "strength": 2.4}`; empty means no effect
///
/// # Returns
/// Flat array of RGBA bytes with the same dimensions
#[wasm_bindgen]
pub fn apply_effect_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    params_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let params = parse_params(params_json)?;
    let raster = RasterBuffer::new(width, height, data.to_vec())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(apply_effect(&raster, &params).into_bytes())
}

// ============================================================================
// Live preview
// ============================================================================

/// CSS `filter` value approximating an effect for live preview.
#[wasm_bindgen]
pub fn preview_css_wasm(params_json: &str) -> Result<String, JsValue> {
    let params = parse_params(params_json)?;
    Ok(PreviewRenderer.graph(&params).to_css())
}
