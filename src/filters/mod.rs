//! Filter modules for the raster effects pipeline.
//!
//! ## Format
//!
//! Every filter consumes a [`RasterBuffer`](crate::raster::RasterBuffer)
//! (RGBA8, (H, W, 4)) or a [`ScalarField`](crate::raster::ScalarField)
//! (f32, (H, W)) and returns a new one. Inputs are never modified.
//!
//! ## Architecture
//!
//! - **Pure** - No state survives a call; intermediates are owned by the caller
//! - **Clamped** - Knobs are accepted at any value; outputs stay in 0-255
//! - **Thread-safe** - Per-pixel passes run on rayon via `ndarray::Zip`
//! - **Thin border** - 3x3 stages leave the one-pixel edge ring unprocessed
//!
//! ## Filter Categories
//!
//! - **Building blocks**: luma (`grayscale`), 3x3 convolution (`convolve`),
//!   Sobel magnitude (`gradient`), max filter (`morphology`)
//! - **Scalar transforms**: clamp, contrast, gamma (`color_adjust`)
//! - **Color**: HSV conversion, screen blend (`color_science`)
//! - **Effects**: sharpen (`sharpen`), threshold (`stylize`), edge sketch (`edge`)

pub mod color_adjust;
pub mod color_science;
pub mod convolve;
pub mod edge;
pub mod gradient;
pub mod grayscale;
pub mod morphology;
pub mod sharpen;
pub mod stylize;
