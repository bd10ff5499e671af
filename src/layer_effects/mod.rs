//! Layer effects composited on top of the original image.
//!
//! Unlike the filters, layer effects keep the source colors and blend an
//! overlay onto them.
//!
//! ## Overlay Effects
//! - **Outline** - Edge-weighted colored screen overlay (`outline.rs`)

pub mod outline;
