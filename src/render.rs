//! Preview and export renderers.
//!
//! Export runs the exact pixel pipeline. Preview produces a declarative
//! [`FilterGraph`] for an external display engine (CSS/SVG filters); it is
//! cheap and only approximates the export output. Both read the same
//! [`EffectParameters`] defaults.

use serde::{Deserialize, Serialize};

use crate::filters::color_science::RgbColor;
use crate::filters::convolve::Kernel3;
use crate::filters::edge::EdgesParams;
use crate::filters::morphology::effective_radius;
use crate::pipeline::{apply_effect, EffectParameters};
use crate::raster::RasterBuffer;

/// Something that turns a source raster and effect knobs into output.
pub trait EffectRenderer {
    type Output;

    fn render(&self, source: &RasterBuffer, params: &EffectParameters) -> Self::Output;
}

/// Exact, byte-for-byte pipeline output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportRenderer;

impl EffectRenderer for ExportRenderer {
    type Output = RasterBuffer;

    fn render(&self, source: &RasterBuffer, params: &EffectParameters) -> RasterBuffer {
        apply_effect(source, params)
    }
}

/// Contrast factor that turns a contrast stage into a near step function.
const STEP_CONTRAST: f32 = 100.0;
/// Upper bound on the brightness factor emitted for threshold previews.
const MAX_BRIGHTNESS: f32 = 1000.0;
/// Laplacian-style edge kernel; the preview has no Sobel magnitude.
const EDGE_KERNEL: Kernel3 = Kernel3([-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0]);

/// One declarative filter stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterPrimitive {
    Grayscale { amount: f32 },
    Brightness { amount: f32 },
    Contrast { amount: f32 },
    Invert { amount: f32 },
    /// SVG `feConvolveMatrix` (row-major 3x3).
    ConvolveMatrix { kernel: [f32; 9] },
    /// SVG `feMorphology operator="dilate"`.
    Dilate { radius: f32 },
    /// Colored glow around edges, `drop-shadow(0 0 blur color)`.
    Glow { color: RgbColor, blur: f32, opacity: f32 },
}

impl FilterPrimitive {
    /// CSS `filter` function for this stage, if CSS can express it.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Grayscale { amount } => Some(format!("grayscale({amount})")),
            Self::Brightness { amount } => Some(format!("brightness({amount})")),
            Self::Contrast { amount } => Some(format!("contrast({amount})")),
            Self::Invert { amount } => Some(format!("invert({amount})")),
            Self::Glow { color, blur, opacity } => Some(format!(
                "drop-shadow(0 0 {blur}px rgba({}, {}, {}, {opacity}))",
                color.r, color.g, color.b
            )),
            Self::ConvolveMatrix { .. } | Self::Dilate { .. } => None,
        }
    }
}

/// Ordered list of declarative filter stages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGraph {
    pub stages: Vec<FilterPrimitive>,
}

impl FilterGraph {
    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    /// CSS `filter` value. Stages CSS cannot express are skipped;
    /// an empty graph is `"none"`.
    pub fn to_css(&self) -> String {
        let parts: Vec<String> = self.stages.iter().filter_map(FilterPrimitive::to_css).collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Whether some stages need an SVG filter rather than CSS.
    pub fn needs_svg(&self) -> bool {
        self.stages.iter().any(|stage| stage.to_css().is_none())
    }
}

/// Approximate, declarative preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewRenderer;

impl PreviewRenderer {
    /// Build the filter graph for `params`. Needs no pixels.
    pub fn graph(&self, params: &EffectParameters) -> FilterGraph {
        let stages = match params {
            EffectParameters::None => Vec::new(),
            EffectParameters::Sharpen(p) => vec![
                FilterPrimitive::ConvolveMatrix { kernel: Kernel3::SHARPEN.0 },
                FilterPrimitive::Contrast { amount: p.sanitized().amount.max(0.0) },
            ],
            EffectParameters::Threshold(p) => {
                let shift = p.cutoff() / 128.0;
                let brightness = if shift > 0.0 {
                    (1.0 / shift).min(MAX_BRIGHTNESS)
                } else {
                    MAX_BRIGHTNESS
                };
                let mut stages = vec![
                    FilterPrimitive::Grayscale { amount: 1.0 },
                    FilterPrimitive::Brightness { amount: brightness },
                    FilterPrimitive::Contrast { amount: STEP_CONTRAST },
                ];
                if p.invert {
                    stages.push(FilterPrimitive::Invert { amount: 1.0 });
                }
                stages
            }
            EffectParameters::Edges(p) => edges_graph(&p.sanitized()),
            EffectParameters::Outline(p) => {
                let p = p.sanitized();
                vec![FilterPrimitive::Glow {
                    color: p.color(),
                    blur: effective_radius(p.width).unwrap_or(0) as f32,
                    opacity: p.opacity.clamp(0.0, 1.0),
                }]
            }
        };
        FilterGraph { stages }
    }
}

fn edges_graph(p: &EdgesParams) -> Vec<FilterPrimitive> {
    let mut stages = vec![
        FilterPrimitive::Grayscale { amount: 1.0 },
        FilterPrimitive::ConvolveMatrix { kernel: EDGE_KERNEL.0 },
        FilterPrimitive::Invert { amount: 1.0 },
        FilterPrimitive::Brightness { amount: p.threshold.max(0.0) },
        FilterPrimitive::Contrast { amount: p.strength.max(0.0) },
    ];
    if let Some(radius) = effective_radius(p.thickness) {
        stages.push(FilterPrimitive::Dilate { radius: radius as f32 });
    }
    stages.push(FilterPrimitive::Contrast { amount: p.recontrast.max(0.0) });
    stages
}

impl EffectRenderer for PreviewRenderer {
    type Output = FilterGraph;

    fn render(&self, _source: &RasterBuffer, params: &EffectParameters) -> FilterGraph {
        self.graph(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::sharpen::SharpenParams;
    use crate::filters::stylize::ThresholdParams;
    use crate::layer_effects::outline::OutlineParams;
    use crate::pipeline::EffectKind;

    #[test]
    fn test_export_matches_pipeline() {
        let raster = RasterBuffer::filled(4, 4, [255, 255, 255, 255]).unwrap();
        for kind in EffectKind::ALL {
            let params = EffectParameters::defaults(kind);
            assert_eq!(ExportRenderer.render(&raster, &params), apply_effect(&raster, &params));
        }
    }

    #[test]
    fn test_none_preview_is_identity() {
        let graph = PreviewRenderer.graph(&EffectParameters::None);
        assert!(graph.is_identity());
        assert_eq!(graph.to_css(), "none");
    }

    #[test]
    fn test_threshold_preview_css() {
        let params = EffectParameters::Threshold(ThresholdParams { shift: 0.5, invert: true });
        let graph = PreviewRenderer.graph(&params);
        assert_eq!(graph.to_css(), "grayscale(1) brightness(2) contrast(100) invert(1)");
        assert!(!graph.needs_svg());
    }

    #[test]
    fn test_edges_preview_uses_defaults() {
        let graph = PreviewRenderer.graph(&EffectParameters::defaults(EffectKind::Edges));
        assert!(graph.needs_svg());
        assert!(graph.stages.contains(&FilterPrimitive::Contrast { amount: 1.8 }));
        assert!(!graph.stages.iter().any(|s| matches!(s, FilterPrimitive::Dilate { .. })));
    }

    #[test]
    fn test_sharpen_preview_non_finite_amount_uses_default() {
        for amount in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let graph = PreviewRenderer.graph(&EffectParameters::Sharpen(SharpenParams { amount }));
            let default = PreviewRenderer.graph(&EffectParameters::defaults(EffectKind::Sharpen));
            assert_eq!(graph, default, "amount {amount}");
        }
        assert_eq!(
            SharpenParams { amount: f32::NAN }.sanitized(),
            SharpenParams::default()
        );
    }

    #[test]
    fn test_outline_preview_default_color_matches_export() {
        let graph = PreviewRenderer.graph(&EffectParameters::defaults(EffectKind::Outline));
        let color = OutlineParams::default().color();
        assert!(matches!(
            &graph.stages[..],
            [FilterPrimitive::Glow { color: c, .. }] if *c == color
        ));
    }

    #[test]
    fn test_outline_preview_glow() {
        let params = EffectParameters::Outline(OutlineParams {
            width: 2.0,
            hue: 0.0,
            saturation: 3.0,
            opacity: 4.0,
        });
        let graph = PreviewRenderer.graph(&params);
        assert_eq!(graph.to_css(), "drop-shadow(0 0 2px rgba(255, 0, 0, 1))");

        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.contains(r#""op":"glow""#));
    }
}
