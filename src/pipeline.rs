//! Effect selection: maps an [`EffectParameters`] value onto the filter
//! chain that implements it.
//!
//! [`apply_effect`] is a pure function of its inputs. All intermediate
//! fields are owned by the call and dropped before it returns.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::filters::edge::{edges, EdgesParams};
use crate::filters::sharpen::{sharpen, SharpenParams};
use crate::filters::stylize::{threshold, ThresholdParams};
use crate::layer_effects::outline::{outline, OutlineParams};
use crate::raster::RasterBuffer;

/// The effects the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EffectKind {
    #[default]
    None,
    Edges,
    Sharpen,
    Threshold,
    Outline,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::None,
        EffectKind::Edges,
        EffectKind::Sharpen,
        EffectKind::Threshold,
        EffectKind::Outline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::None => "none",
            EffectKind::Edges => "edges",
            EffectKind::Sharpen => "sharpen",
            EffectKind::Threshold => "threshold",
            EffectKind::Outline => "outline",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| format!("unknown effect '{s}'"))
    }
}

/// Effect selector together with the knobs that effect reads.
///
/// Serialized with an `"effect"` tag, e.g.
/// `{"effect": "edges", "strength": 2.0}`. Missing knobs take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectParameters {
    #[default]
    None,
    Edges(EdgesParams),
    Sharpen(SharpenParams),
    Threshold(ThresholdParams),
    Outline(OutlineParams),
}

impl EffectParameters {
    /// Default knobs for `kind`. Shared by the preview and export paths.
    pub fn defaults(kind: EffectKind) -> Self {
        match kind {
            EffectKind::None => Self::None,
            EffectKind::Edges => Self::Edges(EdgesParams::default()),
            EffectKind::Sharpen => Self::Sharpen(SharpenParams::default()),
            EffectKind::Threshold => Self::Threshold(ThresholdParams::default()),
            EffectKind::Outline => Self::Outline(OutlineParams::default()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Self::None => EffectKind::None,
            Self::Edges(_) => EffectKind::Edges,
            Self::Sharpen(_) => EffectKind::Sharpen,
            Self::Threshold(_) => EffectKind::Threshold,
            Self::Outline(_) => EffectKind::Outline,
        }
    }

    /// Parse parameters from their JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<EffectKind> for EffectParameters {
    fn from(kind: EffectKind) -> Self {
        Self::defaults(kind)
    }
}

/// Run the effect described by `params` over `input`.
///
/// Never fails and never panics for any knob values: every channel of the
/// result is produced through clamping. The output has the input's
/// dimensions.
pub fn apply_effect(input: &RasterBuffer, params: &EffectParameters) -> RasterBuffer {
    debug!(
        "apply_effect: {} on {}x{}",
        params.kind(),
        input.width(),
        input.height()
    );

    match params {
        EffectParameters::None => input.clone(),
        EffectParameters::Edges(p) => edges(input, p),
        EffectParameters::Sharpen(p) => sharpen(input, p),
        EffectParameters::Threshold(p) => threshold(input, p),
        EffectParameters::Outline(p) => outline(input, p),
    }
}
