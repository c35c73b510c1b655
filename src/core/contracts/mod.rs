//! Serializable settings shared between the tool layer and the painters.

use serde::{Deserialize, Serialize};

use crate::core::brush_model::validate_engine_config;
use crate::core::errors::CoreError;

/// Default distance between interpolated stamps of `stamp_line`, in pixels
pub const DEFAULT_LINE_STRIDE: f32 = 1.0;

/// Largest accepted `JumbleSettings::events_per_dab`
pub const MAX_JUMBLE_EVENTS_PER_DAB: u32 = 65_536;

/// Painting strategy selected by the tool layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    Brush,
    Eraser,
    Replacer,
    Blur,
    Smudge,
    Jumble,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Replacer,
        ToolKind::Blur,
        ToolKind::Smudge,
        ToolKind::Jumble,
    ];

    /// Human readable name, used as the default undo description
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Replacer => "Replace Color",
            ToolKind::Blur => "Blur",
            ToolKind::Smudge => "Smudge",
            ToolKind::Jumble => "Jumble",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplacerSettings {
    /// Replace matching RGB regardless of the pixel's alpha
    pub ignore_alpha: bool,
}

/// How smudge results reach the visible buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmudgeMode {
    /// Write the blended logical color directly
    #[default]
    Soft,
    /// Snap to the nearer of source/destination colors, binarize alpha
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmudgeSettings {
    /// Blend strength (0.0 - 1.0)
    pub strength: f32,
    /// Exponent of the radial falloff; higher values concentrate the smear in the center
    pub gamma: f32,
    pub mode: SmudgeMode,
    /// Resolve empty source/destination pixels instead of blending through them
    pub blend_transparency: bool,
    /// Moves shorter than this (pixels) are dropped
    pub min_move_distance: f32,
    /// Hard mode: how much closer the source color must be before it replaces the destination
    pub hard_tolerance: f32,
    /// Hard mode: logical alpha at or above this becomes fully opaque
    pub hard_alpha_threshold: f32,
}

impl Default for SmudgeSettings {
    fn default() -> Self {
        Self {
            strength: 0.5,
            gamma: 1.0,
            mode: SmudgeMode::Soft,
            blend_transparency: true,
            min_move_distance: 0.5,
            hard_tolerance: 0.02,
            hard_alpha_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JumbleSettings {
    /// Fraction of the footprint swapped per dab (0.0 - 1.0)
    pub strength: f32,
    /// 1.0 allows swaps across the whole footprint, values near 0.0 keep swaps local
    pub locality: f32,
    /// Leave fully transparent pixels out of the swap pool
    pub skip_transparent: bool,
    /// Fixed number of swap events per dab, overrides `strength`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_per_dab: Option<u32>,
    /// RNG seed; `None` seeds from entropy on every stroke
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for JumbleSettings {
    fn default() -> Self {
        Self {
            strength: 0.5,
            locality: 0.5,
            skip_transparent: false,
            events_per_dab: None,
            seed: None,
        }
    }
}

/// Engine-wide configuration, usually loaded from the tool layer's JSON settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub line_stride: f32,
    pub replacer: ReplacerSettings,
    pub smudge: SmudgeSettings,
    pub jumble: JumbleSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_stride: DEFAULT_LINE_STRIDE,
            replacer: ReplacerSettings::default(),
            smudge: SmudgeSettings::default(),
            jumble: JumbleSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        validate_engine_config(&config)?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "smudge": { "mode": "hard" } }"#).unwrap();
        assert_eq!(config.smudge.mode, SmudgeMode::Hard);
        assert_eq!(config.smudge.strength, SmudgeSettings::default().strength);
        assert_eq!(config.line_stride, DEFAULT_LINE_STRIDE);
        assert_eq!(config.jumble, JumbleSettings::default());
    }

    #[test]
    fn test_json_roundtrip_keeps_camel_case() {
        let mut config = EngineConfig::default();
        config.jumble.events_per_dab = Some(3);
        config.replacer.ignore_alpha = true;

        let json = config.to_json().unwrap();
        assert!(json.contains("eventsPerDab"));
        assert!(json.contains("ignoreAlpha"));
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let result = EngineConfig::from_json("{ lineStride: ");
        assert!(matches!(result, Err(CoreError::Json(_))));
    }

    #[test]
    fn test_tool_labels_are_unique() {
        let mut labels: Vec<_> = ToolKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ToolKind::ALL.len());
    }
}
