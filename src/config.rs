use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PorticoError, PorticoResult};

/// Watermark opacity used when a configuration does not specify one.
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.3;

/// Watermark image used when a configuration does not specify one.
pub const DEFAULT_WATERMARK_SRC: &str = "/assets/watermark.png";

/// Per-product visualizer configuration.
///
/// Resolved once per product session and treated as immutable input to layer derivation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualizerConfig {
    /// Substituted for `{baseVisualizerPath}` in image templates.
    pub base_visualizer_path: String,
    /// Substituted for `{handingVisualizer}` in image templates (e.g. `left`, `right`).
    pub handing_visualizer: String,
    /// Whether on-screen renders overlay the watermark.
    pub show_watermark: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            base_visualizer_path: "/single-wood-doors".to_string(),
            handing_visualizer: "left".to_string(),
            show_watermark: true,
        }
    }
}

/// Anchor for the watermark overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    /// 20px from the top and left edges.
    TopLeft,
    /// 20px from the top and right edges.
    TopRight,
    /// 20px from the bottom and left edges.
    BottomLeft,
    /// 20px from the bottom and right edges.
    BottomRight,
    /// Centered on the surface.
    #[default]
    Center,
}

/// Translucent overlay drawn on on-screen renders only.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkConfig {
    /// Image location, resolved by the same loader as layer images.
    pub src: String,
    /// Alpha in `[0, 1]`; `None` means [`DEFAULT_WATERMARK_OPACITY`].
    pub opacity: Option<f32>,
    /// Anchor position.
    pub position: WatermarkPosition,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            src: DEFAULT_WATERMARK_SRC.to_string(),
            opacity: None,
            position: WatermarkPosition::Center,
        }
    }
}

impl WatermarkConfig {
    /// Effective alpha, clamped into `[0, 1]`.
    pub fn effective_opacity(&self) -> f32 {
        let o = self.opacity.unwrap_or(DEFAULT_WATERMARK_OPACITY);
        if o.is_finite() {
            o.clamp(0.0, 1.0)
        } else {
            DEFAULT_WATERMARK_OPACITY
        }
    }
}

/// Everything a configurator session needs beyond the step definitions.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Template substitution values and watermark toggle.
    pub visualizer: VisualizerConfig,
    /// Watermark overlay; `None` disables it regardless of `show_watermark`.
    pub watermark: Option<WatermarkConfig>,
    /// On-screen surface extent.
    pub surface: Canvas,
}

impl SessionConfig {
    /// Read a session configuration from a JSON file.
    ///
    /// A missing or unreadable file is a configuration error, not an IO error: sessions cannot
    /// start without it.
    pub fn from_json_file(path: impl AsRef<Path>) -> PorticoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open session config '{}'", path.display()))
            .map_err(|e| PorticoError::configuration(format!("{e:#}")))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| PorticoError::configuration(format!("parse session config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that cannot drive a visualizer.
    pub fn validate(&self) -> PorticoResult<()> {
        if self.surface.is_empty() {
            return Err(PorticoError::configuration(
                "surface width and height must be > 0",
            ));
        }
        Canvas::new(self.surface.width, self.surface.height)?;
        if let Some(wm) = &self.watermark
            && let Some(o) = wm.opacity
            && !(0.0..=1.0).contains(&o)
        {
            return Err(PorticoError::configuration(
                "watermark opacity must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
