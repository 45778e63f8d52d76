use crate::config::VisualizerConfig;
use crate::steps::model::{AvailableItem, Step};
use crate::visualizer::template::expand_template;

/// One image in the composite preview, derived from a selected item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerLayer {
    /// Id of the originating item; also the bitmap cache key.
    pub id: String,
    /// Fully expanded image URL, never empty.
    pub image_url: String,
    /// Stacking order, lower draws first.
    pub z_index: i64,
    /// Set by acquisition once a bitmap is available.
    pub is_loaded: bool,
    /// Set by acquisition when the last load attempt failed.
    pub has_error: bool,
}

/// Parse a delivered zIndex, falling back to 0 when absent, blank or not an integer.
pub fn parse_z_index(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            _ => {
                tracing::warn!(z_index = raw, "unparsable zIndex, defaulting to 0");
                0
            }
        },
    }
}

/// Selected items that contribute an image, in step/group/item traversal order.
pub fn selected_visual_items(steps: &[Step]) -> impl Iterator<Item = &AvailableItem> {
    steps
        .iter()
        .flat_map(|s| s.available_options.iter())
        .flat_map(|g| g.available_items.iter())
        .filter(|it| it.is_selected)
        .filter(|it| it.visualizer_src().is_some_and(|src| !src.trim().is_empty()))
}

/// Map the current selections to an ordered layer stack.
///
/// Output is sorted ascending by `z_index`; equal values keep traversal order. Load flags start
/// cleared; derivation carries no memory of earlier renders.
pub fn derive_layers(steps: &[Step], config: &VisualizerConfig) -> Vec<VisualizerLayer> {
    let mut layers: Vec<VisualizerLayer> = selected_visual_items(steps)
        .filter_map(|it| {
            let image_url = expand_template(it.visualizer_src()?, config);
            if image_url.trim().is_empty() {
                return None;
            }
            Some(VisualizerLayer {
                id: it.id.clone(),
                image_url,
                z_index: parse_z_index(it.z_index.as_deref()),
                is_loaded: false,
                has_error: false,
            })
        })
        .collect();
    layers.sort_by_key(|l| l.z_index);
    layers
}

/// Template-versus-URL view of one derived layer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDebugEntry {
    /// Layer id.
    pub id: String,
    /// Template as delivered.
    pub original_url: Option<String>,
    /// Expanded URL.
    pub transformed_url: String,
    /// Parsed stacking order.
    pub z_index: i64,
}

/// Snapshot of how selections turned into layers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerDebugInfo {
    /// Every selected item, with or without an image.
    pub total_selected_options: usize,
    /// Selected items carrying a non-empty image template.
    pub options_with_visualizer_images: usize,
    /// Configuration used for expansion.
    pub config: VisualizerConfig,
    /// One entry per derived layer.
    pub layers: Vec<LayerDebugEntry>,
}

/// Build a [`VisualizerDebugInfo`] for `steps`.
pub fn debug_info(steps: &[Step], config: &VisualizerConfig) -> VisualizerDebugInfo {
    let total_selected_options = steps.iter().flat_map(Step::selected_items).count();
    let visual: Vec<&AvailableItem> = selected_visual_items(steps).collect();
    let layers = derive_layers(steps, config)
        .into_iter()
        .map(|l| LayerDebugEntry {
            original_url: visual
                .iter()
                .find(|it| it.id == l.id)
                .and_then(|it| it.visualizer_src())
                .map(str::to_string),
            id: l.id,
            transformed_url: l.image_url,
            z_index: l.z_index,
        })
        .collect();
    VisualizerDebugInfo {
        total_selected_options,
        options_with_visualizer_images: visual.len(),
        config: config.clone(),
        layers,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visualizer/layers.rs"]
mod tests;
