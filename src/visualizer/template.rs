use crate::config::VisualizerConfig;

/// Placeholder replaced by [`VisualizerConfig::base_visualizer_path`].
pub const BASE_VISUALIZER_PATH: &str = "{baseVisualizerPath}";
/// Placeholder replaced by [`VisualizerConfig::handing_visualizer`].
pub const HANDING_VISUALIZER: &str = "{handingVisualizer}";

/// Expand every occurrence of both placeholders in `template`.
///
/// Any other `{...}` token passes through untouched. Templates without placeholders come back
/// unchanged.
pub fn expand_template(template: &str, config: &VisualizerConfig) -> String {
    template
        .replace(BASE_VISUALIZER_PATH, &config.base_visualizer_path)
        .replace(HANDING_VISUALIZER, &config.handing_visualizer)
}

#[cfg(test)]
#[path = "../../tests/unit/visualizer/template.rs"]
mod tests;
