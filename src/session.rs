use crate::assets::cache::{CanvasImageLayer, ImageCache, LayerError};
use crate::assets::loader::ImageLoader;
use crate::config::SessionConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PorticoError, PorticoResult};
use crate::render::compositor::{Compositor, RenderReport};
use crate::render::export::{DownloadTarget, ExportOutcome, Exporter};
use crate::render::surface::RasterSurface;
use crate::steps::model::Step;
use crate::steps::navigation::StepNavigation;
use crate::steps::source::StepSource;
use crate::steps::store::SelectionStore;
use crate::visualizer::layers::{VisualizerDebugInfo, VisualizerLayer, debug_info, derive_layers};

/// Aggregate load state of the current layer stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerState {
    /// Some derived layer is neither loaded nor failed.
    pub is_loading: bool,
    /// Some derived layer failed its last load.
    pub has_errors: bool,
    /// At least one layer was derived.
    pub has_content: bool,
    /// Layers loaded without error.
    pub loaded_layers: usize,
}

/// Layer pipeline for one product preview: derive, acquire, render, export.
///
/// Owns the bitmap cache for the lifetime of the session. Calls take `&mut self`, so a newer
/// derivation can never interleave with an older acquisition.
#[derive(Debug)]
pub struct ProductVisualizer<L> {
    config: SessionConfig,
    loader: L,
    cache: ImageCache,
    compositor: Compositor,
    exporter: Exporter,
    layers: Vec<VisualizerLayer>,
    canvas_layers: Vec<CanvasImageLayer>,
}

impl<L: ImageLoader> ProductVisualizer<L> {
    /// Visualizer with empty caches.
    pub fn new(config: SessionConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            cache: ImageCache::new(),
            compositor: Compositor::new(),
            exporter: Exporter::new(),
            layers: Vec::new(),
            canvas_layers: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Swap the configuration. Caches are kept; call [`Self::teardown`] to drop them.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Loader used for layers and the watermark.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Use `exporter` for [`Self::export`].
    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Last derived layers, annotated after acquisition.
    pub fn layers(&self) -> &[VisualizerLayer] {
        &self.layers
    }

    /// Layers ready to draw, ascending by z.
    pub fn canvas_layers(&self) -> &[CanvasImageLayer] {
        &self.canvas_layers
    }

    /// Per-layer load errors.
    pub fn errors(&self) -> &[LayerError] {
        self.cache.errors()
    }

    /// Re-derive the layer stack from `steps`.
    ///
    /// Ready layers from the previous acquisition stay drawable until [`Self::acquire`] runs.
    #[tracing::instrument(skip_all, fields(steps = steps.len()))]
    pub fn derive(&mut self, steps: &[Step]) -> &[VisualizerLayer] {
        self.layers = derive_layers(steps, &self.config.visualizer);
        tracing::debug!(layers = self.layers.len(), "derived layers");
        &self.layers
    }

    /// Resolve bitmaps for the current layers and refresh their load flags.
    #[tracing::instrument(skip_all, fields(layers = self.layers.len()))]
    pub async fn acquire(&mut self) -> &[CanvasImageLayer] {
        self.canvas_layers = self.cache.acquire_all(&self.layers, &self.loader).await;
        self.cache.annotate(&mut self.layers);
        &self.canvas_layers
    }

    /// [`Self::derive`] then [`Self::acquire`].
    pub async fn refresh(&mut self, steps: &[Step]) -> VisualizerState {
        self.derive(steps);
        self.acquire().await;
        self.state()
    }

    /// Load state derived from the current layers.
    pub fn state(&self) -> VisualizerState {
        VisualizerState {
            is_loading: self.layers.iter().any(|l| !l.is_loaded && !l.has_error),
            has_errors: self.layers.iter().any(|l| l.has_error),
            has_content: !self.layers.is_empty(),
            loaded_layers: self
                .layers
                .iter()
                .filter(|l| l.is_loaded && !l.has_error)
                .count(),
        }
    }

    /// Paint the ready layers and the watermark onto `surface`, or just clear it when nothing is
    /// ready.
    #[tracing::instrument(skip_all, fields(layers = self.canvas_layers.len()))]
    pub async fn render<S: RasterSurface + ?Sized>(&mut self, surface: &mut S) -> RenderReport {
        if self.canvas_layers.is_empty() {
            Compositor::clear(surface);
            return RenderReport::default();
        }
        self.compositor
            .render(
                surface,
                &self.canvas_layers,
                self.config.watermark.as_ref(),
                self.config.visualizer.show_watermark,
                &self.loader,
            )
            .await
    }

    /// Clear `surface`.
    pub fn clear<S: RasterSurface + ?Sized>(&self, surface: &mut S) {
        Compositor::clear(surface);
    }

    /// Export the ready layers at the on-screen surface size, without the watermark.
    ///
    /// Falls back to the configured surface size while `surface` has no extent. Failures leave
    /// the preview state untouched.
    pub fn export<S, T>(
        &self,
        surface: &S,
        filename: Option<&str>,
        target: &mut T,
    ) -> PorticoResult<ExportOutcome>
    where
        S: RasterSurface + ?Sized,
        T: DownloadTarget + ?Sized,
    {
        self.exporter.export(
            self.export_canvas(surface.canvas()),
            &self.canvas_layers,
            filename,
            target,
        )
    }

    fn export_canvas(&self, on_screen: Canvas) -> Canvas {
        if on_screen.is_empty() {
            self.config.surface
        } else {
            on_screen
        }
    }

    /// How selections in `steps` map to layers.
    pub fn debug_info(&self, steps: &[Step]) -> VisualizerDebugInfo {
        debug_info(steps, &self.config.visualizer)
    }

    /// Drop every cache and derived layer.
    pub fn teardown(&mut self) {
        self.cache.clear();
        self.compositor.reset();
        self.layers.clear();
        self.canvas_layers.clear();
    }
}

/// A configurator run: the selection store plus the visualizer it feeds.
#[derive(Debug)]
pub struct ConfiguratorSession<L> {
    store: SelectionStore,
    visualizer: ProductVisualizer<L>,
    started: bool,
}

impl<L: ImageLoader> ConfiguratorSession<L> {
    /// Unstarted session with default configuration.
    pub fn new(loader: L) -> Self {
        Self {
            store: SelectionStore::new(),
            visualizer: ProductVisualizer::new(SessionConfig::default(), loader),
            started: false,
        }
    }

    /// Load steps from `source` and install `config`.
    ///
    /// A missing or invalid configuration is fatal: the store is marked failed and nothing else
    /// changes.
    pub fn start<Src: StepSource + ?Sized>(
        &mut self,
        config: Option<SessionConfig>,
        source: &Src,
    ) -> PorticoResult<()> {
        self.store.set_loading();
        let result = config
            .ok_or_else(|| PorticoError::configuration("session configuration is required"))
            .and_then(|cfg| {
                cfg.validate()?;
                Ok(cfg)
            })
            .and_then(|cfg| Ok((cfg, source.fetch_steps()?)));
        let (config, steps) = match result {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "session start failed");
                self.store.set_failed(&e);
                return Err(e);
            }
        };

        tracing::info!(steps = steps.len(), "session started");
        self.store.replace_steps(steps);
        self.visualizer.set_config(config);
        self.visualizer.teardown();
        self.started = true;
        Ok(())
    }

    /// Whether [`Self::start`] has succeeded.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Selection store.
    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Mutable selection store.
    pub fn store_mut(&mut self) -> &mut SelectionStore {
        &mut self.store
    }

    /// Visualizer.
    pub fn visualizer(&self) -> &ProductVisualizer<L> {
        &self.visualizer
    }

    /// Mutable visualizer.
    pub fn visualizer_mut(&mut self) -> &mut ProductVisualizer<L> {
        &mut self.visualizer
    }

    /// Navigation state for the current steps.
    pub fn navigation(&self) -> StepNavigation<'_> {
        self.store.navigation()
    }

    /// Re-derive and acquire layers from the store's current selections.
    pub async fn refresh_visualizer(&mut self) -> VisualizerState {
        self.visualizer.refresh(self.store.steps()).await
    }

    /// Run `on_finalize` if every step is completed. Returns whether it ran.
    pub fn finalize<F: FnOnce()>(&self, on_finalize: F) -> bool {
        self.store.finalize(on_finalize)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
