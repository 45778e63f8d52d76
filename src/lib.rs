//! Portico is the engine behind a multi-step product configurator with a layered image preview.
//!
//! A configurator walks the user through an ordered list of steps, each offering option groups.
//! The selections drive a composite preview built from transparent image layers.
//!
//! # Pipeline overview
//!
//! 1. **Select**: [`SelectionStore`] owns the steps, the selections and the active/completed
//!    flags; [`resolve_navigation`] derives what the UI may do next.
//! 2. **Derive**: [`derive_layers`] maps selected items to a z-ordered [`VisualizerLayer`] stack,
//!    expanding URL templates with [`expand_template`].
//! 3. **Acquire**: [`ImageCache`] resolves bitmaps concurrently through an [`ImageLoader`],
//!    caching by layer id and recording per-layer failures without aborting the rest.
//! 4. **Composite**: [`Compositor`] paints ready layers onto a [`RasterSurface`], then the
//!    translucent watermark.
//! 5. **Export**: [`Exporter`] repaints the product layers (never the watermark) off-screen and
//!    delivers a PNG to a [`DownloadTarget`].
//!
//! [`ConfiguratorSession`] and [`ProductVisualizer`] tie the stages together.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No executor**: async entry points return plain futures; drive them with any executor.
//! - **Premultiplied RGBA8** end-to-end; export converts back to straight alpha.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod render;
mod session;
mod steps;
mod visualizer;

pub use assets::cache::{CanvasImageLayer, ImageCache, LayerError};
pub use assets::decode::{DecodedImage, decode_image};
pub use assets::loader::{FsImageLoader, ImageLoader, normalize_url_path};
pub use config::{
    DEFAULT_WATERMARK_OPACITY, DEFAULT_WATERMARK_SRC, SessionConfig, VisualizerConfig,
    WatermarkConfig, WatermarkPosition,
};
pub use foundation::core::{Canvas, Rect};
pub use foundation::error::{PorticoError, PorticoResult};
pub use render::compositor::{
    Compositor, FALLBACK_CANVAS, RenderReport, WATERMARK_MARGIN, WATERMARK_SCALE, draw_layers,
    fit_rect, watermark_rect,
};
pub use render::export::{
    DEFAULT_EXPORT_FILENAME, DirectoryTarget, DownloadTarget, EXPORT_MIME, ExportBlob,
    ExportOutcome, Exporter, MemoryTarget, encode_png,
};
pub use render::surface::{PixelSurface, RasterSurface};
pub use session::{ConfiguratorSession, ProductVisualizer, VisualizerState};
pub use steps::model::{AvailableItem, OptionGroup, SelectType, Step, Tag, VisualizerImage};
pub use steps::navigation::{
    BACK_LABEL, NavigationStep, StepNavigation, StepValidity, active_index, resolve_navigation,
};
pub use steps::source::{JsonStepSource, StaticStepSource, StepSource, validate_steps};
pub use steps::store::{LoadStatus, SelectionStore};
pub use visualizer::layers::{
    LayerDebugEntry, VisualizerDebugInfo, VisualizerLayer, debug_info, derive_layers,
    parse_z_index, selected_visual_items,
};
pub use visualizer::template::{BASE_VISUALIZER_PATH, HANDING_VISUALIZER, expand_template};
