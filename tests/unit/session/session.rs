use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::config::{VisualizerConfig, WatermarkConfig, WatermarkPosition};
use crate::render::export::MemoryTarget;
use crate::render::surface::PixelSurface;
use crate::steps::model::{AvailableItem, OptionGroup, SelectType, VisualizerImage};
use crate::steps::source::{JsonStepSource, StaticStepSource};
use crate::steps::store::LoadStatus;

#[derive(Default)]
struct MapLoader {
    images: HashMap<String, DecodedImage>,
    calls: Cell<usize>,
}

impl MapLoader {
    fn with(mut self, url: &str, rgba: [u8; 4]) -> Self {
        self.images
            .insert(url.to_string(), DecodedImage::solid(4, 4, rgba).unwrap());
        self
    }
}

impl ImageLoader for MapLoader {
    fn load(&self, url: &str) -> impl Future<Output = PorticoResult<DecodedImage>> {
        self.calls.set(self.calls.get() + 1);
        let out = self
            .images
            .get(url)
            .cloned()
            .ok_or_else(|| PorticoError::image_load(url));
        async move { out }
    }
}

fn item(id: &str, src: &str, z: &str) -> AvailableItem {
    AvailableItem {
        id: id.to_string(),
        label: id.to_string(),
        visualizer_image: Some(VisualizerImage {
            src: src.to_string(),
        }),
        z_index: Some(z.to_string()),
        ..AvailableItem::default()
    }
}

fn door_steps() -> Vec<Step> {
    let mut style = Step::new("style", "Style");
    style.available_options = vec![OptionGroup {
        id: "slab".to_string(),
        select_type: SelectType::Radio,
        available_items: vec![
            item("oak", "{baseVisualizerPath}/oak.png", "100"),
            item("pine", "{baseVisualizerPath}/pine.png", "100"),
        ],
        ..OptionGroup::default()
    }];
    let mut hardware = Step::new("hardware", "Hardware");
    hardware.available_options = vec![OptionGroup {
        id: "handles".to_string(),
        select_type: SelectType::Checkbox,
        available_items: vec![
            item("lever", "{baseVisualizerPath}/lever-{handingVisualizer}.png", "300"),
            item("knocker", "{baseVisualizerPath}/knocker.png", "200"),
        ],
        ..OptionGroup::default()
    }];
    vec![style, hardware]
}

fn config() -> SessionConfig {
    SessionConfig {
        visualizer: VisualizerConfig {
            base_visualizer_path: "/doors".to_string(),
            handing_visualizer: "right".to_string(),
            show_watermark: true,
        },
        watermark: Some(WatermarkConfig {
            src: "/wm.png".to_string(),
            opacity: Some(0.5),
            position: WatermarkPosition::Center,
        }),
        surface: Canvas {
            width: 40,
            height: 40,
        },
    }
}

fn loader() -> MapLoader {
    MapLoader::default()
        .with("/doors/oak.png", [120, 60, 20, 255])
        .with("/doors/lever-right.png", [0, 0, 0, 255])
        .with("/wm.png", [255, 255, 255, 255])
}

fn started() -> ConfiguratorSession<MapLoader> {
    let mut session = ConfiguratorSession::new(loader());
    session
        .start(Some(config()), &StaticStepSource(door_steps()))
        .unwrap();
    session
}

#[test]
fn start_without_config_fails_and_marks_store() {
    let mut session = ConfiguratorSession::new(loader());
    let err = session
        .start(None, &StaticStepSource(door_steps()))
        .unwrap_err();
    assert!(matches!(err, PorticoError::Configuration(_)));
    assert!(!session.is_started());
    assert_eq!(session.store().status(), LoadStatus::Failed);
    assert!(session.store().error().is_some());
    assert!(session.store().steps().is_empty());
}

#[test]
fn start_with_unreadable_source_fails() {
    let mut session = ConfiguratorSession::new(loader());
    let src = JsonStepSource::new("/definitely/not/here/steps.json");
    assert!(session.start(Some(config()), &src).is_err());
    assert_eq!(session.store().status(), LoadStatus::Failed);
}

#[test]
fn start_installs_steps_in_initial_state() {
    let session = started();
    assert!(session.is_started());
    assert_eq!(session.store().status(), LoadStatus::Idle);
    let nav = session.navigation();
    assert_eq!(nav.active_index, Some(0));
    assert!(!nav.all_steps_completed);
    assert_eq!(session.visualizer().config().surface.width, 40);
}

#[test]
fn refresh_tracks_partial_failure() {
    let mut session = started();
    let store = session.store_mut();
    store.select_item("slab", "oak").unwrap();
    store.mark_completed();
    store.advance();
    store.select_item("handles", "lever").unwrap();
    store.select_item("handles", "knocker").unwrap();

    let state = pollster::block_on(session.refresh_visualizer());
    assert_eq!(
        state,
        VisualizerState {
            is_loading: false,
            has_errors: true,
            has_content: true,
            loaded_layers: 2,
        }
    );
    let vis = session.visualizer();
    let ids: Vec<&str> = vis.canvas_layers().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["oak", "lever"]);
    assert_eq!(vis.errors().len(), 1);
    assert_eq!(vis.errors()[0].layer_id, "knocker");
    assert_eq!(
        vis.errors()[0].error,
        "Failed to load image: /doors/knocker.png"
    );
}

#[test]
fn derive_alone_reports_loading() {
    let mut session = started();
    session.store_mut().select_item("slab", "oak").unwrap();
    let steps = session.store().steps().to_vec();
    let vis = session.visualizer_mut();
    vis.derive(&steps);
    assert!(vis.state().is_loading);
    pollster::block_on(vis.acquire());
    assert!(!vis.state().is_loading);
    assert_eq!(vis.state().loaded_layers, 1);
}

#[test]
fn render_then_empty_selection_clears_surface() {
    let mut session = started();
    session.store_mut().select_item("slab", "oak").unwrap();
    pollster::block_on(session.refresh_visualizer());

    let mut surface = PixelSurface::new(Canvas {
        width: 40,
        height: 40,
    })
    .unwrap();
    let report = pollster::block_on(session.visualizer_mut().render(&mut surface));
    assert_eq!(report.layers_drawn, 1);
    assert!(report.watermark_drawn);
    assert!(surface.rgba8_premul().iter().any(|&b| b != 0));

    session.store_mut().deselect_item("slab", "oak");
    let state = pollster::block_on(session.refresh_visualizer());
    assert!(!state.has_content);
    let report = pollster::block_on(session.visualizer_mut().render(&mut surface));
    assert_eq!(report, RenderReport::default());
    assert!(surface.rgba8_premul().iter().all(|&b| b == 0));
}

#[test]
fn export_skips_watermark_and_matches_surface_size() {
    let mut session = started();
    session.store_mut().select_item("slab", "oak").unwrap();
    pollster::block_on(session.refresh_visualizer());

    let surface = PixelSurface::new(Canvas {
        width: 20,
        height: 10,
    })
    .unwrap();
    let mut target = MemoryTarget::new();
    let out = session
        .visualizer()
        .export(&surface, None, &mut target)
        .unwrap();
    assert!(matches!(out, ExportOutcome::Delivered { width: 20, height: 10, .. }));

    let img = image::load_from_memory(&target.delivered()[0].1.bytes)
        .unwrap()
        .to_rgba8();
    // The watermark would be white at the center; the export shows the slab colour.
    let px = img.get_pixel(10, 5).0;
    assert!(px[0].abs_diff(120) <= 2 && px[2].abs_diff(20) <= 2);
}

#[test]
fn export_falls_back_to_configured_size_for_unsized_surface() {
    let mut session = started();
    session.store_mut().select_item("slab", "oak").unwrap();
    pollster::block_on(session.refresh_visualizer());

    let surface = PixelSurface::unsized_with_layout(Canvas::zero());
    let mut target = MemoryTarget::new();
    let out = session
        .visualizer()
        .export(&surface, Some("door.png"), &mut target)
        .unwrap();
    assert!(matches!(out, ExportOutcome::Delivered { width: 40, height: 40, .. }));
    assert_eq!(target.delivered()[0].0, "door.png");
}

#[test]
fn teardown_drops_cached_bitmaps() {
    let mut session = started();
    session.store_mut().select_item("slab", "oak").unwrap();
    pollster::block_on(session.refresh_visualizer());
    pollster::block_on(session.refresh_visualizer());
    assert_eq!(session.visualizer().loader().calls.get(), 1);

    session.visualizer_mut().teardown();
    assert!(session.visualizer().layers().is_empty());
    pollster::block_on(session.refresh_visualizer());
    assert_eq!(session.visualizer().loader().calls.get(), 2);
}

#[test]
fn finalize_passes_through_store_gate() {
    let mut session = started();
    let mut fired = 0;
    assert!(!session.finalize(|| fired += 1));

    let store = session.store_mut();
    store.mark_completed();
    store.advance();
    store.mark_completed();
    assert!(session.finalize(|| fired += 1));
    assert_eq!(fired, 1);
}

#[test]
fn debug_info_reports_templates() {
    let mut session = started();
    session.store_mut().select_item("slab", "pine").unwrap();
    let info = session
        .visualizer()
        .debug_info(session.store().steps());
    assert_eq!(info.total_selected_options, 1);
    assert_eq!(info.layers[0].transformed_url, "/doors/pine.png");
    assert_eq!(
        info.layers[0].original_url.as_deref(),
        Some("{baseVisualizerPath}/pine.png")
    );
}
