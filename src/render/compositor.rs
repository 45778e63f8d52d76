use std::collections::HashMap;

use crate::assets::cache::CanvasImageLayer;
use crate::assets::decode::DecodedImage;
use crate::assets::loader::ImageLoader;
use crate::config::{WatermarkConfig, WatermarkPosition};
use crate::foundation::core::{Canvas, Rect};
use crate::render::surface::RasterSurface;

/// Margin between a corner-anchored watermark and the surface edges.
pub const WATERMARK_MARGIN: f64 = 20.0;

/// Watermark's larger side as a fraction of the surface's smaller side.
pub const WATERMARK_SCALE: f64 = 0.3;

/// Extent used when neither the surface nor its layout has one.
pub const FALLBACK_CANVAS: Canvas = Canvas {
    width: 400,
    height: 400,
};

/// Rectangle that fits an `image_w x image_h` image inside `canvas`, aspect preserved and
/// centered. `None` for zero-sized inputs.
pub fn fit_rect(canvas: Canvas, image_w: u32, image_h: u32) -> Option<Rect> {
    if canvas.is_empty() || image_w == 0 || image_h == 0 {
        return None;
    }
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (iw, ih) = (f64::from(image_w), f64::from(image_h));
    let scale = (cw / iw).min(ch / ih);
    let (w, h) = (iw * scale, ih * scale);
    let x = (cw - w) / 2.0;
    let y = (ch - h) / 2.0;
    Some(Rect::new(x, y, x + w, y + h))
}

/// Rectangle for a watermark of `image_w x image_h` anchored at `position`.
pub fn watermark_rect(
    canvas: Canvas,
    image_w: u32,
    image_h: u32,
    position: WatermarkPosition,
) -> Option<Rect> {
    if canvas.is_empty() || image_w == 0 || image_h == 0 {
        return None;
    }
    let size = canvas.min_side() * WATERMARK_SCALE;
    let aspect = f64::from(image_w) / f64::from(image_h);
    let (w, h) = if aspect >= 1.0 {
        (size, size / aspect)
    } else {
        (size * aspect, size)
    };
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (x, y) = match position {
        WatermarkPosition::TopLeft => (WATERMARK_MARGIN, WATERMARK_MARGIN),
        WatermarkPosition::TopRight => (cw - w - WATERMARK_MARGIN, WATERMARK_MARGIN),
        WatermarkPosition::BottomLeft => (WATERMARK_MARGIN, ch - h - WATERMARK_MARGIN),
        WatermarkPosition::BottomRight => {
            (cw - w - WATERMARK_MARGIN, ch - h - WATERMARK_MARGIN)
        }
        WatermarkPosition::Center => ((cw - w) / 2.0, (ch - h) / 2.0),
    };
    Some(Rect::new(x, y, x + w, y + h))
}

/// Draw `layers` in order, each fitted and centered. Returns how many were drawn.
///
/// A layer that cannot be drawn is logged and skipped.
pub fn draw_layers<S: RasterSurface + ?Sized>(
    surface: &mut S,
    layers: &[CanvasImageLayer],
) -> usize {
    let canvas = surface.canvas();
    let mut drawn = 0;
    for layer in layers {
        let Some(dest) = fit_rect(canvas, layer.image.width, layer.image.height) else {
            tracing::warn!(layer = %layer.id, "skipping layer with empty extent");
            continue;
        };
        match surface.draw_image(&layer.image, dest) {
            Ok(()) => drawn += 1,
            Err(e) => tracing::warn!(layer = %layer.id, error = %e, "error drawing layer"),
        }
    }
    drawn
}

/// Outcome of one [`Compositor::render`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Product layers drawn.
    pub layers_drawn: usize,
    /// Whether the watermark made it onto the surface.
    pub watermark_drawn: bool,
}

/// Paints acquired layers, then the watermark, onto a host-owned surface.
///
/// Holds the watermark bitmap cache and whether the one-time sizing fallback has run.
#[derive(Debug, Default)]
pub struct Compositor {
    watermarks: HashMap<String, DecodedImage>,
    sized_from_layout: bool,
}

impl Compositor {
    /// Fresh compositor with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the whole surface.
    pub fn clear<S: RasterSurface + ?Sized>(surface: &mut S) {
        surface.clear();
    }

    /// Drop cached watermark bitmaps and re-arm the sizing fallback.
    pub fn reset(&mut self) {
        self.watermarks.clear();
        self.sized_from_layout = false;
    }

    /// Clear `surface` and draw `layers` (already in ascending z order), then the watermark when
    /// `show_watermark` is set and a config is given.
    ///
    /// Watermark load failures are logged and never fail the render.
    pub async fn render<S, L>(
        &mut self,
        surface: &mut S,
        layers: &[CanvasImageLayer],
        watermark: Option<&WatermarkConfig>,
        show_watermark: bool,
        loader: &L,
    ) -> RenderReport
    where
        S: RasterSurface + ?Sized,
        L: ImageLoader,
    {
        surface.clear();
        self.ensure_sized(surface);

        let layers_drawn = draw_layers(surface, layers);

        let mut watermark_drawn = false;
        if show_watermark
            && let Some(cfg) = watermark
            && !cfg.src.trim().is_empty()
        {
            match self.watermark_image(&cfg.src, loader).await {
                Some(img) => watermark_drawn = draw_watermark(surface, &img, cfg),
                None => tracing::warn!(src = %cfg.src, "failed to load watermark"),
            }
        }

        RenderReport {
            layers_drawn,
            watermark_drawn,
        }
    }

    fn ensure_sized<S: RasterSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.sized_from_layout || !surface.canvas().is_empty() {
            return;
        }
        self.sized_from_layout = true;
        let layout = surface.layout_canvas();
        let target = Canvas {
            width: if layout.width == 0 {
                FALLBACK_CANVAS.width
            } else {
                layout.width
            },
            height: if layout.height == 0 {
                FALLBACK_CANVAS.height
            } else {
                layout.height
            },
        };
        if let Err(e) = surface.resize(target) {
            tracing::warn!(error = %e, "could not size surface from layout");
        }
    }

    async fn watermark_image<L: ImageLoader>(
        &mut self,
        src: &str,
        loader: &L,
    ) -> Option<DecodedImage> {
        if let Some(img) = self.watermarks.get(src) {
            return Some(img.clone());
        }
        match loader.load(src).await {
            Ok(img) => {
                self.watermarks.insert(src.to_string(), img.clone());
                Some(img)
            }
            Err(e) => {
                tracing::debug!(src, error = %e, "watermark load error");
                None
            }
        }
    }
}

fn draw_watermark<S: RasterSurface + ?Sized>(
    surface: &mut S,
    img: &DecodedImage,
    cfg: &WatermarkConfig,
) -> bool {
    let Some(dest) = watermark_rect(surface.canvas(), img.width, img.height, cfg.position) else {
        return false;
    };
    let prev_alpha = surface.global_alpha();
    surface.set_global_alpha(cfg.effective_opacity());
    let drawn = surface.draw_image(img, dest);
    surface.set_global_alpha(prev_alpha);
    match drawn {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "error drawing watermark");
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
