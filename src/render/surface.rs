use image::imageops::{self, FilterType};

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{PorticoError, PorticoResult};
use crate::render::blend::SourceOver;

/// Raster drawing target, the subset of a 2D canvas context the compositor needs.
///
/// The host owns the surface and its placement; the compositor only clears it and draws into it.
pub trait RasterSurface {
    /// Current pixel extent.
    fn canvas(&self) -> Canvas;

    /// Change the pixel extent. Contents are discarded.
    fn resize(&mut self, canvas: Canvas) -> PorticoResult<()>;

    /// Extent the host lays the surface out at. May differ from [`Self::canvas`].
    fn layout_canvas(&self) -> Canvas;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Alpha multiplier applied to subsequent draws.
    fn global_alpha(&self) -> f32;

    /// Set the alpha multiplier for subsequent draws.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Draw `image` scaled into `dest`, source-over, at the current global alpha.
    fn draw_image(&mut self, image: &DecodedImage, dest: Rect) -> PorticoResult<()>;
}

/// CPU surface backed by a premultiplied RGBA8 buffer.
#[derive(Clone, Debug)]
pub struct PixelSurface {
    canvas: Canvas,
    layout: Canvas,
    global_alpha: f32,
    rgba8_premul: Vec<u8>,
}

impl PixelSurface {
    /// Transparent surface of the given extent, laid out at the same extent.
    pub fn new(canvas: Canvas) -> PorticoResult<Self> {
        Ok(Self {
            canvas,
            layout: canvas,
            global_alpha: 1.0,
            rgba8_premul: vec![0; canvas.byte_len()?],
        })
    }

    /// Zero-extent surface that the host lays out at `layout`.
    pub fn unsized_with_layout(layout: Canvas) -> Self {
        Self {
            canvas: Canvas::zero(),
            layout,
            global_alpha: 1.0,
            rgba8_premul: Vec::new(),
        }
    }

    /// Premultiplied pixels, row-major.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Pixel at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

impl RasterSurface for PixelSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn resize(&mut self, canvas: Canvas) -> PorticoResult<()> {
        self.rgba8_premul = vec![0; canvas.byte_len()?];
        self.canvas = canvas;
        Ok(())
    }

    fn layout_canvas(&self) -> Canvas {
        self.layout
    }

    fn clear(&mut self) {
        self.rgba8_premul.fill(0);
    }

    fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    fn draw_image(&mut self, image: &DecodedImage, dest: Rect) -> PorticoResult<()> {
        if image.is_empty() || self.canvas.is_empty() {
            return Ok(());
        }
        let dw = dest.width().round();
        let dh = dest.height().round();
        if !(dw >= 1.0 && dh >= 1.0) {
            return Ok(());
        }
        let (dw, dh) = (dw as u32, dh as u32);

        let src = image::RgbaImage::from_raw(
            image.width,
            image.height,
            image.rgba8_premul.as_ref().clone(),
        )
        .ok_or_else(|| PorticoError::validation("image buffer does not match its dimensions"))?;
        // Filtering premultiplied pixels keeps transparent edges from bleeding colour.
        let scaled = if (dw, dh) == (image.width, image.height) {
            src
        } else {
            imageops::resize(&src, dw, dh, FilterType::Triangle)
        };

        let x0 = dest.x0.round() as i64;
        let y0 = dest.y0.round() as i64;
        let cw = i64::from(self.canvas.width);
        let ch = i64::from(self.canvas.height);

        let col_start = (-x0).max(0);
        let col_end = (cw - x0).min(i64::from(dw));
        if col_start >= col_end {
            return Ok(());
        }

        let blend = SourceOver::new(self.global_alpha);
        if blend.is_noop() {
            return Ok(());
        }
        let stride_dst = self.canvas.width as usize * 4;
        let stride_src = dw as usize * 4;
        let src_px = scaled.as_raw();
        for row in 0..i64::from(dh) {
            let y = y0 + row;
            if y < 0 || y >= ch {
                continue;
            }
            let d = y as usize * stride_dst + (x0 + col_start) as usize * 4;
            let s = row as usize * stride_src + col_start as usize * 4;
            let n = (col_end - col_start) as usize * 4;
            blend.row(&mut self.rgba8_premul[d..d + n], &src_px[s..s + n])?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
