use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::cache::CanvasImageLayer;
use crate::assets::decode::unpremultiply_rgba8;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PorticoError, PorticoResult};
use crate::render::compositor::draw_layers;
use crate::render::surface::{PixelSurface, RasterSurface};

/// File name used when the caller does not supply one.
pub const DEFAULT_EXPORT_FILENAME: &str = "product-visualization.png";

/// MIME type of every exported artifact.
pub const EXPORT_MIME: &str = "image/png";

/// Encoded export artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportBlob {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// MIME type of `bytes`.
    pub mime: &'static str,
}

/// Destination for exported artifacts.
pub trait DownloadTarget {
    /// Hand `blob` to the user under `filename`.
    fn deliver(&mut self, filename: &str, blob: &ExportBlob) -> PorticoResult<()>;
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    /// Delivered `(filename, blob)` pairs in delivery order.
    pub(crate) delivered: Vec<(String, ExportBlob)>,
}

impl MemoryTarget {
    /// Empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow everything delivered so far.
    pub fn delivered(&self) -> &[(String, ExportBlob)] {
        &self.delivered
    }
}

impl DownloadTarget for MemoryTarget {
    fn deliver(&mut self, filename: &str, blob: &ExportBlob) -> PorticoResult<()> {
        self.delivered.push((filename.to_string(), blob.clone()));
        Ok(())
    }
}

/// Writes artifacts into a directory.
///
/// Bytes are first written to a staging file next to the destination and then renamed into
/// place. The staging file is removed whether or not the rename succeeds.
#[derive(Clone, Debug)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    /// Target writing into `dir`, created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryTarget {
    fn deliver(&mut self, filename: &str, blob: &ExportBlob) -> PorticoResult<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(PorticoError::export(format!(
                "export filename must be a plain file name: '{filename}'"
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export directory '{}'", self.dir.display()))?;

        let staged = StagedFile::new(&self.dir, filename);
        std::fs::write(&staged.path, &blob.bytes)
            .with_context(|| format!("write staging file '{}'", staged.path.display()))?;

        let dest = self.dir.join(filename);
        std::fs::rename(&staged.path, &dest)
            .with_context(|| format!("move export into '{}'", dest.display()))?;
        tracing::info!(path = %dest.display(), bytes = blob.bytes.len(), "export delivered");
        Ok(())
    }
}

struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    fn new(dir: &Path, filename: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let name = format!(".{filename}.{}.{nanos}.part", std::process::id());
        Self {
            path: dir.join(name),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staging file");
        }
    }
}

/// Outcome of [`Exporter::export`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing was ready to export; no artifact was produced.
    Skipped,
    /// An artifact was delivered.
    Delivered {
        /// Name it was delivered under.
        filename: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Encoded size.
        bytes: usize,
    },
}

/// Re-composites product layers off-screen, without the watermark, and delivers a PNG.
#[derive(Clone, Debug)]
pub struct Exporter {
    default_filename: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

impl Exporter {
    /// Exporter using [`DEFAULT_EXPORT_FILENAME`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the file name used when none is passed to [`Exporter::export`].
    pub fn with_default_filename(mut self, filename: impl Into<String>) -> Self {
        self.default_filename = filename.into();
        self
    }

    /// Draw `layers` onto `surface` exactly as the preview does, minus the watermark.
    pub fn composite<S: RasterSurface + ?Sized>(
        surface: &mut S,
        layers: &[CanvasImageLayer],
    ) -> usize {
        surface.clear();
        draw_layers(surface, layers)
    }

    /// Composite `layers` onto a fresh `canvas`-sized surface and encode it.
    pub fn render_blob(canvas: Canvas, layers: &[CanvasImageLayer]) -> PorticoResult<ExportBlob> {
        let mut surface = PixelSurface::new(canvas)?;
        Self::composite(&mut surface, layers);
        encode_png(&surface)
    }

    /// Export `layers` at `canvas` size to `target`.
    ///
    /// Returns [`ExportOutcome::Skipped`] when `layers` is empty.
    pub fn export<T: DownloadTarget + ?Sized>(
        &self,
        canvas: Canvas,
        layers: &[CanvasImageLayer],
        filename: Option<&str>,
        target: &mut T,
    ) -> PorticoResult<ExportOutcome> {
        if layers.is_empty() {
            tracing::debug!("nothing to export");
            return Ok(ExportOutcome::Skipped);
        }
        let blob = Self::render_blob(canvas, layers)?;
        let filename = filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&self.default_filename);
        target.deliver(filename, &blob)?;
        Ok(ExportOutcome::Delivered {
            filename: filename.to_string(),
            width: blob.width,
            height: blob.height,
            bytes: blob.bytes.len(),
        })
    }
}

/// Encode a surface as PNG, converting back to straight alpha.
pub fn encode_png(surface: &PixelSurface) -> PorticoResult<ExportBlob> {
    let canvas = surface.canvas();
    let straight = unpremultiply_rgba8(surface.rgba8_premul());
    let img = image::RgbaImage::from_raw(canvas.width, canvas.height, straight)
        .ok_or_else(|| PorticoError::export("surface buffer does not match its extent"))?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| PorticoError::export(format!("encode png: {e}")))?;
    Ok(ExportBlob {
        bytes,
        width: canvas.width,
        height: canvas.height,
        mime: EXPORT_MIME,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
