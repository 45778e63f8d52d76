use std::collections::HashMap;

use futures::future::join_all;

use crate::assets::decode::DecodedImage;
use crate::assets::loader::ImageLoader;
use crate::foundation::error::{PorticoError, PorticoResult};
use crate::visualizer::layers::VisualizerLayer;

/// A layer whose bitmap is ready to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasImageLayer {
    /// Id of the originating layer.
    pub id: String,
    /// Decoded pixels.
    pub image: DecodedImage,
    /// Stacking order.
    pub z_index: i64,
}

/// Latest load failure for one layer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerError {
    /// Failing layer id.
    pub layer_id: String,
    /// `Failed to load image: <url>`.
    pub error: String,
}

/// Bitmap cache keyed by layer id, plus the per-layer error list.
///
/// Entries are only ever added; a session keeps them until [`ImageCache::clear`]. Two layers
/// sharing an id share a bitmap, so ids must track image content.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: HashMap<String, DecodedImage>,
    errors: Vec<LayerError>,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bitmap for `id` is cached.
    pub fn contains(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    /// Number of cached bitmaps.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Current per-layer errors, at most one per layer id.
    pub fn errors(&self) -> &[LayerError] {
        &self.errors
    }

    /// Drop every cached bitmap and error.
    pub fn clear(&mut self) {
        self.images.clear();
        self.errors.clear();
    }

    /// Resolve one layer, hitting the loader only on a cache miss.
    pub async fn acquire<L: ImageLoader>(
        &mut self,
        layer: &VisualizerLayer,
        loader: &L,
    ) -> PorticoResult<DecodedImage> {
        if let Some(img) = self.images.get(&layer.id) {
            return Ok(img.clone());
        }
        let result = loader.load(&layer.image_url).await;
        self.settle(layer, result)
    }

    /// Resolve every layer concurrently and return the ones that loaded, sorted by `z_index`.
    ///
    /// One failure never aborts the others; failures land in [`ImageCache::errors`].
    pub async fn acquire_all<L: ImageLoader>(
        &mut self,
        layers: &[VisualizerLayer],
        loader: &L,
    ) -> Vec<CanvasImageLayer> {
        let misses: Vec<&VisualizerLayer> =
            layers.iter().filter(|l| !self.contains(&l.id)).collect();
        tracing::debug!(
            total = layers.len(),
            misses = misses.len(),
            "acquiring layer images"
        );

        let results = join_all(misses.iter().map(|l| loader.load(&l.image_url))).await;
        for (layer, result) in misses.into_iter().zip(results) {
            // Errors are recorded as data; the layer is simply absent from the output.
            let _ = self.settle(layer, result);
        }

        let mut ready: Vec<CanvasImageLayer> = layers
            .iter()
            .filter_map(|l| {
                self.images.get(&l.id).map(|img| CanvasImageLayer {
                    id: l.id.clone(),
                    image: img.clone(),
                    z_index: l.z_index,
                })
            })
            .collect();
        ready.sort_by_key(|l| l.z_index);
        ready
    }

    /// Write load state back onto derived layers.
    pub fn annotate(&self, layers: &mut [VisualizerLayer]) {
        for l in layers {
            l.is_loaded = self.contains(&l.id);
            l.has_error = self.errors.iter().any(|e| e.layer_id == l.id);
        }
    }

    fn settle(
        &mut self,
        layer: &VisualizerLayer,
        result: PorticoResult<DecodedImage>,
    ) -> PorticoResult<DecodedImage> {
        self.errors.retain(|e| e.layer_id != layer.id);
        match result {
            Ok(img) => {
                self.images.insert(layer.id.clone(), img.clone());
                Ok(img)
            }
            Err(cause) => {
                tracing::warn!(
                    layer = %layer.id,
                    url = %layer.image_url,
                    error = %cause,
                    "skipping layer due to load error"
                );
                let err = PorticoError::image_load(&layer.image_url);
                self.errors.push(LayerError {
                    layer_id: layer.id.clone(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
