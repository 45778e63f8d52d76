use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{PorticoError, PorticoResult};

/// Fetches and decodes the image behind a layer URL.
///
/// Implementations must yield pixels that can be read back for compositing and export; any
/// failure, whatever its cause, is reported as an error and treated uniformly by the cache.
pub trait ImageLoader {
    /// Load and decode the image at `url`.
    fn load(&self, url: &str) -> impl Future<Output = PorticoResult<DecodedImage>>;
}

impl<L: ImageLoader> ImageLoader for &L {
    fn load(&self, url: &str) -> impl Future<Output = PorticoResult<DecodedImage>> {
        (**self).load(url)
    }
}

/// Loader that resolves URLs against a directory on disk.
///
/// Leading slashes are stripped so that site-absolute paths like `/single-wood-doors/slab.png`
/// resolve under `root`. Paths that try to escape `root` are rejected.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory URLs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `url` to a file path under [`Self::root`].
    pub fn resolve(&self, url: &str) -> PorticoResult<PathBuf> {
        let rel = normalize_url_path(url)?;
        Ok(self.root.join(rel))
    }

    fn load_sync(&self, url: &str) -> PorticoResult<DecodedImage> {
        let path = self.resolve(url)?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, url: &str) -> PorticoResult<DecodedImage> {
        self.load_sync(url)
    }
}

/// Normalize a URL path into a relative `/`-separated path.
///
/// Strips scheme-less leading slashes, drops `.` segments, and rejects `..` and empty results.
pub fn normalize_url_path(url: &str) -> PorticoResult<String> {
    let s = url.replace('\\', "/");
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PorticoError::validation(format!(
                "image path must not contain '..': {url}"
            )));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(PorticoError::validation(format!(
            "image path must contain a file name: {url}"
        )));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
