use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{PorticoError, PorticoResult};
use crate::foundation::math::mul_div255;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Cloning shares the pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> PorticoResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PorticoError::validation("image byte size overflow"))?;
        if rgba.len() != expected {
            return Err(PorticoError::validation(format!(
                "rgba buffer length {} does not match {width}x{height}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Single-colour image, handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, straight_rgba: [u8; 4]) -> PorticoResult<Self> {
        let px = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PorticoError::validation("image byte size overflow"))?;
        Self::from_straight_rgba8(width, height, straight_rgba.repeat(px))
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Decode PNG, JPEG or WebP bytes into a premultiplied [`DecodedImage`].
pub fn decode_image(bytes: &[u8]) -> PorticoResult<DecodedImage> {
    let rgba = image::load_from_memory(bytes)
        .context("decode layer image")?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_straight_rgba8(width, height, rgba.into_raw())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255(u16::from(*c), a);
        }
    }
}

/// Inverse of premultiplication, for encoders that expect straight alpha.
pub(crate) fn unpremultiply_rgba8(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = (((*c as u16) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
