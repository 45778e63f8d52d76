use crate::foundation::error::{PorticoError, PorticoResult};

pub use kurbo::Rect;

/// Pixel extent of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

impl Canvas {
    /// Build a canvas, rejecting sizes whose RGBA8 buffer would not fit in memory addressing.
    pub fn new(width: u32, height: u32) -> PorticoResult<Self> {
        let c = Self { width, height };
        c.byte_len()?;
        Ok(c)
    }

    /// Zero-sized canvas, the state of a surface before layout.
    pub const fn zero() -> Self {
        Self {
            width: 0,
            height: 0,
        }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smaller of the two dimensions.
    pub fn min_side(self) -> f64 {
        f64::from(self.width.min(self.height))
    }

    /// Length of a tightly packed RGBA8 buffer for this canvas.
    pub fn byte_len(self) -> PorticoResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| PorticoError::validation("canvas byte size overflow"))
    }

    /// Full-canvas rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}
