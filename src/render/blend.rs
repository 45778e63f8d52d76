use crate::foundation::error::{PorticoError, PorticoResult};
use crate::foundation::math::{alpha_to_u8, mul_div255};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over at a fixed global alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceOver {
    alpha: u16,
}

impl SourceOver {
    /// Blender for `global_alpha` in `[0, 1]`; out-of-range values are clamped.
    pub fn new(global_alpha: f32) -> Self {
        Self {
            alpha: alpha_to_u8(global_alpha),
        }
    }

    /// Drawing at this alpha leaves the destination unchanged.
    pub fn is_noop(self) -> bool {
        self.alpha == 0
    }

    /// Blend `src` over `dst`.
    pub fn pixel(self, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
        let sa = mul_div255(u16::from(src[3]), self.alpha);
        if sa == 0 {
            return dst;
        }
        if sa == 255 {
            return src;
        }
        let inv = 255 - u16::from(sa);
        let mut out = [0u8; 4];
        for (i, o) in out.iter_mut().enumerate() {
            let s = if i == 3 {
                sa
            } else {
                mul_div255(u16::from(src[i]), self.alpha)
            };
            *o = s.saturating_add(mul_div255(u16::from(dst[i]), inv));
        }
        out
    }

    /// Blend a row of `src` pixels over an equally long row of `dst` pixels.
    pub fn row(self, dst: &mut [u8], src: &[u8]) -> PorticoResult<()> {
        if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
            return Err(PorticoError::validation(
                "source-over expects equal-length rgba8 rows",
            ));
        }
        if self.is_noop() {
            return Ok(());
        }
        for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
            let out = self.pixel([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
