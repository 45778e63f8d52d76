/// `x * y / 255` rounded to nearest, for two values on the `0..=255` scale.
pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255).min(255) as u8
}

/// Alpha in `[0, 1]` mapped onto the `0..=255` fixed-point scale. NaN maps to 0.
pub(crate) fn alpha_to_u8(alpha: f32) -> u16 {
    ((alpha.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}
