//! Per-pixel numeric conversions.
//!
//! Frames store straight (non-premultiplied) RGBA. Compositing math that
//! needs premultiplied values converts on the fly with the helpers here:
//!
//! - [`byte_to_unit`] / [`unit_to_byte`] - quantization between `[0, 255]` and `[0, 1]`
//! - [`premultiply`] / [`unpremultiply`] - float straight <-> premultiplied
//! - [`straight_u8_to_premul_f32`] / [`premul_f32_to_straight_u8`] - the byte path variants
//!
//! # Example
//!
//! ```rust
//! use seqfx_core::pixel::{premul_f32_to_straight_u8, straight_u8_to_premul_f32};
//!
//! let px = [200u8, 100, 50, 255];
//! let premul = straight_u8_to_premul_f32(px);
//! assert_eq!(premul_f32_to_straight_u8(premul), px);
//! ```

/// Number of channels in every frame (RGBA).
pub const CHANNELS: usize = 4;

/// Converts an 8-bit channel to `[0, 1]`.
#[inline]
pub fn byte_to_unit(v: u8) -> f32 {
    v as f32 * (1.0 / 255.0)
}

/// Quantizes a `[0, 1]` value to 8 bits with rounding and clamping.
///
/// Values within half a step of 1.0 map to 255, matching the usual
/// "unit float to byte" convention of image pipelines.
#[inline]
pub fn unit_to_byte(v: f32) -> u8 {
    if v <= 0.0 || v.is_nan() {
        0
    } else if v > 1.0 - 0.5 / 255.0 {
        255
    } else {
        (255.0 * v + 0.5) as u8
    }
}

/// Converts a straight float pixel to premultiplied.
#[inline]
pub fn premultiply(px: [f32; 4]) -> [f32; 4] {
    let a = px[3];
    [px[0] * a, px[1] * a, px[2] * a, a]
}

/// Converts a premultiplied float pixel back to straight alpha.
///
/// Fully transparent and fully opaque pixels are passed through, so no
/// division by a vanishing alpha ever happens.
#[inline]
pub fn unpremultiply(px: [f32; 4]) -> [f32; 4] {
    let a = px[3];
    if a <= 0.0 || a == 1.0 {
        return px;
    }
    let inv = 1.0 / a;
    [px[0] * inv, px[1] * inv, px[2] * inv, a]
}

/// Converts a straight byte pixel to a straight float pixel.
#[inline]
pub fn u8_to_f32(px: [u8; 4]) -> [f32; 4] {
    [
        byte_to_unit(px[0]),
        byte_to_unit(px[1]),
        byte_to_unit(px[2]),
        byte_to_unit(px[3]),
    ]
}

/// Converts a straight float pixel to bytes.
#[inline]
pub fn f32_to_u8(px: [f32; 4]) -> [u8; 4] {
    [
        unit_to_byte(px[0]),
        unit_to_byte(px[1]),
        unit_to_byte(px[2]),
        unit_to_byte(px[3]),
    ]
}

/// Decodes a straight byte pixel into premultiplied float.
#[inline]
pub fn straight_u8_to_premul_f32(px: [u8; 4]) -> [f32; 4] {
    premultiply(u8_to_f32(px))
}

/// Encodes a premultiplied float pixel as straight bytes.
#[inline]
pub fn premul_f32_to_straight_u8(px: [f32; 4]) -> [u8; 4] {
    f32_to_u8(unpremultiply(px))
}

/// Reads pixel `i` of an RGBA slice.
#[inline]
pub fn load<T: Copy>(data: &[T], i: usize) -> [T; 4] {
    let o = i * CHANNELS;
    [data[o], data[o + 1], data[o + 2], data[o + 3]]
}

/// Writes pixel `i` of an RGBA slice.
#[inline]
pub fn store<T: Copy>(data: &mut [T], i: usize, px: [T; 4]) {
    let o = i * CHANNELS;
    data[o..o + CHANNELS].copy_from_slice(&px);
}
