//! # seqfx-blend
//!
//! The blend function library: 21 paint-program blend modes, each defined
//! for straight-alpha byte pixels ([`byte`]) and straight-alpha float pixels
//! ([`float`]). Both domains agree to within one byte quantization step.
//!
//! Effects do not call the raw per-pixel functions directly; they go through
//! [`blend_byte`] / [`blend_float`] (or the slice variants), which scale the
//! second input's alpha by the effect factor before blending. The result
//! always keeps the first input's alpha: blending changes color, never
//! opacity.
//!
//! # Example
//!
//! ```rust
//! use seqfx_blend::{blend_byte, blend_float, BlendMode};
//!
//! let a = [200u8, 100, 50, 255];
//! let b = [50u8, 100, 200, 255];
//! let out = blend_byte(BlendMode::Screen, 1.0, a, b);
//! assert_eq!(out[3], 255);
//!
//! let f = blend_float(BlendMode::Screen, 1.0, [0.5, 0.5, 0.5, 1.0], [0.5, 0.5, 0.5, 1.0]);
//! assert!((f[0] - 0.75).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

pub mod byte;
pub mod float;
pub mod hsv;
pub mod mode;

pub use mode::{BlendMode, ParseBlendModeError};

use seqfx_core::pixel::{self, CHANNELS};

/// Scales a byte alpha by `fac`, rounding to the nearest step.
#[inline]
pub fn scale_alpha(alpha: u8, fac: f32) -> u8 {
    (alpha as f32 * fac).round().clamp(0.0, 255.0) as u8
}

/// Blends byte pixels with `src2`'s alpha scaled by `fac`.
#[inline]
pub fn blend_byte(mode: BlendMode, fac: f32, src1: [u8; 4], src2: [u8; 4]) -> [u8; 4] {
    let mut layer = src2;
    layer[3] = scale_alpha(src2[3], fac);
    byte::blend(mode, src1, layer)
}

/// Blends float pixels with `src2`'s alpha scaled by `fac`.
#[inline]
pub fn blend_float(mode: BlendMode, fac: f32, src1: [f32; 4], src2: [f32; 4]) -> [f32; 4] {
    let mut layer = src2;
    layer[3] *= fac;
    float::blend(mode, src1, layer)
}

/// Applies [`blend_byte`] across matching RGBA slices.
pub fn blend_slice_byte(mode: BlendMode, fac: f32, src1: &[u8], src2: &[u8], out: &mut [u8]) {
    for i in 0..out.len() / CHANNELS {
        let px = blend_byte(mode, fac, pixel::load(src1, i), pixel::load(src2, i));
        pixel::store(out, i, px);
    }
}

/// Applies [`blend_float`] across matching RGBA slices.
pub fn blend_slice_float(mode: BlendMode, fac: f32, src1: &[f32], src2: &[f32], out: &mut [f32]) {
    for i in 0..out.len() / CHANNELS {
        let px = blend_float(mode, fac, pixel::load(src1, i), pixel::load(src2, i));
        pixel::store(out, i, px);
    }
}
