//! Cross and gamma cross dissolves.

use super::binary_slice;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Capabilities, EarlyOut, Effect, EffectType, early_out_fade, fade_factor};
use crate::slice::SliceMut;
use crate::strip::EffectStrip;
use seqfx_core::pixel::{premul_f32_to_straight_u8, premultiply, straight_u8_to_premul_f32, unpremultiply};
use std::ops::Range;

/// Fixed-point weights `(1 - fac, fac)` scaled by 256.
#[inline]
pub fn cross_weights(fac: f32) -> (u32, u32) {
    let t = (256.0 * fac).round().clamp(0.0, 256.0) as u32;
    (256 - t, t)
}

/// Byte dissolve of one pixel with precomputed weights.
#[inline]
pub fn cross_byte(weights: (u32, u32), a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    let (mfac, fac) = weights;
    std::array::from_fn(|c| ((mfac * a[c] as u32 + fac * b[c] as u32 + 128) >> 8) as u8)
}

/// Float dissolve of one pixel.
#[inline]
pub fn cross_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let mfac = 1.0 - fac;
    std::array::from_fn(|c| mfac * a[c] + fac * b[c])
}

/// Signed square root: into the gamma-2 domain.
#[inline]
fn gamma_decode(v: f32) -> f32 {
    if v < 0.0 { -(-v).sqrt() } else { v.sqrt() }
}

/// Signed square: out of the gamma-2 domain.
#[inline]
fn gamma_encode(v: f32) -> f32 {
    v.abs() * v
}

/// Gamma dissolve of premultiplied float pixels.
#[inline]
pub fn gamma_cross_premul(fac: f32, p1: [f32; 4], p2: [f32; 4]) -> [f32; 4] {
    let mfac = 1.0 - fac;
    std::array::from_fn(|c| gamma_encode(mfac * gamma_decode(p1[c]) + fac * gamma_decode(p2[c])))
}

/// Linear dissolve.
#[derive(Debug, Clone, Copy)]
pub struct CrossEffect;

impl Effect for CrossEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Cross
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        early_out_fade(fac)
    }

    fn default_factor(&self, strip: &EffectStrip, timeline_frame: f32) -> f32 {
        fade_factor(strip, timeline_frame)
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let fac = call.fac;
        let weights = cross_weights(fac);
        binary_slice(
            inputs,
            &rows,
            out,
            |a, b| cross_byte(weights, a, b),
            |a, b| cross_float(fac, a, b),
        );
    }
}

/// Dissolve in a gamma-2 domain, softening midtones.
#[derive(Debug, Clone, Copy)]
pub struct GammaCrossEffect;

impl Effect for GammaCrossEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::GammaCross
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        early_out_fade(fac)
    }

    fn default_factor(&self, strip: &EffectStrip, timeline_frame: f32) -> f32 {
        fade_factor(strip, timeline_frame)
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let fac = call.fac;
        binary_slice(
            inputs,
            &rows,
            out,
            |a, b| {
                let p = gamma_cross_premul(fac, straight_u8_to_premul_f32(a), straight_u8_to_premul_f32(b));
                premul_f32_to_straight_u8(p)
            },
            |a, b| unpremultiply(gamma_cross_premul(fac, premultiply(a), premultiply(b))),
        );
    }
}
