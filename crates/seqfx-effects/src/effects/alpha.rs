//! Premultiplied "over" and "under" compositing, and the drop shadow.
//!
//! Frames are stored straight; both domains convert to premultiplied float
//! per pixel, composite, and convert back. Saturated and vanishing alphas
//! short-circuit before any division so the inputs come back untouched.

use super::binary_slice;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Capabilities, EarlyOut, Effect, EffectType, early_out_mul_input2};
use crate::slice::SliceMut;
use seqfx_core::pixel::{
    load, premul_f32_to_straight_u8, premultiply, store, straight_u8_to_premul_f32, unpremultiply,
};
use std::ops::Range;

/// Strength of the drop shadow at factor 1, in byte units.
const DROP_STRENGTH: f32 = 70.0;

/// Shadow offset in pixels.
const DROP_OFFSET: usize = 8;

/// Outcome of the short-circuit tests.
enum Composite {
    First,
    Second,
    Mixed([f32; 4]),
}

#[inline]
fn over(fac: f32, p1: [f32; 4], p2: [f32; 4]) -> Composite {
    if fac <= 0.0 {
        return Composite::Second;
    }
    let mfac = 1.0 - fac * p1[3];
    if mfac <= 0.0 {
        return Composite::First;
    }
    Composite::Mixed(std::array::from_fn(|c| fac * p1[c] + mfac * p2[c]))
}

#[inline]
fn under(fac: f32, p1: [f32; 4], p2: [f32; 4]) -> Composite {
    let a2 = p2[3];
    if a2 <= 0.0 && fac >= 1.0 {
        return Composite::First;
    }
    if a2 >= 1.0 || fac <= 0.0 {
        return Composite::Second;
    }
    let t = fac * (1.0 - a2);
    Composite::Mixed(std::array::from_fn(|c| t * p1[c] + p2[c]))
}

/// `a` over `b` with `a`'s coverage scaled by `fac`, byte pixels.
#[inline]
pub fn alpha_over_byte(fac: f32, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    match over(fac, straight_u8_to_premul_f32(a), straight_u8_to_premul_f32(b)) {
        Composite::First => a,
        Composite::Second => b,
        Composite::Mixed(p) => premul_f32_to_straight_u8(p),
    }
}

/// `a` over `b` with `a`'s coverage scaled by `fac`, float pixels.
#[inline]
pub fn alpha_over_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    match over(fac, premultiply(a), premultiply(b)) {
        Composite::First => a,
        Composite::Second => b,
        Composite::Mixed(p) => unpremultiply(p),
    }
}

/// `a` under `b`, byte pixels.
#[inline]
pub fn alpha_under_byte(fac: f32, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    match under(fac, straight_u8_to_premul_f32(a), straight_u8_to_premul_f32(b)) {
        Composite::First => a,
        Composite::Second => b,
        Composite::Mixed(p) => premul_f32_to_straight_u8(p),
    }
}

/// `a` under `b`, float pixels.
#[inline]
pub fn alpha_under_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    match under(fac, premultiply(a), premultiply(b)) {
        Composite::First => a,
        Composite::Second => b,
        Composite::Mixed(p) => unpremultiply(p),
    }
}

/// Where the shadow cast onto an output pixel comes from.
#[derive(Debug, Clone, Copy)]
struct DropGeometry {
    width: usize,
    height: usize,
    xoff: usize,
    yoff: usize,
}

impl DropGeometry {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            xoff: DROP_OFFSET.min(width),
            yoff: DROP_OFFSET.min(height),
        }
    }

    /// Pixel index of the shadow caster, `None` where input 2 is copied.
    #[inline]
    fn caster(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.xoff || y + self.yoff >= self.height {
            None
        } else {
            Some((y + self.yoff) * self.width + x - self.xoff)
        }
    }
}

/// Darkens `src2` by the offset alpha of `src1`, byte rows `rows`.
fn drop_rows_byte(geom: DropGeometry, fac: f32, src1: &[u8], src2: &[u8], rows: &Range<usize>, out: &mut [u8]) {
    let strength = (DROP_STRENGTH * fac).round().clamp(0.0, 255.0) as u32;
    for (row, y) in rows.clone().enumerate() {
        for x in 0..geom.width {
            let i = y * geom.width + x;
            let mut px = load(src2, i);
            if let Some(c) = geom.caster(x, y) {
                let t = ((strength * src1[c * 4 + 3] as u32 + 127) / 255) as u8;
                px = px.map(|v| v.saturating_sub(t));
            }
            store(out, row * geom.width + x, px);
        }
    }
}

/// Darkens `src2` by the offset alpha of `src1`, float rows `rows`.
fn drop_rows_float(geom: DropGeometry, fac: f32, src1: &[f32], src2: &[f32], rows: &Range<usize>, out: &mut [f32]) {
    let strength = DROP_STRENGTH / 255.0 * fac;
    for (row, y) in rows.clone().enumerate() {
        for x in 0..geom.width {
            let i = y * geom.width + x;
            let mut px = load(src2, i);
            if let Some(c) = geom.caster(x, y) {
                let t = strength * src1[c * 4 + 3];
                px = px.map(|v| (v - t).max(0.0));
            }
            store(out, row * geom.width + x, px);
        }
    }
}

/// Premultiplied "over" of input 1 onto input 2.
#[derive(Debug, Clone, Copy)]
pub struct AlphaOverEffect;

impl Effect for AlphaOverEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::AlphaOver
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn swaps_inputs(&self) -> bool {
        true
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        early_out_mul_input2(fac)
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let fac = call.fac;
        binary_slice(
            inputs,
            &rows,
            out,
            |a, b| alpha_over_byte(fac, a, b),
            |a, b| alpha_over_float(fac, a, b),
        );
    }
}

/// Premultiplied "under": input 1 shows through where input 2 is transparent.
#[derive(Debug, Clone, Copy)]
pub struct AlphaUnderEffect;

impl Effect for AlphaUnderEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::AlphaUnder
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn swaps_inputs(&self) -> bool {
        true
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let fac = call.fac;
        binary_slice(
            inputs,
            &rows,
            out,
            |a, b| alpha_under_byte(fac, a, b),
            |a, b| alpha_under_float(fac, a, b),
        );
    }
}

/// Drop shadow of input 1 cast onto input 2, then input 1 over the result.
#[derive(Debug, Clone, Copy)]
pub struct OverDropEffect;

impl Effect for OverDropEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::OverDrop
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let fac = call.fac;
        let geom = DropGeometry::new(inputs.width(), inputs.height());
        match out {
            SliceMut::Byte(o) => {
                let (src1, src2) = (inputs.bytes(0), inputs.bytes(1));
                drop_rows_byte(geom, fac, src1, src2, &rows, o);
                for (row, y) in rows.clone().enumerate() {
                    for x in 0..geom.width {
                        let a = load(src1, y * geom.width + x);
                        let i = row * geom.width + x;
                        store(o, i, alpha_over_byte(fac, a, load(o, i)));
                    }
                }
            }
            SliceMut::Float(o) => {
                let (src1, src2) = (inputs.floats(0), inputs.floats(1));
                drop_rows_float(geom, fac, src1, src2, &rows, o);
                for (row, y) in rows.clone().enumerate() {
                    for x in 0..geom.width {
                        let a = load(src1, y * geom.width + x);
                        let i = row * geom.width + x;
                        store(o, i, alpha_over_float(fac, a, load(o, i)));
                    }
                }
            }
        }
    }
}
