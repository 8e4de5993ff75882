//! Effect algorithms, one module per family.
//!
//! Per-pixel effects implement [`Effect::execute_slice`] and let the default
//! [`Effect::execute`] slice the output; convolution and input-selection
//! effects override `execute`.
//!
//! [`Effect::execute_slice`]: crate::registry::Effect::execute_slice
//! [`Effect::execute`]: crate::registry::Effect::execute

pub mod alpha;
pub mod arith;
pub mod blend_mode;
pub mod channel;
mod convolve;
pub mod cross;
pub mod gaussian;
pub mod glow;
pub mod solid;
pub mod speed;
pub mod text;
pub mod transform;
pub mod wipe;

use crate::error::EffectResult;
use crate::exec::Inputs;
use crate::slice::{SliceMut, rows_of, run_sliced};
use seqfx_core::pixel::{byte_to_unit, load, store, unit_to_byte};
use seqfx_core::{CHANNELS, Frame, PixelFormat};
use std::ops::Range;

/// Applies `f` pixel-wise over two inputs into `out`.
#[inline]
pub(crate) fn map2<T: Copy>(a: &[T], b: &[T], out: &mut [T], f: impl Fn([T; 4], [T; 4]) -> [T; 4]) {
    for i in 0..out.len() / CHANNELS {
        store(out, i, f(load(a, i), load(b, i)));
    }
}

/// Runs a two-input per-pixel operation over one slice in either domain.
pub(crate) fn binary_slice(
    inputs: &Inputs,
    rows: &Range<usize>,
    out: SliceMut<'_>,
    byte: impl Fn([u8; 4], [u8; 4]) -> [u8; 4],
    float: impl Fn([f32; 4], [f32; 4]) -> [f32; 4],
) {
    let row_len = inputs.row_len();
    match out {
        SliceMut::Byte(o) => map2(
            rows_of(inputs.bytes(0), row_len, rows),
            rows_of(inputs.bytes(1), row_len, rows),
            o,
            byte,
        ),
        SliceMut::Float(o) => map2(
            rows_of(inputs.floats(0), row_len, rows),
            rows_of(inputs.floats(1), row_len, rows),
            o,
            float,
        ),
    }
}

/// Input `index` as straight float samples, converting bytes.
pub(crate) fn float_plane(inputs: &Inputs, index: usize) -> Vec<f32> {
    match inputs.format() {
        PixelFormat::Float => inputs.floats(index).to_vec(),
        PixelFormat::Byte => inputs.bytes(index).iter().map(|&v| byte_to_unit(v)).collect(),
    }
}

/// Stores a float plane into `out`, quantizing for byte frames.
pub(crate) fn store_plane(out: &mut Frame, plane: &[f32], rows_per_slice: usize) -> EffectResult<()> {
    let row_len = out.row_len();
    run_sliced(out, rows_per_slice, |rows, slice| {
        let src = rows_of(plane, row_len, &rows);
        match slice {
            SliceMut::Byte(o) => o.iter_mut().zip(src).for_each(|(d, &s)| *d = unit_to_byte(s)),
            SliceMut::Float(o) => o.copy_from_slice(src),
        }
    })
}
