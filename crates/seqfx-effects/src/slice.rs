//! Row-sliced parallel execution.
//!
//! An output buffer is cut into contiguous runs of whole rows; every run is
//! handed to the effect together with its row range. Runs never share
//! mutable state, so they are submitted to the rayon work-stealing pool as
//! independent tasks. Two-pass effects call this once per pass: the call
//! returns only after every slice of the pass finished.

use crate::error::EffectResult;
use seqfx_core::{CHANNELS, Frame, PixelFormat};
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A mutable run of output rows in the frame's primary representation.
#[derive(Debug)]
pub enum SliceMut<'a> {
    /// 8-bit samples
    Byte(&'a mut [u8]),
    /// Float samples
    Float(&'a mut [f32]),
}

/// Calls `f(rows, samples)` for every slice of `rows_per_slice` rows.
///
/// `data` holds whole rows of `row_len` samples.
#[cfg(feature = "parallel")]
pub fn for_each_rows<T, F>(data: &mut [T], row_len: usize, rows_per_slice: usize, f: F)
where
    T: Send,
    F: Fn(Range<usize>, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    let rows_per_slice = rows_per_slice.max(1);
    data.par_chunks_mut(row_len * rows_per_slice)
        .enumerate()
        .for_each(|(i, chunk)| {
            let start = i * rows_per_slice;
            f(start..start + chunk.len() / row_len, chunk)
        });
}

/// Calls `f(rows, samples)` for every slice of `rows_per_slice` rows.
///
/// `data` holds whole rows of `row_len` samples.
#[cfg(not(feature = "parallel"))]
pub fn for_each_rows<T, F>(data: &mut [T], row_len: usize, rows_per_slice: usize, f: F)
where
    T: Send,
    F: Fn(Range<usize>, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    let rows_per_slice = rows_per_slice.max(1);
    for (i, chunk) in data.chunks_mut(row_len * rows_per_slice).enumerate() {
        let start = i * rows_per_slice;
        f(start..start + chunk.len() / row_len, chunk)
    }
}

/// Runs `f` over the slices of `out`'s primary representation.
pub fn run_sliced<F>(out: &mut Frame, rows_per_slice: usize, f: F) -> EffectResult<()>
where
    F: Fn(Range<usize>, SliceMut<'_>) + Sync + Send,
{
    let row_len = out.width() as usize * CHANNELS;
    match out.format() {
        PixelFormat::Byte => {
            let data = out.bytes_mut()?;
            for_each_rows(data, row_len, rows_per_slice, |rows, s| f(rows, SliceMut::Byte(s)));
        }
        PixelFormat::Float => {
            let data = out.floats_mut()?;
            for_each_rows(data, row_len, rows_per_slice, |rows, s| f(rows, SliceMut::Float(s)));
        }
    }
    Ok(())
}

/// Sub-slice of whole rows.
#[inline]
pub fn rows_of<'a, T>(data: &'a [T], row_len: usize, rows: &Range<usize>) -> &'a [T] {
    &data[rows.start * row_len..rows.end * row_len]
}
