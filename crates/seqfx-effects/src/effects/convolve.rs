//! Separable convolution over RGBA float planes.
//!
//! Each pass reads a complete source plane and writes a separate
//! destination, so the vertical pass can only start once the horizontal
//! pass has returned. Inside a pass the destination is cut into row slices
//! that run in parallel.

use crate::slice::for_each_rows;
use seqfx_core::CHANNELS;

/// How taps falling outside the frame are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edges {
    /// Outside taps read zero; the kernel keeps its full-window normalization.
    Zero,
    /// Outside taps are dropped from both the sum and the normalization.
    Renormalize,
}

/// Symmetric 1D kernel sampled at integer offsets `-half_width..=half_width`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Kernel {
    weights: Vec<f32>,
    half_width: usize,
}

impl Kernel {
    /// Samples `f` at every offset and normalizes the weights to sum to 1.
    pub fn normalized(half_width: usize, f: impl Fn(f32) -> f32) -> Self {
        let mut weights: Vec<f32> = (0..=2 * half_width)
            .map(|i| f(i as f32 - half_width as f32))
            .collect();
        let sum: f32 = weights.iter().sum();
        if sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= sum);
        }
        Self { weights, half_width }
    }

    /// Single unit tap.
    pub fn identity() -> Self {
        Self {
            weights: vec![1.0],
            half_width: 0,
        }
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Weight at signed offset `d`.
    #[inline]
    fn at(&self, d: isize) -> f32 {
        self.weights[(d + self.half_width as isize) as usize]
    }
}

/// Convolves every row of `src` into `dst`.
pub(crate) fn horizontal(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    kernel: &Kernel,
    edges: Edges,
    rows_per_slice: usize,
) {
    let row_len = width * CHANNELS;
    let hw = kernel.half_width();
    for_each_rows(dst, row_len, rows_per_slice, |rows, out| {
        for (r, y) in rows.enumerate() {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            let out_row = &mut out[r * row_len..(r + 1) * row_len];
            for x in 0..width {
                let lo = x.saturating_sub(hw);
                let hi = (x + hw).min(width - 1);
                let mut acc = [0.0f32; 4];
                let mut wsum = 0.0f32;
                for sx in lo..=hi {
                    let w = kernel.at(sx as isize - x as isize);
                    let o = sx * CHANNELS;
                    for c in 0..CHANNELS {
                        acc[c] += src_row[o + c] * w;
                    }
                    wsum += w;
                }
                let norm = match edges {
                    Edges::Renormalize if wsum > 0.0 => 1.0 / wsum,
                    _ => 1.0,
                };
                let o = x * CHANNELS;
                for c in 0..CHANNELS {
                    out_row[o + c] = acc[c] * norm;
                }
            }
        }
    });
}

/// Convolves every column of `src` into `dst`.
pub(crate) fn vertical(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    kernel: &Kernel,
    edges: Edges,
    rows_per_slice: usize,
) {
    let row_len = width * CHANNELS;
    let hw = kernel.half_width();
    for_each_rows(dst, row_len, rows_per_slice, |rows, out| {
        for (r, y) in rows.enumerate() {
            let out_row = &mut out[r * row_len..(r + 1) * row_len];
            out_row.fill(0.0);
            let lo = y.saturating_sub(hw);
            let hi = (y + hw).min(height - 1);
            let mut wsum = 0.0f32;
            for sy in lo..=hi {
                let w = kernel.at(sy as isize - y as isize);
                let src_row = &src[sy * row_len..(sy + 1) * row_len];
                for (o, s) in out_row.iter_mut().zip(src_row) {
                    *o += s * w;
                }
                wsum += w;
            }
            if edges == Edges::Renormalize && wsum > 0.0 {
                let norm = 1.0 / wsum;
                out_row.iter_mut().for_each(|v| *v *= norm);
            }
        }
    });
}
