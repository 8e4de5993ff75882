//! Point sampling of frames for resampling effects.
//!
//! Coordinates are in pixels with integer values at pixel centres, row 0 on
//! top. Filtering happens on premultiplied values; taps outside the source
//! are transparent black.

use seqfx_core::pixel::{premultiply, u8_to_f32, unpremultiply};
use seqfx_core::{CHANNELS, Frame};

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Pixel containing the position (floor)
    Nearest,
    /// 2x2 linear
    #[default]
    Bilinear,
    /// 4x4 Mitchell-Netravali
    Bicubic,
}

/// Mitchell-Netravali weight with B = C = 1/3.
#[inline]
pub fn mitchell_weight(x: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax + (6.0 * B + 30.0 * C) * ax * ax + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
enum Samples<'a> {
    Byte(&'a [u8]),
    Float(&'a [f32]),
}

/// Read-only view of a frame for sampling.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    samples: Samples<'a>,
    width: i64,
    height: i64,
}

impl<'a> Source<'a> {
    /// Views `frame` through its primary representation.
    pub fn new(frame: &'a Frame) -> Option<Self> {
        let samples = match frame.floats() {
            Some(f) => Samples::Float(f),
            None => Samples::Byte(frame.bytes()?),
        };
        Some(Self {
            samples,
            width: frame.width() as i64,
            height: frame.height() as i64,
        })
    }

    /// Premultiplied texel, transparent outside the frame.
    #[inline]
    pub fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return [0.0; 4];
        }
        let o = (y * self.width + x) as usize * CHANNELS;
        let straight = match self.samples {
            Samples::Byte(d) => u8_to_f32([d[o], d[o + 1], d[o + 2], d[o + 3]]),
            Samples::Float(d) => [d[o], d[o + 1], d[o + 2], d[o + 3]],
        };
        premultiply(straight)
    }

    /// Straight-alpha value at `(u, v)`.
    pub fn sample(&self, filter: Interpolation, u: f32, v: f32) -> [f32; 4] {
        if !u.is_finite() || !v.is_finite() {
            return [0.0; 4];
        }
        let premul = match filter {
            Interpolation::Nearest => self.texel(u.floor() as i64, v.floor() as i64),
            Interpolation::Bilinear => self.bilinear(u, v),
            Interpolation::Bicubic => self.bicubic(u, v),
        };
        unpremultiply(premul)
    }

    fn bilinear(&self, u: f32, v: f32) -> [f32; 4] {
        let (x0, y0) = (u.floor(), v.floor());
        let (fx, fy) = (u - x0, v - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let p00 = self.texel(x0, y0);
        let p10 = self.texel(x0 + 1, y0);
        let p01 = self.texel(x0, y0 + 1);
        let p11 = self.texel(x0 + 1, y0 + 1);
        std::array::from_fn(|c| {
            let top = p00[c] * (1.0 - fx) + p10[c] * fx;
            let bot = p01[c] * (1.0 - fx) + p11[c] * fx;
            top * (1.0 - fy) + bot * fy
        })
    }

    fn bicubic(&self, u: f32, v: f32) -> [f32; 4] {
        let (x0, y0) = (u.floor() as i64, v.floor() as i64);
        let mut acc = [0.0f32; 4];
        for ty in y0 - 1..=y0 + 2 {
            let wy = mitchell_weight(v - ty as f32);
            for tx in x0 - 1..=x0 + 2 {
                let w = wy * mitchell_weight(u - tx as f32);
                if w == 0.0 {
                    continue;
                }
                let p = self.texel(tx, ty);
                for c in 0..4 {
                    acc[c] += p[c] * w;
                }
            }
        }
        acc.map(|c| c.max(0.0))
    }
}
