//! Bloom: bright regions are isolated, blurred and added back.

use super::convolve::{Edges, Kernel, horizontal, vertical};
use super::{float_plane, store_plane};
use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Effect, EffectType};
use crate::slice::for_each_rows;
use seqfx_core::{CHANNELS, Frame};
use tracing::trace;

/// Glow settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowParams {
    /// Per-channel intensity a pixel must exceed to glow
    pub threshold: f32,
    /// Ceiling of the isolated highlights
    pub clamp: f32,
    /// Gain applied to the highlights
    pub boost: f32,
    /// Blur radius at full render size
    pub distance: f32,
    /// Kernel extent in radii
    pub quality: u32,
    /// Output only the blurred highlights
    pub only_boost: bool,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            clamp: 1.0,
            boost: 0.5,
            distance: 3.0,
            quality: 3,
            only_boost: false,
        }
    }
}

/// Keeps the part of `px` above the threshold, scaled and clamped.
#[inline]
pub fn isolate_highlight(px: [f32; 4], threshold: f32, gain: f32, clamp: f32) -> [f32; 4] {
    let intensity = px[0] + px[1] + px[2] - 3.0 * threshold;
    if intensity > 0.0 {
        px.map(|c| (c * gain * intensity).min(clamp))
    } else {
        [0.0; 4]
    }
}

/// Blur kernel for `radius` pixels, or `None` when nothing would blur.
pub(crate) fn glow_kernel(radius: f32, quality: u32, limit: usize) -> Option<Kernel> {
    if radius <= 0.0 || !radius.is_finite() {
        return None;
    }
    let half_width = ((quality.saturating_add(1) as f32 * radius) as usize).min(limit);
    if half_width == 0 {
        return None;
    }
    let denom = 2.0 * radius * radius;
    Some(Kernel::normalized(half_width, |x| (-x * x / denom).exp()))
}

/// Glow over input 1.
#[derive(Debug, Clone, Copy)]
pub struct GlowEffect;

impl Effect for GlowEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Glow
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Glow(GlowParams::default())
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let params = *call.strip.params.glow()?;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        let (width, height) = (inputs.width(), inputs.height());
        let row_len = inputs.row_len();
        let rows = call.schedule.blur_slice_rows;

        let source = float_plane(&inputs, 0);
        let gain = params.boost * call.fac;
        let mut layer = source.clone();
        for_each_rows(&mut layer, row_len, rows, |_, chunk| {
            for px in chunk.chunks_exact_mut(CHANNELS) {
                let v = isolate_highlight([px[0], px[1], px[2], px[3]], params.threshold, gain, params.clamp);
                px.copy_from_slice(&v);
            }
        });

        let radius = params.distance * call.ctx.render_size_percent() / 100.0;
        trace!(width, height, fac = call.fac, radius, "glow");
        if let Some(kernel) = glow_kernel(radius, params.quality, width.max(height)) {
            let mut temp = vec![0.0f32; layer.len()];
            horizontal(&layer, &mut temp, width, &kernel, Edges::Zero, rows);
            vertical(&temp, &mut layer, width, height, &kernel, Edges::Zero, rows);
        }

        if !params.only_boost {
            for_each_rows(&mut layer, row_len, rows, |range, chunk| {
                let src = &source[range.start * row_len..range.end * row_len];
                for (v, s) in chunk.iter_mut().zip(src) {
                    *v = (*v + s).min(1.0);
                }
            });
        }

        let mut out = inputs.allocate_output(call.ctx)?;
        store_plane(&mut out, &layer, rows)?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{run, strip};
    use approx::assert_abs_diff_eq;
    use seqfx_core::PixelFormat;

    fn glow(params: GlowParams, fac: f32, input: &Frame) -> Frame {
        let mut s = strip(EffectType::Glow);
        *s.params.glow_mut().unwrap() = params;
        run(&s, fac, [Some(input), None, None]).unwrap().unwrap()
    }

    fn spot(size: u32, value: f32) -> Frame {
        let mut data = vec![0.0f32; (size * size) as usize * CHANNELS];
        let c = (size / 2 * size + size / 2) as usize * CHANNELS;
        data[c..c + CHANNELS].copy_from_slice(&[value, value, value, 1.0]);
        Frame::from_floats(size, size, data).unwrap()
    }

    #[test]
    fn test_isolate() {
        assert_eq!(isolate_highlight([0.2, 0.2, 0.2, 1.0], 0.25, 1.0, 1.0), [0.0; 4]);
        let v = isolate_highlight([1.0, 1.0, 1.0, 1.0], 0.25, 0.5, 1.0);
        // intensity 2.25, gain 0.5 -> 1.125 clamped.
        assert_eq!(v, [1.0; 4]);
        let v = isolate_highlight([0.5, 0.5, 0.5, 1.0], 0.25, 0.5, 1.0);
        assert_abs_diff_eq!(v[0], 0.5 * 0.5 * 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_kernel_degenerate() {
        assert!(glow_kernel(0.0, 3, 64).is_none());
        assert!(glow_kernel(-1.0, 3, 64).is_none());
        assert!(glow_kernel(0.2, 3, 64).is_none());
        assert_eq!(glow_kernel(3.0, 3, 64).unwrap().half_width(), 12);
        assert_eq!(glow_kernel(3.0, 3, 5).unwrap().half_width(), 5);
        assert_eq!(glow_kernel(3.0, u32::MAX, 9).unwrap().half_width(), 9);
    }

    #[test]
    fn test_dark_frame_unchanged() {
        let input = Frame::filled_float(8, 8, [0.1, 0.2, 0.1, 1.0]);
        let out = glow(GlowParams::default(), 1.0, &input);
        assert_eq!(out.floats(), input.floats());

        let only = glow(
            GlowParams {
                only_boost: true,
                ..Default::default()
            },
            1.0,
            &input,
        );
        assert!(only.floats().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bright_spot_spreads() {
        let input = spot(15, 1.0);
        let out = glow(GlowParams::default(), 1.0, &input);
        let centre = out.float_pixel(7, 7).unwrap();
        let near = out.float_pixel(9, 7).unwrap();
        let far = out.float_pixel(0, 0).unwrap();
        assert_eq!(centre[0], 1.0);
        assert!(near[0] > 0.0 && near[0] < 1.0);
        assert!(near[0] > far[0]);
        // Symmetric in both axes.
        assert_abs_diff_eq!(near[0], out.float_pixel(7, 9).unwrap()[0], epsilon = 1e-6);
    }

    #[test]
    fn test_zero_distance_adds_isolate_only() {
        let input = spot(5, 0.8);
        let out = glow(
            GlowParams {
                distance: 0.0,
                ..Default::default()
            },
            1.0,
            &input,
        );
        // 0.8 + min(1, 0.8 * 0.5 * (2.4 - 0.75)) = 0.8 + 0.66 -> clamped.
        assert_eq!(out.float_pixel(2, 2).unwrap()[0], 1.0);
        assert_eq!(out.float_pixel(1, 2).unwrap()[0], 0.0);
    }

    #[test]
    fn test_byte_input_gives_byte_output() {
        let input = spot(9, 1.0).to_format(PixelFormat::Byte);
        let input = Frame::from_bytes(9, 9, input.bytes().unwrap().to_vec()).unwrap();
        let out = glow(GlowParams::default(), 0.5, &input);
        assert_eq!(out.format(), PixelFormat::Byte);
        assert_eq!(out.byte_pixel(4, 4).unwrap()[0], 255);
        assert!(out.byte_pixel(5, 4).unwrap()[0] > 0);
    }

    #[test]
    fn test_extreme_quality_is_bounded() {
        let input = spot(7, 1.0);
        let out = glow(
            GlowParams {
                quality: u32::MAX,
                ..Default::default()
            },
            1.0,
            &input,
        );
        assert_eq!(out.dimensions(), (7, 7));
        assert_eq!(out.float_pixel(3, 3).unwrap()[0], 1.0);
        assert!(out.float_pixel(4, 3).unwrap()[0] > 0.0);
    }
}
