//! Separable gaussian blur with independent x and y radii.

use super::convolve::{Edges, Kernel, horizontal, vertical};
use super::{float_plane, store_plane};
use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{EarlyOut, Effect, EffectType};
use seqfx_core::Frame;
use tracing::trace;

/// Blur radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaussianBlurParams {
    /// Horizontal radius
    pub size_x: f32,
    /// Vertical radius
    pub size_y: f32,
}

/// Kernel for a blur of `size` pixels; the radius spans three sigmas.
///
/// Taps further than `limit` pixels never land inside the frame and are
/// dropped.
pub(crate) fn blur_kernel(size: f32, limit: usize) -> Kernel {
    let half_width = ((size + 0.5) as usize).min(limit);
    if size <= 0.0 || half_width == 0 {
        return Kernel::identity();
    }
    let inv = 1.0 / size;
    Kernel::normalized(half_width, |i| {
        let x = i * inv;
        (-4.5 * x * x).exp()
    })
}

/// Gaussian blur of input 1.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlurEffect;

impl Effect for GaussianBlurEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::GaussianBlur
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::GaussianBlur(GaussianBlurParams::default())
    }

    fn early_out(&self, params: &EffectParams, _fac: f32) -> EarlyOut {
        match params.gaussian_blur() {
            Ok(p) if p.size_x == 0.0 && p.size_y == 0.0 => EarlyOut::UseInput1,
            _ => EarlyOut::DoEffect,
        }
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let params = *call.strip.params.gaussian_blur()?;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        let (width, height) = (inputs.width(), inputs.height());
        let rows = call.schedule.blur_slice_rows;
        trace!(width, height, size_x = params.size_x, size_y = params.size_y, "gaussian blur");

        let source = float_plane(&inputs, 0);
        let mut temp = vec![0.0f32; source.len()];
        horizontal(&source, &mut temp, width, &blur_kernel(params.size_x, width), Edges::Renormalize, rows);
        let mut blurred = source;
        vertical(&temp, &mut blurred, width, height, &blur_kernel(params.size_y, height), Edges::Renormalize, rows);

        let mut out = inputs.allocate_output(call.ctx)?;
        store_plane(&mut out, &blurred, rows)?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{gradient_byte, run, strip};
    use crate::registry::resolve;
    use approx::assert_abs_diff_eq;

    fn blur(size_x: f32, size_y: f32, input: &Frame) -> Frame {
        let mut s = strip(EffectType::GaussianBlur);
        *s.params.gaussian_blur_mut().unwrap() = GaussianBlurParams { size_x, size_y };
        run(&s, 1.0, [Some(input), None, None]).unwrap().unwrap()
    }

    #[test]
    fn test_kernel_shape() {
        assert_eq!(blur_kernel(0.0, 64).half_width(), 0);
        assert_eq!(blur_kernel(0.4, 64).half_width(), 0);
        assert_eq!(blur_kernel(2.5, 64).half_width(), 3);
        assert_eq!(blur_kernel(1.0e30, 7).half_width(), 7);
    }

    #[test]
    fn test_zero_size_early_out() {
        let s = strip(EffectType::GaussianBlur);
        assert_eq!(resolve(EffectType::GaussianBlur).early_out(&s.params, 1.0), EarlyOut::UseInput1);
        let p = EffectParams::GaussianBlur(GaussianBlurParams {
            size_x: 0.0,
            size_y: 1.0,
        });
        assert_eq!(resolve(EffectType::GaussianBlur).early_out(&p, 1.0), EarlyOut::DoEffect);
    }

    #[test]
    fn test_zero_size_execute_is_identity() {
        let input = gradient_byte(7, 5, 1);
        assert_eq!(blur(0.0, 0.0, &input).bytes(), input.bytes());
    }

    #[test]
    fn test_uniform_field_stays_uniform() {
        let byte = Frame::filled_byte(12, 9, [40, 120, 200, 255]);
        for (sx, sy) in [(1.0, 1.0), (3.0, 0.0), (2.5, 6.0), (1.0e30, f32::MAX)] {
            let out = blur(sx, sy, &byte);
            assert!(out.bytes().unwrap().chunks(4).all(|p| p == [40, 120, 200, 255]));
        }

        let float = Frame::filled_float(12, 9, [0.3, 0.6, 0.9, 1.0]);
        let out = blur(4.0, 4.0, &float);
        for (i, v) in out.floats().unwrap().iter().enumerate() {
            assert_abs_diff_eq!(*v, [0.3, 0.6, 0.9, 1.0][i % 4], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_horizontal_only() {
        // A single bright column spreads sideways but not along itself.
        let mut data = vec![0.0f32; 9 * 3 * 4];
        for y in 0..3 {
            let o = (y * 9 + 4) * 4;
            data[o..o + 4].copy_from_slice(&[1.0; 4]);
        }
        let input = Frame::from_floats(9, 3, data).unwrap();
        let out = blur(2.0, 0.0, &input);
        let mid = out.float_pixel(4, 1).unwrap()[0];
        let side = out.float_pixel(5, 1).unwrap()[0];
        assert!(mid < 1.0 && side > 0.0 && side < mid);
        assert_abs_diff_eq!(out.float_pixel(5, 0).unwrap()[0], side, epsilon = 1e-6);
        assert_eq!(out.float_pixel(0, 1).unwrap()[0], 0.0);
    }
}
