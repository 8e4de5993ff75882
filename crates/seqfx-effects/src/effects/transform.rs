//! Affine transform around the frame centre.
//!
//! Every output pixel is mapped back into the input: translation is undone
//! first, then rotation, then scale, and the result is re-centred. The
//! mapping runs in a y-up plane so positive rotation is counter-clockwise
//! on screen.

use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Capabilities, Effect, EffectType};
use crate::sample::{Interpolation, Source};
use crate::slice::SliceMut;
use glam::{Mat2, Vec2};
use seqfx_core::pixel::{f32_to_u8, store};
use std::ops::Range;

/// Transform settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    /// Scale factors (x, y)
    pub scale: Vec2,
    /// Offset: percent of the frame size, or pixels at full render size
    pub translate: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Translation is a percentage of the frame size
    pub percent: bool,
    /// Use the x scale for both axes
    pub uniform_scale: bool,
    /// Resampler
    pub interpolation: Interpolation,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            translate: Vec2::ZERO,
            rotation: 0.0,
            percent: true,
            uniform_scale: false,
            interpolation: Interpolation::Bilinear,
        }
    }
}

/// Output-to-input mapping for one call.
#[derive(Debug, Clone, Copy)]
pub struct InverseMap {
    centre: Vec2,
    pivot: Vec2,
    rotation: Mat2,
    scale: Vec2,
    height: f32,
}

impl InverseMap {
    /// Builds the mapping for a `width` x `height` output.
    ///
    /// `proxy_scale` converts absolute translations to this render's pixels.
    pub fn new(params: &TransformParams, width: usize, height: usize, proxy_scale: f32) -> Self {
        let size = Vec2::new(width as f32, height as f32);
        let centre = size / 2.0;
        let pivot = if params.percent {
            size * params.translate / 100.0 + centre
        } else {
            params.translate * proxy_scale + centre
        };
        let scale = if params.uniform_scale {
            Vec2::splat(params.scale.x)
        } else {
            params.scale
        };
        Self {
            centre,
            pivot,
            rotation: Mat2::from_angle(-params.rotation.to_radians()),
            scale,
            height: size.y,
        }
    }

    /// `true` when the transform collapses the image.
    pub fn is_degenerate(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0
    }

    /// Input position `(u, v)` read by output pixel `(col, row)`.
    #[inline]
    pub fn source(&self, col: usize, row: usize) -> Vec2 {
        let up = Vec2::new(col as f32, self.height - 1.0 - row as f32);
        let p = self.rotation * (up - self.pivot) / self.scale + self.centre;
        Vec2::new(p.x, self.height - 1.0 - p.y)
    }
}

/// Resamples input 1 through the inverse affine map.
#[derive(Debug, Clone, Copy)]
pub struct TransformEffect;

impl Effect for TransformEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Transform
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Transform(TransformParams::default())
    }

    fn check_params(&self, params: &EffectParams) -> EffectResult<()> {
        params.transform().map(|_| ())
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        let (Ok(params), Some(src)) = (call.strip.params.transform(), inputs.frame(0).and_then(Source::new))
        else {
            return;
        };
        let map = InverseMap::new(params, inputs.width(), inputs.height(), call.ctx.proxy_scale());
        if map.is_degenerate() {
            return;
        }
        let width = inputs.width();
        let filter = params.interpolation;
        match out {
            SliceMut::Byte(o) => {
                for (r, row) in rows.enumerate() {
                    for col in 0..width {
                        let p = map.source(col, row);
                        store(o, r * width + col, f32_to_u8(src.sample(filter, p.x, p.y)));
                    }
                }
            }
            SliceMut::Float(o) => {
                for (r, row) in rows.enumerate() {
                    for col in 0..width {
                        let p = map.source(col, row);
                        store(o, r * width + col, src.sample(filter, p.x, p.y));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{gradient_byte, run, strip};
    use crate::error::EffectError;
    use approx::assert_abs_diff_eq;
    use seqfx_core::Frame;

    fn transform(params: TransformParams, input: &Frame) -> Frame {
        let mut s = strip(EffectType::Transform);
        *s.params.transform_mut().unwrap() = params;
        run(&s, 1.0, [Some(input), None, None]).unwrap().unwrap()
    }

    #[test]
    fn test_identity() {
        let input = gradient_byte(9, 7, 3);
        for interpolation in [Interpolation::Nearest, Interpolation::Bilinear] {
            let out = transform(
                TransformParams {
                    interpolation,
                    ..Default::default()
                },
                &input,
            );
            assert_eq!(out.bytes(), input.bytes(), "{interpolation:?}");
        }
    }

    #[test]
    fn test_translate_percent_moves_right() {
        let mut data = vec![0u8; 10 * 2 * 4];
        data[3] = 255; // (0, 0) opaque black
        let input = Frame::from_bytes(10, 2, data).unwrap();
        let out = transform(
            TransformParams {
                translate: Vec2::new(30.0, 0.0),
                interpolation: Interpolation::Nearest,
                ..Default::default()
            },
            &input,
        );
        assert_eq!(out.byte_pixel(3, 0).unwrap()[3], 255);
        assert_eq!(out.byte_pixel(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_positive_y_moves_up() {
        let mut data = vec![0u8; 4 * 4 * 4];
        let i = (3 * 4 + 1) * 4; // (1, 3), bottom row
        data[i + 3] = 255;
        let input = Frame::from_bytes(4, 4, data).unwrap();
        let out = transform(
            TransformParams {
                translate: Vec2::new(0.0, 2.0),
                percent: false,
                interpolation: Interpolation::Nearest,
                ..Default::default()
            },
            &input,
        );
        assert_eq!(out.byte_pixel(1, 1).unwrap()[3], 255);
    }

    #[test]
    fn test_zero_scale_is_transparent() {
        let input = Frame::filled_float(4, 4, [1.0, 1.0, 1.0, 1.0]);
        let out = transform(
            TransformParams {
                scale: Vec2::ZERO,
                ..Default::default()
            },
            &input,
        );
        assert!(out.floats().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_uniform_scale_uses_x() {
        let map = InverseMap::new(
            &TransformParams {
                scale: Vec2::new(2.0, 0.0),
                uniform_scale: true,
                ..Default::default()
            },
            8,
            8,
            1.0,
        );
        assert!(!map.is_degenerate());
        // Doubling: output (6, 6) in y-up around centre (4, 4) reads (5, 5).
        let p = map.source(6, 1);
        assert_abs_diff_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_half_turn() {
        let map = InverseMap::new(
            &TransformParams {
                rotation: 180.0,
                ..Default::default()
            },
            8,
            8,
            1.0,
        );
        let p = map.source(5, 2);
        // Point mirrored through the centre (4, 4) in y-up: (5, 5) -> (3, 3).
        assert_abs_diff_eq!(p.x, 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_absolute_translation_uses_proxy_scale() {
        let params = TransformParams {
            translate: Vec2::new(4.0, 0.0),
            percent: false,
            ..Default::default()
        };
        let full = InverseMap::new(&params, 8, 8, 1.0);
        let half = InverseMap::new(&params, 8, 8, 0.5);
        assert_abs_diff_eq!(full.source(6, 0).x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(half.source(6, 0).x, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_wrong_params_are_rejected() {
        let mut s = strip(EffectType::Transform);
        s.params = EffectParams::None;
        let input = gradient_byte(4, 4, 1);
        let err = run(&s, 1.0, [Some(&input), None, None]).unwrap_err();
        assert!(matches!(err, EffectError::ParamsMismatch { effect: "transform", .. }));
    }
}
