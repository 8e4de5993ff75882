//! Blend-mode compositing: a runtime mode, or the strip's own color-mix
//! settings.

use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Capabilities, EarlyOut, Effect, EffectType, early_out_mul_input1};
use crate::slice::{SliceMut, rows_of};
use seqfx_blend::{BlendMode, blend_slice_byte, blend_slice_float};
use std::ops::Range;

/// Color-mix settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMixParams {
    /// Blend mode applied
    pub blend_mode: BlendMode,
    /// Strength, used instead of the call's factor
    pub factor: f32,
}

impl Default for ColorMixParams {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Overlay,
            factor: 1.0,
        }
    }
}

fn blend_rows(mode: BlendMode, fac: f32, inputs: &Inputs, rows: &Range<usize>, out: SliceMut<'_>) {
    let row_len = inputs.row_len();
    match out {
        SliceMut::Byte(o) => blend_slice_byte(
            mode,
            fac,
            rows_of(inputs.bytes(0), row_len, rows),
            rows_of(inputs.bytes(1), row_len, rows),
            o,
        ),
        SliceMut::Float(o) => blend_slice_float(
            mode,
            fac,
            rows_of(inputs.floats(0), row_len, rows),
            rows_of(inputs.floats(1), row_len, rows),
            o,
        ),
    }
}

/// Input 2 blended onto input 1 with a fixed mode.
#[derive(Debug, Clone, Copy)]
pub struct BlendModeEffect(pub BlendMode);

impl Effect for BlendModeEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Blend(self.0)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        early_out_mul_input1(fac)
    }

    fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
        blend_rows(self.0, call.fac, inputs, &rows, out);
    }
}

/// Input 2 blended onto input 1 with the mode and factor stored on the strip.
#[derive(Debug, Clone, Copy)]
pub struct ColorMixEffect;

impl Effect for ColorMixEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::ColorMix
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: true,
            supports_mask: false,
        }
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::ColorMix(ColorMixParams::default())
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        early_out_mul_input1(fac)
    }

    fn execute(&self, call: &EffectCall<'_>) -> crate::error::EffectResult<Option<seqfx_core::Frame>> {
        let params = *call.strip.params.color_mix()?;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        let mut out = inputs.allocate_output(call.ctx)?;
        crate::slice::run_sliced(&mut out, call.schedule.slice_rows, |rows, slice| {
            blend_rows(params.blend_mode, params.factor, &inputs, &rows, slice)
        })?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{run, run2, strip};
    use seqfx_core::Frame;

    #[test]
    fn test_screen_bytes() {
        let a = Frame::filled_byte(2, 2, [128, 128, 128, 255]);
        let b = Frame::filled_byte(2, 2, [128, 128, 128, 255]);
        let out = run2(EffectType::Blend(BlendMode::Screen), 1.0, &a, &b);
        let px = out.byte_pixel(0, 0).unwrap();
        assert!((px[0] as i32 - 192).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_keeps_first_alpha() {
        let a = Frame::filled_float(2, 2, [0.3, 0.6, 0.9, 0.4]);
        let b = Frame::filled_float(2, 2, [0.9, 0.1, 0.5, 1.0]);
        for mode in BlendMode::ALL {
            let out = run2(EffectType::Blend(mode), 0.8, &a, &b);
            assert_eq!(out.float_pixel(1, 0).unwrap()[3], 0.4, "{mode}");
        }
    }

    #[test]
    fn test_color_mix_uses_stored_factor() {
        let a = Frame::filled_float(2, 2, [0.2, 0.2, 0.2, 1.0]);
        let b = Frame::filled_float(2, 2, [0.8, 0.8, 0.8, 1.0]);
        let mut s = strip(EffectType::ColorMix);
        *s.params.color_mix_mut().unwrap() = ColorMixParams {
            blend_mode: BlendMode::Lighten,
            factor: 0.0,
        };
        let out = run(&s, 1.0, [Some(&a), Some(&b), None]).unwrap().unwrap();
        assert_eq!(out.float_pixel(0, 0).unwrap(), [0.2, 0.2, 0.2, 1.0]);

        s.params.color_mix_mut().unwrap().factor = 1.0;
        let out = run(&s, 0.0, [Some(&a), Some(&b), None]).unwrap().unwrap();
        assert!((out.float_pixel(0, 0).unwrap()[0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_color_mix_rejects_wrong_params() {
        let a = Frame::filled_byte(2, 2, [0; 4]);
        let mut s = strip(EffectType::ColorMix);
        s.params = EffectParams::None;
        assert!(run(&s, 1.0, [Some(&a), Some(&a), None]).is_err());
    }
}
