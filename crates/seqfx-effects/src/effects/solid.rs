//! Constant color fill.

use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{EarlyOut, Effect, EffectType};
use crate::slice::SliceMut;
use seqfx_core::CHANNELS;
use seqfx_core::pixel::unit_to_byte;
use std::ops::Range;

/// Fill color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColorParams {
    /// RGB in `[0, 1]`; the fill is always opaque
    pub color: [f32; 3],
}

impl Default for SolidColorParams {
    fn default() -> Self {
        Self { color: [0.5; 3] }
    }
}

/// Fills the output with one opaque color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColorEffect;

impl Effect for SolidColorEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::SolidColor
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::SolidColor(SolidColorParams::default())
    }

    fn early_out(&self, _params: &EffectParams, _fac: f32) -> EarlyOut {
        EarlyOut::NoInput
    }

    fn check_params(&self, params: &EffectParams) -> EffectResult<()> {
        params.solid_color().map(|_| ())
    }

    fn execute_slice(&self, call: &EffectCall<'_>, _inputs: &Inputs, _rows: Range<usize>, out: SliceMut<'_>) {
        let Ok(params) = call.strip.params.solid_color() else {
            return;
        };
        let [r, g, b] = params.color;
        match out {
            SliceMut::Byte(o) => {
                let px = [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), 255];
                o.chunks_exact_mut(CHANNELS).for_each(|d| d.copy_from_slice(&px));
            }
            SliceMut::Float(o) => {
                let px = [r, g, b, 1.0];
                o.chunks_exact_mut(CHANNELS).for_each(|d| d.copy_from_slice(&px));
            }
        }
    }
}
