//! Input-selection effects: the output is a frame another channel already
//! rendered, fetched through the scene.

use crate::context::StripRef;
use crate::error::EffectResult;
use crate::exec::EffectCall;
use crate::params::EffectParams;
use crate::registry::{Capabilities, EarlyOut, Effect, EffectType};
use seqfx_core::Frame;
use tracing::debug;

/// Multicam settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MulticamParams {
    /// Channel to show; 0 shows nothing
    pub source_channel: u32,
}

/// Shows what a lower channel renders.
#[derive(Debug, Clone, Copy)]
pub struct MulticamEffect;

impl Effect for MulticamEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Multicam
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Multicam(MulticamParams::default())
    }

    fn early_out(&self, _params: &EffectParams, _fac: f32) -> EarlyOut {
        EarlyOut::NoInput
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let source = call.strip.params.multicam()?.source_channel;
        // Only channels below this strip, otherwise it would render itself.
        if source == 0 || source >= call.strip.channel {
            debug!(source, channel = call.strip.channel, "multicam source out of range");
            return Ok(None);
        }
        Ok(call
            .ctx
            .scene
            .render_channel(call.ctx, call.timeline_frame, source, Some(call.strip.strip_ref())))
    }
}

/// Shows the channel directly below, looking through enclosing meta strips
/// when nothing is there.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentEffect;

impl AdjustmentEffect {
    /// Frame the adjustment samples: the request clamped to the strip.
    pub fn clamp_frame(left: f32, right: f32, timeline_frame: f32) -> f32 {
        let last = (right - 1.0).max(left);
        timeline_frame.clamp(left, last)
    }
}

impl Effect for AdjustmentEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Adjustment
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multithreaded: false,
            supports_mask: true,
        }
    }

    fn early_out(&self, _params: &EffectParams, _fac: f32) -> EarlyOut {
        EarlyOut::NoInput
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let timing = call.strip.timing;
        let frame = Self::clamp_frame(timing.left_handle, timing.right_handle, call.timeline_frame);
        let scene = call.ctx.scene;

        let mut current: Option<StripRef> = Some(call.strip.strip_ref());
        for depth in 0..call.schedule.adjustment_max_depth {
            let Some(strip) = current else {
                break;
            };
            if strip.channel > 1 {
                if let Some(found) = scene.render_channel(call.ctx, frame, strip.channel - 1, Some(strip)) {
                    debug!(depth, channel = strip.channel - 1, "adjustment source found");
                    return Ok(Some(found));
                }
            }
            current = scene.parent_meta(strip.id);
        }
        debug!(id = ?call.strip.id, "adjustment found nothing below");
        Ok(None)
    }
}
