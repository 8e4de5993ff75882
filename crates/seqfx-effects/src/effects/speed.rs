//! Time remapping of a single input clip.
//!
//! The effect itself only decides *which* source frame is shown: the host
//! asks [`target_frame`] for the frame to fetch for each input slot, renders
//! those frames and hands them back as inputs. With interpolation enabled,
//! input 1 is the following whole frame and the two are dissolved by the
//! fractional part of the target.

use crate::context::{Curve, Scene};
use crate::effects::cross::CrossEffect;
use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Effect, EffectType};
use crate::strip::EffectStrip;
use seqfx_core::Frame;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// How the target frame is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedControl {
    /// Fit the whole source into the effect's length
    #[default]
    Stretch,
    /// Constant factor, or the integral of the speed-factor curve
    Multiply,
    /// Fixed position as a percentage of the source length
    Length,
    /// Explicit source frame
    FrameNumber,
}

/// Cached integral of the speed-factor curve, one entry per effect frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FrameMap {
    /// Built lazily on first use.
    #[default]
    Unbuilt,
    /// Built against one curve revision.
    Built {
        /// Curve revision the table was built from
        revision: u64,
        /// Source frame for each effect frame
        frames: Vec<f32>,
    },
}

/// Speed-control settings.
#[derive(Debug)]
pub struct SpeedParams {
    /// Remap strategy
    pub control: SpeedControl,
    /// Constant factor for [`SpeedControl::Multiply`] without a curve
    pub factor: f32,
    /// Target as a percentage of the source length
    pub length_percent: f32,
    /// Target for [`SpeedControl::FrameNumber`]
    pub frame_number: f32,
    /// Dissolve between neighbouring source frames
    pub interpolate: bool,
    frame_map: RwLock<FrameMap>,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            control: SpeedControl::Stretch,
            factor: 1.0,
            length_percent: 100.0,
            frame_number: 0.0,
            interpolate: false,
            frame_map: RwLock::new(FrameMap::Unbuilt),
        }
    }
}

impl Clone for SpeedParams {
    /// Copies the settings; the frame map starts out unbuilt.
    fn clone(&self) -> Self {
        Self {
            control: self.control,
            factor: self.factor,
            length_percent: self.length_percent,
            frame_number: self.frame_number,
            interpolate: self.interpolate,
            frame_map: RwLock::new(FrameMap::Unbuilt),
        }
    }
}

impl SpeedParams {
    /// Snapshot of the cached frame map.
    pub fn frame_map(&self) -> FrameMap {
        self.frame_map.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drops the cached frame map.
    pub fn reset_frame_map(&mut self) {
        *self.frame_map.get_mut().unwrap_or_else(PoisonError::into_inner) = FrameMap::Unbuilt;
    }

    /// Entry `index` of the frame map, rebuilding it for a new curve revision.
    fn mapped(&self, curve: &dyn Curve, left_handle: f32, effect_len: usize, source_len: f32, index: usize) -> f32 {
        let revision = curve.revision();
        {
            let map = self.frame_map.read().unwrap_or_else(PoisonError::into_inner);
            if let FrameMap::Built { revision: r, frames } = &*map {
                if *r == revision {
                    return lookup(frames, index);
                }
            }
        }
        let mut map = self.frame_map.write().unwrap_or_else(PoisonError::into_inner);
        let stale = !matches!(&*map, FrameMap::Built { revision: r, .. } if *r == revision);
        if stale {
            debug!(revision, effect_len, "rebuilding speed frame map");
            *map = FrameMap::Built {
                revision,
                frames: build_frame_map(curve, left_handle, effect_len, source_len),
            };
        }
        match &*map {
            FrameMap::Built { frames, .. } => lookup(frames, index),
            FrameMap::Unbuilt => 0.0,
        }
    }
}

fn lookup(frames: &[f32], index: usize) -> f32 {
    frames.get(index).or(frames.last()).copied().unwrap_or(0.0)
}

/// Integrates `curve` over the effect's frames.
///
/// Entry 0 is 0; every later entry adds the curve value at that timeline
/// frame, clamped to `[0, source_len]` after each step.
pub fn build_frame_map(curve: &dyn Curve, left_handle: f32, effect_len: usize, source_len: f32) -> Vec<f32> {
    if effect_len == 0 {
        return Vec::new();
    }
    let max = source_len.max(0.0);
    let mut frames = Vec::with_capacity(effect_len);
    frames.push(0.0);
    let mut acc = 0.0f32;
    for i in 1..effect_len {
        acc = (acc + curve.evaluate(left_handle + i as f32)).clamp(0.0, max);
        frames.push(acc);
    }
    frames
}

/// Source frame shown for input slot `input` at `timeline_frame`.
///
/// The result is relative to the strip's content start plus the remapped
/// offset, clamped to the input clip. With interpolation enabled, input 1
/// asks for the next whole frame.
pub fn target_frame(strip: &EffectStrip, scene: &dyn Scene, timeline_frame: f32, input: usize) -> EffectResult<f32> {
    let params = strip.params.speed()?;
    let timing = strip.timing;
    let source_len = strip.source_length.max(0.0);
    let effect_len = timing.length();
    let index = (timeline_frame - timing.left_handle).round().max(0.0);

    let target = match params.control {
        SpeedControl::Stretch if effect_len > 0.0 => source_len * index / effect_len,
        SpeedControl::Stretch => 0.0,
        SpeedControl::Multiply => match scene.speed_curve(strip.id) {
            Some(curve) => params.mapped(
                curve,
                timing.left_handle,
                effect_len.max(0.0) as usize,
                source_len,
                index as usize,
            ),
            None => index * params.factor,
        },
        SpeedControl::Length => source_len * params.length_percent / 100.0,
        SpeedControl::FrameNumber => params.frame_number,
    };
    let target = timing.start + target.clamp(0.0, source_len);

    if params.interpolate && input > 0 {
        Ok(target.ceil())
    } else {
        Ok(target)
    }
}

/// Dissolve factor between the two fetched frames.
pub fn interpolation_ratio(strip: &EffectStrip, scene: &dyn Scene, timeline_frame: f32) -> EffectResult<f32> {
    let target = target_frame(strip, scene, timeline_frame, 0)?;
    Ok(target - target.floor())
}

/// Shows the remapped frame of input 1.
#[derive(Debug, Clone, Copy)]
pub struct SpeedEffect;

impl Effect for SpeedEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Speed
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Speed(SpeedParams::default())
    }

    fn load(&self, params: &mut EffectParams, _scene: &dyn Scene) {
        if let Ok(p) = params.speed_mut() {
            p.reset_frame_map();
        }
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let interpolate = call.strip.params.speed()?.interpolate;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        if interpolate && call.input(1).is_some() {
            let fac = interpolation_ratio(call.strip, call.ctx.scene, call.timeline_frame)?;
            return CrossEffect.execute(&call.with_fac(fac));
        }
        Ok(inputs.frame(0).map(Frame::duplicate))
    }
}
