//! The slice of strip state the engine reads and owns.
//!
//! A host timeline keeps one [`EffectStrip`] per effect-strip; its
//! [`EffectParams`] are created, lazily loaded, copied and released only
//! through the effect's handle so their shape always matches the type tag.

use crate::context::Scene;
use crate::params::EffectParams;
use crate::registry::{EffectType, resolve};
use seqfx_blend::BlendMode;
use tracing::debug;

/// Opaque strip identity assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StripId(pub u64);

/// Placement of a strip on the timeline, in frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripTiming {
    /// Frame the content starts at (may precede the left handle)
    pub start: f32,
    /// First visible frame
    pub left_handle: f32,
    /// One past the last visible frame
    pub right_handle: f32,
}

impl StripTiming {
    /// Timing whose content and handles coincide.
    pub fn new(left_handle: f32, right_handle: f32) -> Self {
        Self {
            start: left_handle,
            left_handle,
            right_handle,
        }
    }

    /// Visible length in frames.
    #[inline]
    pub fn length(&self) -> f32 {
        self.right_handle - self.left_handle
    }
}

/// Whether the handle's `load` has run since creation, read or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// `load` still has to run before the next execution.
    #[default]
    NotLoaded,
    /// Expensive resources have been acquired.
    Loaded,
}

/// Effect strip state consumed by the engine.
///
/// Cloning keeps the identity but, like [`EffectStrip::duplicate`], leaves
/// the clone unloaded: transient handles in the parameters are not shared.
#[derive(Debug)]
pub struct EffectStrip {
    /// Identity
    pub id: StripId,
    /// Effect type tag
    pub effect_type: EffectType,
    /// Channel (1 is the bottom)
    pub channel: u32,
    /// Timeline placement
    pub timing: StripTiming,
    /// Length of the single input clip, in frames (speed effect)
    pub source_length: f32,
    /// Input strips, in compositing order
    pub inputs: [Option<StripId>; 2],
    /// Effect parameters, shaped by `effect_type`
    pub params: EffectParams,
    /// Lazy-load flag
    pub load_state: LoadState,
    /// Blend mode used when this strip is composited onto lower channels
    pub blend_mode: Option<BlendMode>,
}

impl Clone for EffectStrip {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            load_state: LoadState::NotLoaded,
            ..self.clone_shallow()
        }
    }
}

impl EffectStrip {
    /// Creates a strip and runs the effect's `init`.
    pub fn new(id: StripId, effect_type: EffectType, channel: u32, timing: StripTiming) -> Self {
        Self::with_inputs(id, effect_type, channel, timing, [None, None])
    }

    /// Creates a strip over the given inputs and runs the effect's `init`.
    ///
    /// Effects that composite "upper over lower" swap the two inputs here.
    pub fn with_inputs(
        id: StripId,
        effect_type: EffectType,
        channel: u32,
        timing: StripTiming,
        inputs: [Option<StripId>; 2],
    ) -> Self {
        let mut strip = Self {
            id,
            effect_type,
            channel,
            timing,
            source_length: timing.length(),
            inputs,
            params: EffectParams::None,
            load_state: LoadState::NotLoaded,
            blend_mode: None,
        };
        resolve(effect_type).init(&mut strip);
        debug!(?id, %effect_type, "effect strip initialized");
        strip
    }

    /// Copies the strip under a new identity.
    ///
    /// Parameters go through the handle's `copy`, which deep-copies owned
    /// data and resets transient handles; the copy must be loaded again.
    pub fn duplicate(&self, id: StripId) -> Self {
        let handle = resolve(self.effect_type);
        Self {
            id,
            params: handle.copy(&self.params),
            load_state: LoadState::NotLoaded,
            ..self.clone_shallow()
        }
    }

    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id,
            effect_type: self.effect_type,
            channel: self.channel,
            timing: self.timing,
            source_length: self.source_length,
            inputs: self.inputs,
            params: EffectParams::None,
            load_state: self.load_state,
            blend_mode: self.blend_mode,
        }
    }

    /// Runs the handle's `free` on the parameters.
    pub fn release(&mut self, scene: &dyn Scene) {
        resolve(self.effect_type).free(&mut self.params, scene);
        self.load_state = LoadState::NotLoaded;
    }

    /// Marks the parameters as freshly read from storage.
    pub fn mark_unloaded(&mut self) {
        self.load_state = LoadState::NotLoaded;
    }

    /// Reference used by the parent-chain walk.
    pub fn strip_ref(&self) -> crate::context::StripRef {
        crate::context::StripRef {
            id: self.id,
            channel: self.channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EmptyScene;

    #[test]
    fn test_new_runs_init() {
        let strip = EffectStrip::new(StripId(1), EffectType::Wipe, 3, StripTiming::new(0.0, 10.0));
        assert!(matches!(strip.params, EffectParams::Wipe(_)));
        assert_eq!(strip.load_state, LoadState::NotLoaded);
        assert_eq!(strip.source_length, 10.0);
    }

    #[test]
    fn test_alpha_over_swaps_inputs() {
        let strip = EffectStrip::with_inputs(
            StripId(1),
            EffectType::AlphaOver,
            3,
            StripTiming::new(0.0, 10.0),
            [Some(StripId(10)), Some(StripId(20))],
        );
        assert_eq!(strip.inputs, [Some(StripId(20)), Some(StripId(10))]);
    }

    #[test]
    fn test_duplicate_resets_load_state() {
        let mut strip = EffectStrip::new(StripId(1), EffectType::Glow, 2, StripTiming::new(0.0, 5.0));
        strip.load_state = LoadState::Loaded;
        let copy = strip.duplicate(StripId(2));
        assert_eq!(copy.id, StripId(2));
        assert_eq!(copy.load_state, LoadState::NotLoaded);
        assert!(matches!(copy.params, EffectParams::Glow(_)));
    }

    #[test]
    fn test_clone_must_reload() {
        let mut strip = EffectStrip::new(StripId(4), EffectType::Wipe, 2, StripTiming::new(0.0, 5.0));
        strip.load_state = LoadState::Loaded;
        let copy = strip.clone();
        assert_eq!(copy.id, StripId(4));
        assert_eq!(copy.load_state, LoadState::NotLoaded);
        assert!(matches!(copy.params, EffectParams::Wipe(_)));
    }

    #[test]
    fn test_release_clears_params() {
        let mut strip = EffectStrip::new(StripId(1), EffectType::Transform, 2, StripTiming::new(0.0, 5.0));
        strip.release(&EmptyScene);
        assert!(matches!(strip.params, EffectParams::None));
    }
}
