//! Effect handle registry.
//!
//! [`EffectType`] is the closed set of effect kinds. [`resolve`] maps a type
//! to an [`EffectHandle`]: a copyable pointer to a static, stateless
//! [`Effect`] implementation. Resolution only reads static data, so it can
//! run concurrently from any thread.
//!
//! ```rust
//! use seqfx_effects::{EffectType, get_num_inputs, resolve};
//!
//! assert_eq!(get_num_inputs(EffectType::Cross), 2);
//! assert_eq!(get_num_inputs(EffectType::SolidColor), 0);
//! assert!(resolve(EffectType::Cross).capabilities().multithreaded);
//! ```

use crate::context::Scene;
use crate::effects::{
    alpha::{AlphaOverEffect, AlphaUnderEffect, OverDropEffect},
    arith::{AddEffect, MulEffect, SubEffect},
    blend_mode::{BlendModeEffect, ColorMixEffect},
    channel::{AdjustmentEffect, MulticamEffect},
    cross::{CrossEffect, GammaCrossEffect},
    gaussian::GaussianBlurEffect,
    glow::GlowEffect,
    solid::SolidColorEffect,
    speed::SpeedEffect,
    text::TextEffect,
    transform::TransformEffect,
    wipe::WipeEffect,
};
use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::slice::{SliceMut, run_sliced};
use crate::strip::{EffectStrip, LoadState};
use seqfx_blend::BlendMode;
use seqfx_core::Frame;
use std::fmt;
use std::ops::{Deref, Range};
use std::str::FromStr;
use tracing::debug;

/// Closed enumeration of effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectType {
    /// Linear dissolve
    Cross,
    /// Dissolve in a gamma-2 domain
    GammaCross,
    /// Additive (legacy)
    Add,
    /// Subtractive (legacy)
    Subtract,
    /// Multiplicative (legacy)
    Multiply,
    /// Premultiplied "over"
    AlphaOver,
    /// Premultiplied "under"
    AlphaUnder,
    /// Drop shadow followed by "over"
    OverDrop,
    /// Blend-mode compositing with a runtime mode
    Blend(BlendMode),
    /// Blend mode and factor stored on the strip
    ColorMix,
    /// Geometric reveal
    Wipe,
    /// Bloom
    Glow,
    /// Affine resample
    Transform,
    /// Time remap
    Speed,
    /// Constant fill
    SolidColor,
    /// Alternate channel
    Multicam,
    /// Channel below
    Adjustment,
    /// Separable gaussian
    GaussianBlur,
    /// Text overlay
    Text,
}

impl EffectType {
    /// Every fixed effect kind, plus the blend effect in its default mode.
    pub fn all() -> [EffectType; 19] {
        use EffectType::*;
        [
            Cross,
            GammaCross,
            Add,
            Subtract,
            Multiply,
            AlphaOver,
            AlphaUnder,
            OverDrop,
            Blend(BlendMode::default()),
            ColorMix,
            Wipe,
            Glow,
            Transform,
            Speed,
            SolidColor,
            Multicam,
            Adjustment,
            GaussianBlur,
            Text,
        ]
    }

    /// The effect compositing a strip with `mode`.
    ///
    /// Add, subtract and multiply map to the legacy arithmetic effects.
    pub fn blend(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Add => EffectType::Add,
            BlendMode::Subtract => EffectType::Subtract,
            BlendMode::Multiply => EffectType::Multiply,
            other => EffectType::Blend(other),
        }
    }

    /// Lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            EffectType::Cross => "cross",
            EffectType::GammaCross => "gamma_cross",
            EffectType::Add => "add",
            EffectType::Subtract => "subtract",
            EffectType::Multiply => "multiply",
            EffectType::AlphaOver => "alpha_over",
            EffectType::AlphaUnder => "alpha_under",
            EffectType::OverDrop => "over_drop",
            EffectType::Blend(mode) => mode.name(),
            EffectType::ColorMix => "color_mix",
            EffectType::Wipe => "wipe",
            EffectType::Glow => "glow",
            EffectType::Transform => "transform",
            EffectType::Speed => "speed",
            EffectType::SolidColor => "solid_color",
            EffectType::Multicam => "multicam",
            EffectType::Adjustment => "adjustment",
            EffectType::GaussianBlur => "gaussian_blur",
            EffectType::Text => "text",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown effect name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown effect: {0}")]
pub struct ParseEffectTypeError(pub String);

impl FromStr for EffectType {
    type Err = ParseEffectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let fixed = match key.as_str() {
            "cross" => Some(EffectType::Cross),
            "gamma_cross" | "gammacross" => Some(EffectType::GammaCross),
            "alpha_over" | "over" => Some(EffectType::AlphaOver),
            "alpha_under" | "under" => Some(EffectType::AlphaUnder),
            "over_drop" | "overdrop" => Some(EffectType::OverDrop),
            "color_mix" | "colormix" => Some(EffectType::ColorMix),
            "wipe" => Some(EffectType::Wipe),
            "glow" => Some(EffectType::Glow),
            "transform" => Some(EffectType::Transform),
            "speed" => Some(EffectType::Speed),
            "solid" | "solid_color" => Some(EffectType::SolidColor),
            "multicam" => Some(EffectType::Multicam),
            "adjustment" => Some(EffectType::Adjustment),
            "gaussian_blur" | "blur" => Some(EffectType::GaussianBlur),
            "text" => Some(EffectType::Text),
            _ => None,
        };
        if let Some(t) = fixed {
            return Ok(t);
        }
        key.parse::<BlendMode>()
            .map(EffectType::blend)
            .map_err(|_| ParseEffectTypeError(s.to_string()))
    }
}

/// Outcome of the pre-dispatch check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyOut {
    /// Run the algorithm.
    DoEffect,
    /// The output needs no input frames.
    NoInput,
    /// Return input 1 verbatim.
    UseInput1,
    /// Return input 2 verbatim.
    UseInput2,
}

/// Capability flags of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `execute_slice` may run on row ranges in parallel.
    pub multithreaded: bool,
    /// Masks may be applied to the output.
    pub supports_mask: bool,
}

/// Fade early-out: 0 keeps input 1, 1 lands on input 2.
pub fn early_out_fade(fac: f32) -> EarlyOut {
    if fac == 0.0 {
        EarlyOut::UseInput1
    } else if fac == 1.0 {
        EarlyOut::UseInput2
    } else {
        EarlyOut::DoEffect
    }
}

/// Factor 0 leaves input 1 untouched.
pub fn early_out_mul_input1(fac: f32) -> EarlyOut {
    if fac == 0.0 {
        EarlyOut::UseInput1
    } else {
        EarlyOut::DoEffect
    }
}

/// Factor 0 leaves input 2 untouched.
pub fn early_out_mul_input2(fac: f32) -> EarlyOut {
    if fac == 0.0 {
        EarlyOut::UseInput2
    } else {
        EarlyOut::DoEffect
    }
}

/// Position of `timeline_frame` within the strip's visible range, in `[0, 1]`.
pub fn fade_factor(strip: &EffectStrip, timeline_frame: f32) -> f32 {
    let length = strip.timing.length();
    if length <= 0.0 {
        return 0.0;
    }
    ((timeline_frame - strip.timing.left_handle) / length).clamp(0.0, 1.0)
}

/// One effect kind's behaviour.
///
/// Every method has a default so an implementation only overrides what it
/// needs. Implementations are stateless: per-strip state lives in
/// [`EffectParams`].
pub trait Effect: Send + Sync {
    /// Effect kind.
    fn effect_type(&self) -> EffectType;

    /// Number of input frames the algorithm reads.
    fn num_inputs(&self) -> usize {
        2
    }

    /// Capability flags.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Whether `init` swaps the strip's two inputs.
    fn swaps_inputs(&self) -> bool {
        false
    }

    /// Default parameters for a fresh strip.
    fn default_params(&self) -> EffectParams {
        EffectParams::None
    }

    /// Sets up a freshly created strip.
    fn init(&self, strip: &mut EffectStrip) {
        strip.params = self.default_params();
        if self.swaps_inputs() {
            strip.inputs.swap(0, 1);
        }
    }

    /// Acquires expensive resources; runs once per load cycle.
    fn load(&self, _params: &mut EffectParams, _scene: &dyn Scene) {}

    /// Deep copy for a duplicated strip; transient handles are reset.
    fn copy(&self, params: &EffectParams) -> EffectParams {
        params.clone()
    }

    /// Releases resources held by `params`.
    fn free(&self, params: &mut EffectParams, _scene: &dyn Scene) {
        *params = EffectParams::None;
    }

    /// Pre-dispatch classification.
    fn early_out(&self, _params: &EffectParams, _fac: f32) -> EarlyOut {
        EarlyOut::DoEffect
    }

    /// Factor used when the caller supplies none.
    fn default_factor(&self, _strip: &EffectStrip, _timeline_frame: f32) -> f32 {
        1.0
    }

    /// Rejects parameters of the wrong shape before the default
    /// [`Effect::execute`] allocates anything.
    fn check_params(&self, _params: &EffectParams) -> EffectResult<()> {
        Ok(())
    }

    /// Produces the output frame.
    ///
    /// The default checks the parameters, prepares the inputs, allocates the
    /// output and runs [`Effect::execute_slice`] over row slices.
    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        self.check_params(&call.strip.params)?;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        let mut out = inputs.allocate_output(call.ctx)?;
        run_sliced(&mut out, call.schedule.slice_rows, |rows, slice| {
            self.execute_slice(call, &inputs, rows, slice)
        })?;
        Ok(Some(out))
    }

    /// Writes the output rows `rows` into `out`.
    fn execute_slice(
        &self,
        _call: &EffectCall<'_>,
        _inputs: &Inputs,
        _rows: Range<usize>,
        _out: SliceMut<'_>,
    ) {
    }
}

static CROSS: CrossEffect = CrossEffect;
static GAMMA_CROSS: GammaCrossEffect = GammaCrossEffect;
static ADD: AddEffect = AddEffect;
static SUB: SubEffect = SubEffect;
static MUL: MulEffect = MulEffect;
static ALPHA_OVER: AlphaOverEffect = AlphaOverEffect;
static ALPHA_UNDER: AlphaUnderEffect = AlphaUnderEffect;
static OVER_DROP: OverDropEffect = OverDropEffect;
static COLOR_MIX: ColorMixEffect = ColorMixEffect;
static WIPE: WipeEffect = WipeEffect;
static GLOW: GlowEffect = GlowEffect;
static TRANSFORM: TransformEffect = TransformEffect;
static SPEED: SpeedEffect = SpeedEffect;
static SOLID: SolidColorEffect = SolidColorEffect;
static MULTICAM: MulticamEffect = MulticamEffect;
static ADJUSTMENT: AdjustmentEffect = AdjustmentEffect;
static GAUSSIAN: GaussianBlurEffect = GaussianBlurEffect;
static TEXT: TextEffect = TextEffect;

macro_rules! blend_statics {
    ($( $mode:ident => $name:ident ),* $(,)?) => {
        $( static $name: BlendModeEffect = BlendModeEffect(BlendMode::$mode); )*

        fn blend_effect(mode: BlendMode) -> &'static dyn Effect {
            match mode {
                $( BlendMode::$mode => &$name, )*
            }
        }
    };
}

blend_statics! {
    Add => BLEND_ADD,
    Subtract => BLEND_SUBTRACT,
    Multiply => BLEND_MULTIPLY,
    Darken => BLEND_DARKEN,
    ColorBurn => BLEND_COLOR_BURN,
    LinearBurn => BLEND_LINEAR_BURN,
    Screen => BLEND_SCREEN,
    Lighten => BLEND_LIGHTEN,
    Dodge => BLEND_DODGE,
    Overlay => BLEND_OVERLAY,
    SoftLight => BLEND_SOFT_LIGHT,
    HardLight => BLEND_HARD_LIGHT,
    PinLight => BLEND_PIN_LIGHT,
    LinearLight => BLEND_LINEAR_LIGHT,
    VividLight => BLEND_VIVID_LIGHT,
    Color => BLEND_COLOR,
    Hue => BLEND_HUE,
    Saturation => BLEND_SATURATION,
    Value => BLEND_VALUE,
    Difference => BLEND_DIFFERENCE,
    Exclusion => BLEND_EXCLUSION,
}

/// Resolved effect: a copyable reference to a static implementation.
#[derive(Clone, Copy)]
pub struct EffectHandle {
    effect: &'static dyn Effect,
}

impl EffectHandle {
    /// Runs `load` when the strip has not been loaded since creation or copy.
    pub fn ensure_loaded(&self, strip: &mut EffectStrip, scene: &dyn Scene) {
        if strip.load_state == LoadState::NotLoaded {
            self.effect.load(&mut strip.params, scene);
            strip.load_state = LoadState::Loaded;
            debug!(id = ?strip.id, effect = %strip.effect_type, "effect loaded");
        }
    }
}

impl Deref for EffectHandle {
    type Target = dyn Effect;

    fn deref(&self) -> &Self::Target {
        self.effect
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("effect_type", &self.effect.effect_type())
            .field("num_inputs", &self.effect.num_inputs())
            .field("capabilities", &self.effect.capabilities())
            .finish()
    }
}

/// Resolves an effect type to its handle.
pub fn resolve(effect_type: EffectType) -> EffectHandle {
    let effect: &'static dyn Effect = match effect_type {
        EffectType::Cross => &CROSS,
        EffectType::GammaCross => &GAMMA_CROSS,
        EffectType::Add => &ADD,
        EffectType::Subtract => &SUB,
        EffectType::Multiply => &MUL,
        EffectType::AlphaOver => &ALPHA_OVER,
        EffectType::AlphaUnder => &ALPHA_UNDER,
        EffectType::OverDrop => &OVER_DROP,
        EffectType::Blend(mode) => blend_effect(mode),
        EffectType::ColorMix => &COLOR_MIX,
        EffectType::Wipe => &WIPE,
        EffectType::Glow => &GLOW,
        EffectType::Transform => &TRANSFORM,
        EffectType::Speed => &SPEED,
        EffectType::SolidColor => &SOLID,
        EffectType::Multicam => &MULTICAM,
        EffectType::Adjustment => &ADJUSTMENT,
        EffectType::GaussianBlur => &GAUSSIAN,
        EffectType::Text => &TEXT,
    };
    EffectHandle { effect }
}

/// Handle implementing a strip's blend mode.
pub fn resolve_strip_blend(mode: BlendMode) -> EffectHandle {
    resolve(EffectType::blend(mode))
}

/// Input frames `effect_type` reads: 0, 1 or 2.
pub fn get_num_inputs(effect_type: EffectType) -> usize {
    resolve(effect_type).num_inputs()
}
