//! Per-call execution state.
//!
//! [`EffectCall`] bundles what one compositing call needs; [`Inputs`] is the
//! validated, format-unified view of the supplied frames that algorithms
//! read from.

use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::{EffectError, EffectResult};
use crate::strip::EffectStrip;
use seqfx_core::{CHANNELS, Frame, PixelFormat};
use tracing::debug;

/// Slice sizes and walk bounds taken from the engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Rows per slice for per-pixel effects
    pub slice_rows: usize,
    /// Rows per slice inside each blur pass
    pub blur_slice_rows: usize,
    /// Parent-walk bound of the adjustment effect
    pub adjustment_max_depth: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for Schedule {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            slice_rows: cfg.slice_rows.max(1),
            blur_slice_rows: cfg.blur_slice_rows.max(1),
            adjustment_max_depth: cfg.adjustment_max_depth.max(1),
        }
    }
}

/// One compositing call.
#[derive(Debug, Clone, Copy)]
pub struct EffectCall<'a> {
    /// Render size and scene
    pub ctx: &'a RenderContext<'a>,
    /// Strip being rendered
    pub strip: &'a EffectStrip,
    /// Timeline frame being rendered
    pub timeline_frame: f32,
    /// Blend factor
    pub fac: f32,
    /// Up to three input frames
    pub inputs: [Option<&'a Frame>; 3],
    /// Slice sizes
    pub schedule: Schedule,
}

impl<'a> EffectCall<'a> {
    /// Call with the default schedule.
    pub fn new(
        ctx: &'a RenderContext<'a>,
        strip: &'a EffectStrip,
        timeline_frame: f32,
        fac: f32,
        inputs: [Option<&'a Frame>; 3],
    ) -> Self {
        Self {
            ctx,
            strip,
            timeline_frame,
            fac,
            inputs,
            schedule: Schedule::default(),
        }
    }

    /// Input `index`, if supplied.
    #[inline]
    pub fn input(&self, index: usize) -> Option<&'a Frame> {
        self.inputs.get(index).copied().flatten()
    }

    /// Same call with a different factor.
    pub fn with_fac(&self, fac: f32) -> Self {
        Self { fac, ..*self }
    }

    /// Same call over different inputs.
    pub fn with_inputs(&self, inputs: [Option<&'a Frame>; 3]) -> Self {
        Self { inputs, ..*self }
    }
}

/// Inputs validated against the render size and unified to one format.
///
/// The format is float when any supplied input carries float storage,
/// byte otherwise.
#[derive(Debug, Clone)]
pub struct Inputs {
    format: PixelFormat,
    width: u32,
    height: u32,
    frames: [Option<Frame>; 3],
}

impl Inputs {
    /// Checks that the first `required` inputs are present and match the
    /// render size.
    ///
    /// Optional inputs past `required` are kept when they match and
    /// dropped otherwise; they never fail the call.
    pub fn prepare(call: &EffectCall<'_>, required: usize) -> EffectResult<Self> {
        let (width, height) = (call.ctx.width, call.ctx.height);
        let mut kept: [Option<&Frame>; 3] = [None; 3];
        for (index, slot) in call.inputs.iter().enumerate() {
            match slot {
                None if index < required => {
                    return Err(EffectError::MissingInput {
                        effect: call.strip.effect_type,
                        index,
                    });
                }
                Some(f) if f.dimensions() != (width, height) => {
                    if index < required {
                        return Err(EffectError::SizeMismatch {
                            index,
                            width: f.width(),
                            height: f.height(),
                            expected_width: width,
                            expected_height: height,
                        });
                    }
                    debug!(index, width = f.width(), height = f.height(), "mis-sized optional input ignored");
                }
                Some(f) => kept[index] = Some(*f),
                None => {}
            }
        }
        let format = if kept.iter().flatten().any(|f| f.has_float()) {
            PixelFormat::Float
        } else {
            PixelFormat::Byte
        };
        let frames = kept.map(|slot| slot.map(|f| f.to_format(format)));
        Ok(Self {
            format,
            width,
            height,
            frames,
        })
    }

    /// Storage kind the algorithm runs in.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Render width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Render height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Samples per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Input `index` in the unified format.
    #[inline]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index).and_then(Option::as_ref)
    }

    /// Byte samples of input `index`; empty when absent.
    #[inline]
    pub fn bytes(&self, index: usize) -> &[u8] {
        self.frame(index).and_then(Frame::bytes).unwrap_or(&[])
    }

    /// Float samples of input `index`; empty when absent.
    #[inline]
    pub fn floats(&self, index: usize) -> &[f32] {
        self.frame(index).and_then(Frame::floats).unwrap_or(&[])
    }

    /// Zeroed output in the unified format.
    pub fn allocate_output(&self, ctx: &RenderContext<'_>) -> EffectResult<Frame> {
        Ok(Frame::allocate(ctx.width, ctx.height, self.format)?)
    }
}
