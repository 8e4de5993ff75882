//! Compositing front door.
//!
//! [`Compositor`] runs one effect call end to end: resolve the handle, load
//! the strip's resources once, settle the blend factor, take the early-out
//! and finally execute on the configured thread pool.

use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::EffectResult;
use crate::exec::{EffectCall, Schedule};
use crate::registry::{EarlyOut, resolve};
use crate::strip::EffectStrip;
use seqfx_core::Frame;
use tracing::{debug, trace};

/// Effect executor configured by an [`EngineConfig`].
///
/// # Example
///
/// ```rust
/// use seqfx_core::Frame;
/// use seqfx_effects::{Compositor, EffectStrip, EffectType, EmptyScene, EngineConfig, RenderContext, StripId, StripTiming};
///
/// let engine = Compositor::new(EngineConfig::default()).unwrap();
/// let ctx = RenderContext::new(2, 2, &EmptyScene);
/// let mut strip = EffectStrip::new(StripId(1), EffectType::Cross, 2, StripTiming::new(0.0, 10.0));
/// let a = Frame::filled_byte(2, 2, [0, 0, 0, 255]);
/// let b = Frame::filled_byte(2, 2, [255, 255, 255, 255]);
///
/// let out = engine.render(&ctx, &mut strip, 5.0, None, [Some(&a), Some(&b), None]).unwrap().unwrap();
/// assert_eq!(out.byte_pixel(0, 0).unwrap(), [128, 128, 128, 255]);
/// ```
#[derive(Debug)]
pub struct Compositor {
    config: EngineConfig,
    schedule: Schedule,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Compositor {
    /// Validates `config` and builds the worker pool it asks for.
    pub fn new(config: EngineConfig) -> EffectResult<Self> {
        config
            .validate()
            .map_err(|e| crate::error::EffectError::Config(e.to_string()))?;
        #[cfg(feature = "parallel")]
        let pool = if config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .thread_name(|index| format!("seqfx worker #{index}"))
                .build()
                .map_err(|e| crate::error::EffectError::Config(e.to_string()))?;
            Some(pool)
        } else {
            None
        };
        debug!(threads = config.threads, slice_rows = config.slice_rows, "compositor ready");
        Ok(Self {
            schedule: Schedule::from(&config),
            config,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Renders `strip` at `timeline_frame`.
    ///
    /// `fac` overrides the effect's default factor. Early-outs hand back
    /// the selected input without copying it; `Ok(None)` means the effect
    /// produced nothing (an empty channel or a missing early-out input).
    pub fn render(
        &self,
        ctx: &RenderContext<'_>,
        strip: &mut EffectStrip,
        timeline_frame: f32,
        fac: Option<f32>,
        inputs: [Option<&Frame>; 3],
    ) -> EffectResult<Option<Frame>> {
        let handle = resolve(strip.effect_type);
        handle.ensure_loaded(strip, ctx.scene);
        let strip: &EffectStrip = strip;

        let fac = fac.unwrap_or_else(|| handle.default_factor(strip, timeline_frame));
        let early = handle.early_out(&strip.params, fac);
        debug!(effect = %strip.effect_type, fac, ?early, "early out");
        match early {
            EarlyOut::UseInput1 => return Ok(inputs[0].cloned()),
            EarlyOut::UseInput2 => return Ok(inputs[1].cloned()),
            EarlyOut::DoEffect | EarlyOut::NoInput => {}
        }

        let call = EffectCall {
            schedule: self.schedule,
            ..EffectCall::new(ctx, strip, timeline_frame, fac, inputs)
        };
        trace!(width = ctx.width, height = ctx.height, "execute");
        self.install(|| handle.execute(&call))
    }

    #[cfg(feature = "parallel")]
    fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        f()
    }
}
