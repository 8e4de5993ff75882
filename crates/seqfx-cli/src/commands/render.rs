//! Render command: pushes two synthetic gradients through one effect.

use crate::RenderArgs;
use anyhow::{Context, Result, anyhow, bail};
use seqfx_blend::BlendMode;
use seqfx_core::PixelFormat;
use seqfx_effects::{Compositor, EffectStrip, EffectType, RenderContext, StripId, StripTiming, get_num_inputs};
use std::time::Instant;
use tracing::{debug, info};

use super::{CliScene, FrameSummary};

/// Strip length used for the default factor; frame 0 sits at its start.
const STRIP_LENGTH: f32 = 100.0;

/// Runs the render command.
pub fn run(args: RenderArgs, threads: usize) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("Frame size must be non-zero: {}x{}", args.width, args.height);
    }
    let effect_type: EffectType = args.effect.parse()?;
    let config = super::load_config(args.config.as_deref(), threads)?;
    let engine = Compositor::new(config).context("Failed to configure the engine")?;

    let mut strip = EffectStrip::new(StripId(1), effect_type, 3, StripTiming::new(0.0, STRIP_LENGTH));
    if let Some(mode) = &args.mode {
        let mode: BlendMode = mode.parse().map_err(|e| anyhow!("{e}"))?;
        let params = strip
            .params
            .color_mix_mut()
            .with_context(|| format!("--mode applies to color_mix, not {effect_type}"))?;
        params.blend_mode = mode;
    }

    let format = if args.float { PixelFormat::Float } else { PixelFormat::Byte };
    let a = super::gradient(args.width, args.height, 0, format)?;
    let b = super::gradient(args.width, args.height, 1, format)?;
    let inputs = match get_num_inputs(effect_type) {
        0 => [None, None, None],
        1 => [Some(&a), None, None],
        _ => [Some(&a), Some(&b), None],
    };
    debug!(effect = %effect_type, inputs = inputs.iter().flatten().count(), "inputs prepared");

    let scene = CliScene::with_fonts();
    let ctx = RenderContext::new(args.width, args.height, &scene);
    let frame = args.fac.map(|f| f * STRIP_LENGTH).unwrap_or(STRIP_LENGTH / 2.0);
    let start = Instant::now();
    let out = engine.render(&ctx, &mut strip, frame, args.fac, inputs)?;
    info!(effect = %effect_type, elapsed = ?start.elapsed(), "rendered");

    let Some(out) = out else {
        if args.json {
            println!("null");
        } else {
            println!("{effect_type}: no output");
        }
        return Ok(());
    };
    let summary = FrameSummary::of(&out);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("{effect_type}");
    println!("  Resolution: {}x{}", summary.width, summary.height);
    println!("  Format:     {}", summary.format);
    println!("  Mean RGBA:  {}", fmt_px(summary.mean));
    for (label, px) in ["top-left", "top-right", "bottom-left", "bottom-right"]
        .iter()
        .zip(summary.corners)
    {
        println!("  {:<12}{}", format!("{label}:"), fmt_px(px));
    }
    Ok(())
}

fn fmt_px(px: [f32; 4]) -> String {
    format!("{:.4} {:.4} {:.4} {:.4}", px[0], px[1], px[2], px[3])
}
