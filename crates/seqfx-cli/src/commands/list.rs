//! List command: every effect type with its inputs and capabilities.

use crate::ListArgs;
use anyhow::Result;
use seqfx_blend::BlendMode;
use seqfx_effects::{EffectType, resolve};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct EffectInfo {
    name: &'static str,
    inputs: usize,
    multithreaded: bool,
    supports_mask: bool,
}

fn describe(effect_type: EffectType) -> EffectInfo {
    let handle = resolve(effect_type);
    let caps = handle.capabilities();
    EffectInfo {
        name: effect_type.name(),
        inputs: handle.num_inputs(),
        multithreaded: caps.multithreaded,
        supports_mask: caps.supports_mask,
    }
}

/// Runs the list command.
pub fn run(args: ListArgs) -> Result<()> {
    let fixed = EffectType::all()
        .into_iter()
        .filter(|t| !matches!(t, EffectType::Blend(_)));
    let blends = BlendMode::ALL
        .into_iter()
        .map(EffectType::blend)
        .filter(|t| matches!(t, EffectType::Blend(_)));
    let effects: Vec<EffectInfo> = fixed.chain(blends).map(describe).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&effects)?);
        return Ok(());
    }

    println!("{:<16} {:>6}  {:<8} {}", "EFFECT", "INPUTS", "THREADS", "MASK");
    for e in &effects {
        println!(
            "{:<16} {:>6}  {:<8} {}",
            e.name,
            e.inputs,
            if e.multithreaded { "sliced" } else { "single" },
            if e.supports_mask { "yes" } else { "-" }
        );
    }
    Ok(())
}
