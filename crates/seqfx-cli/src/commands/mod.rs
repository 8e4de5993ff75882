//! CLI command implementations

pub mod config;
pub mod list;
pub mod render;

use anyhow::{Context, Result};
use seqfx_core::pixel::unit_to_byte;
use seqfx_core::{Frame, PixelFormat};
use seqfx_effects::EngineConfig;
use seqfx_effects::font::FontBackend;
use seqfx_effects::Scene;
use serde::Serialize;
use std::path::Path;

/// Loads the engine configuration, applying the global `--threads`.
pub fn load_config(path: Option<&Path>, threads: usize) -> Result<EngineConfig> {
    let mut cfg = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if threads > 0 {
        cfg.threads = threads;
    }
    Ok(cfg)
}

/// Diagonal RGBA gradient; `seed` shifts the hue so two inputs differ.
pub fn gradient(width: u32, height: u32, seed: u32, format: PixelFormat) -> Result<Frame> {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / w;
            let v = y as f32 / h;
            let px = if seed % 2 == 0 {
                [u, v, 1.0 - u, 1.0]
            } else {
                [1.0 - v, u * v, v, 0.5 + 0.5 * u]
            };
            data.extend_from_slice(&px);
        }
    }
    Ok(match format {
        PixelFormat::Float => Frame::from_floats(width, height, data)?,
        PixelFormat::Byte => Frame::from_bytes(width, height, data.into_iter().map(unit_to_byte).collect())?,
    })
}

/// Printable digest of a frame.
#[derive(Debug, Serialize)]
pub struct FrameSummary {
    /// Storage kind
    pub format: &'static str,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Mean RGBA in `[0, 1]`
    pub mean: [f32; 4],
    /// Top-left, top-right, bottom-left, bottom-right
    pub corners: [[f32; 4]; 4],
}

impl FrameSummary {
    /// Summarizes `frame`.
    pub fn of(frame: &Frame) -> Self {
        let (width, height) = frame.dimensions();
        let mut sum = [0.0f64; 4];
        for y in 0..height {
            for x in 0..width {
                let px = frame.pixel_f32(x, y).unwrap_or_default();
                for (s, v) in sum.iter_mut().zip(px) {
                    *s += v as f64;
                }
            }
        }
        let n = (frame.pixel_count().max(1)) as f64;
        let (r, b) = (width.saturating_sub(1), height.saturating_sub(1));
        let corner = |x, y| frame.pixel_f32(x, y).unwrap_or_default();
        Self {
            format: match frame.format() {
                PixelFormat::Byte => "byte",
                PixelFormat::Float => "float",
            },
            width,
            height,
            mean: sum.map(|s| (s / n) as f32),
            corners: [corner(0, 0), corner(r, 0), corner(0, b), corner(r, b)],
        }
    }
}

/// Scene the CLI renders in: no timeline, optionally system fonts.
#[derive(Default)]
pub struct CliScene {
    #[cfg(feature = "text")]
    fonts: Option<seqfx_effects::font::cosmic::CosmicFonts>,
}

impl CliScene {
    /// Scene with the system fonts loaded when the `text` feature is on.
    pub fn with_fonts() -> Self {
        Self {
            #[cfg(feature = "text")]
            fonts: Some(seqfx_effects::font::cosmic::CosmicFonts::new()),
        }
    }
}

impl Scene for CliScene {
    fn fonts(&self) -> Option<&dyn FontBackend> {
        #[cfg(feature = "text")]
        {
            self.fonts.as_ref().map(|f| f as &dyn FontBackend)
        }
        #[cfg(not(feature = "text"))]
        {
            None
        }
    }
}
