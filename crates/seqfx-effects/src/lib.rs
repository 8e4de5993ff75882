//! # seqfx-effects
//!
//! Sequencer effect strips: the compositing algorithms, the registry that
//! maps an effect type to its behaviour and the row-sliced scheduler that
//! runs them in parallel.
//!
//! # Modules
//!
//! - [`registry`] - [`EffectType`], the [`Effect`] trait and [`resolve`]
//! - [`effects`] - one module per effect family
//! - [`engine`] - [`Compositor`], the call-level front door
//! - [`exec`] - per-call state and input validation
//! - [`slice`] - row slicing over the rayon pool
//! - [`context`] - render context and the host [`Scene`] interface
//! - [`font`] - font backend interface for the text effect
//!
//! # Example
//!
//! ```rust
//! use seqfx_core::Frame;
//! use seqfx_effects::{Compositor, EffectStrip, EffectType, EmptyScene, EngineConfig, RenderContext, StripId, StripTiming};
//!
//! let engine = Compositor::new(EngineConfig::default()).unwrap();
//! let ctx = RenderContext::new(8, 8, &EmptyScene);
//! let mut strip = EffectStrip::new(StripId(1), EffectType::AlphaOver, 2, StripTiming::new(0.0, 25.0));
//!
//! let bg = Frame::filled_byte(8, 8, [0, 0, 255, 255]);
//! let fg = Frame::filled_byte(8, 8, [255, 0, 0, 255]);
//! let out = engine.render(&ctx, &mut strip, 0.0, Some(1.0), [Some(&bg), Some(&fg), None]).unwrap();
//! assert!(out.is_some());
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - slices run on rayon
//! - `text` - `cosmic-text` font backend

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod context;
pub mod effects;
pub mod engine;
pub mod error;
pub mod exec;
pub mod font;
pub mod params;
pub mod registry;
pub mod sample;
pub mod slice;
pub mod strip;

pub use config::{ConfigError, EngineConfig};
pub use context::{Curve, EmptyScene, RenderContext, Scene, StripRef};
pub use engine::Compositor;
pub use error::{EffectError, EffectResult};
pub use params::EffectParams;
pub use registry::{EarlyOut, Effect, EffectHandle, EffectType, get_num_inputs, resolve, resolve_strip_blend};
pub use strip::{EffectStrip, LoadState, StripId, StripTiming};
