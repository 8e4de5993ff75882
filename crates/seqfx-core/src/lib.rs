//! # seqfx-core
//!
//! Frame buffers for the seqfx sequencer compositing engine.
//!
//! - [`Frame`] - RGBA buffer with byte and/or float storage, shared copy-on-write
//! - [`PixelFormat`] - which representation a buffer carries
//! - [`Rect`] - signed integer rectangle used for clipped fills
//! - [`pixel`] - straight/premultiplied and byte/float conversions
//!
//! ## Crate Structure
//!
//! ```text
//! seqfx-core (this crate)
//!    ^
//!    +-- seqfx-blend (per-pixel blend modes)
//!    +-- seqfx-effects (effect algorithms, registry, scheduler)
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod pixel;
pub mod rect;

pub use error::{FrameError, FrameResult};
pub use frame::{Frame, PixelFormat};
pub use pixel::CHANNELS;
pub use rect::Rect;
