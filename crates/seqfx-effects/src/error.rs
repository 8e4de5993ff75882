//! Error types for effect execution.
//!
//! Effects treat degenerate parameters (zero radius, zero edge width, a
//! factor outside `[0, 1]`) as behaviour, not failure. Errors are reserved
//! for calls that break the engine's contract.

use crate::registry::EffectType;
use seqfx_core::FrameError;
use thiserror::Error;

/// Result type for effect operations.
pub type EffectResult<T> = Result<T, EffectError>;

/// Errors raised at the effect call boundary.
#[derive(Error, Debug)]
pub enum EffectError {
    /// A required input frame was not supplied.
    #[error("{effect} needs input {index}, none supplied")]
    MissingInput {
        /// Effect being executed
        effect: EffectType,
        /// Zero-based input slot
        index: usize,
    },

    /// Parameters stored on the strip do not match its effect type.
    #[error("{effect} parameters requested, strip holds {found}")]
    ParamsMismatch {
        /// Shape that was asked for
        effect: &'static str,
        /// Shape actually stored
        found: &'static str,
    },

    /// An input frame does not match the render size.
    #[error("input {index} is {width}x{height}, render size is {expected_width}x{expected_height}")]
    SizeMismatch {
        /// Zero-based input slot
        index: usize,
        /// Input width
        width: u32,
        /// Input height
        height: u32,
        /// Render width
        expected_width: u32,
        /// Render height
        expected_height: u32,
    },

    /// Frame construction failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The engine could not be configured.
    #[error("configuration: {0}")]
    Config(String),
}
