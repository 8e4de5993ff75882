//! Error types for frame buffer operations.
//!
//! Frame errors only describe caller contract violations: buffers whose
//! length does not match their dimensions, frames of different sizes handed
//! to the same operation, or a representation that is not present.
//!
//! # Usage
//!
//! ```rust
//! use seqfx_core::{Frame, FrameError};
//!
//! let err = Frame::from_bytes(2, 2, vec![0u8; 3]).unwrap_err();
//! assert!(matches!(err, FrameError::BufferSize { .. }));
//! ```

use crate::frame::PixelFormat;
use thiserror::Error;

/// Result type alias using [`FrameError`].
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Errors raised by [`crate::Frame`] construction and access.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Width or height is zero, or the sample count overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// Supplied pixel data does not hold `width * height * 4` samples.
    #[error("buffer holds {got} samples, expected {expected}")]
    BufferSize {
        /// Expected sample count
        expected: usize,
        /// Actual sample count
        got: usize,
    },

    /// Two frames that must share a size do not.
    #[error("size mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    SizeMismatch {
        /// First frame width
        a_width: u32,
        /// First frame height
        a_height: u32,
        /// Second frame width
        b_width: u32,
        /// Second frame height
        b_height: u32,
    },

    /// The requested representation is not populated on this frame.
    #[error("frame has no {0:?} storage")]
    MissingStorage(PixelFormat),
}

impl FrameError {
    /// Creates a [`FrameError::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates a [`FrameError::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::SizeMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }
}
