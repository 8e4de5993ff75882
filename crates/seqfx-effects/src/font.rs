//! Font backend interface used by the text effect.
//!
//! A backend shapes and rasterizes UTF-8 text. The engine never owns font
//! state itself: the text effect asks the scene for a backend, loads the
//! strip's font into it once and keeps only the returned [`FontId`].
//!
//! With the `text` feature, [`cosmic::CosmicFonts`] implements the backend
//! on top of `cosmic-text`.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "text")]
pub mod cosmic;

/// Backend-assigned identifier of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Where a font's data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Font file on disk
    File(PathBuf),
    /// Font data embedded in the project
    Memory {
        /// Unique name of the embedded font
        name: String,
        /// Raw TTF/OTF data
        data: Arc<[u8]>,
    },
}

/// Font loading failures.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The data is not a usable font.
    #[error("invalid font {name}: {reason}")]
    Invalid {
        /// Font name or path
        name: String,
        /// What was wrong
        reason: String,
    },
}

/// Shaping options for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Font size in pixels
    pub size: f32,
    /// Bold weight
    pub bold: bool,
    /// Italic style
    pub italic: bool,
    /// Wrap lines wider than this many pixels; `None` breaks on newlines only
    pub wrap_width: Option<f32>,
}

/// Extent of laid-out text, y up, relative to the first line's baseline
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextBounds {
    /// Left edge
    pub xmin: f32,
    /// Right edge
    pub xmax: f32,
    /// Bottom edge (below the last baseline, so usually negative)
    pub ymin: f32,
    /// Top edge
    pub ymax: f32,
}

impl TextBounds {
    /// Horizontal extent.
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }
}

/// Layout measurements of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    /// Block extent
    pub bounds: TextBounds,
    /// Number of laid-out lines
    pub lines: usize,
    /// Baseline-to-baseline distance
    pub line_height: f32,
    /// Lowest extent below a baseline (negative)
    pub descender: f32,
    /// Widest glyph advance of the font
    pub max_advance: f32,
}

/// Shapes and rasterizes text.
pub trait FontBackend: Sync {
    /// Loads a font and returns its identifier.
    fn load(&self, source: &FontSource) -> Result<FontId, FontError>;

    /// Releases a loaded font.
    fn unload(&self, _font: FontId) {}

    /// Measures `text`. `font` `None` selects the backend's default font.
    fn measure(&self, font: Option<FontId>, text: &str, style: &FontStyle) -> TextMetrics;

    /// Rasterizes `text` and calls `plot(dx, dy, coverage)` for every
    /// covered pixel.
    ///
    /// Offsets are relative to the first line's baseline origin with y
    /// pointing down; coverage is in `[0, 1]`.
    fn rasterize(&self, font: Option<FontId>, text: &str, style: &FontStyle, plot: &mut dyn FnMut(i32, i32, f32));
}
