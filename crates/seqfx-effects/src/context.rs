//! Render context and the collaborator interfaces the engine consumes.
//!
//! The scene/strip data model lives outside this crate. Effects reach it
//! only through [`Scene`]: re-rendering another channel (multicam,
//! adjustment), walking enclosing meta strips, sampling the speed curve and
//! obtaining a font backend.

use crate::font::FontBackend;
use crate::strip::StripId;
use seqfx_core::Frame;

/// Keyframe curve evaluator.
pub trait Curve: Sync {
    /// Value at `frame`.
    fn evaluate(&self, frame: f32) -> f32;

    /// Changes whenever the curve is edited; caches keyed on it rebuild.
    fn revision(&self) -> u64 {
        0
    }
}

/// A strip seen through the parent-chain accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StripRef {
    /// Strip identity
    pub id: StripId,
    /// Channel the strip sits on
    pub channel: u32,
}

/// Scene/clip metadata and rendering services.
///
/// Every method has a conservative default so a host only implements what
/// its timeline supports.
pub trait Scene: Sync {
    /// Render resolution percentage (100 = full size).
    fn render_percent(&self) -> f32 {
        100.0
    }

    /// Full-resolution output width, when known.
    fn full_width(&self) -> Option<u32> {
        None
    }

    /// Frames per second.
    fn fps(&self) -> f32 {
        25.0
    }

    /// Renders what is visible on `channel` at `timeline_frame`, limited to
    /// the strips enclosed by `scope` (the whole timeline when `None`).
    fn render_channel(
        &self,
        _ctx: &RenderContext<'_>,
        _timeline_frame: f32,
        _channel: u32,
        _scope: Option<StripRef>,
    ) -> Option<Frame> {
        None
    }

    /// The meta strip directly enclosing `strip`.
    fn parent_meta(&self, _strip: StripId) -> Option<StripRef> {
        None
    }

    /// The speed-factor curve animating `strip`.
    fn speed_curve(&self, _strip: StripId) -> Option<&dyn Curve> {
        None
    }

    /// Font shaping and rasterization backend.
    fn fonts(&self) -> Option<&dyn FontBackend> {
        None
    }
}

/// Scene with no timeline behind it: defaults everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScene;

impl Scene for EmptyScene {}

/// Immutable per-call render parameters.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Output width
    pub width: u32,
    /// Output height
    pub height: u32,
    /// Preview/proxy scale; `None` renders at the scene's render size.
    pub preview_scale: Option<f32>,
    /// Owning scene
    pub scene: &'a dyn Scene,
}

impl<'a> RenderContext<'a> {
    /// Context rendering at the scene's own size.
    pub fn new(width: u32, height: u32, scene: &'a dyn Scene) -> Self {
        Self {
            width,
            height,
            preview_scale: None,
            scene,
        }
    }

    /// Renders as a preview at `scale` (1.0 = full size).
    pub fn with_preview_scale(mut self, scale: f32) -> Self {
        self.preview_scale = Some(scale);
        self
    }

    /// Factor converting absolute pixel values to this render's pixels.
    pub fn proxy_scale(&self) -> f32 {
        self.preview_scale
            .unwrap_or_else(|| self.scene.render_percent() / 100.0)
    }

    /// Render size in percent of the full-resolution output.
    pub fn render_size_percent(&self) -> f32 {
        match self.scene.full_width() {
            Some(full) if full > 0 => 100.0 * self.width as f32 / full as f32,
            _ => 100.0,
        }
    }
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("preview_scale", &self.preview_scale)
            .finish_non_exhaustive()
    }
}
