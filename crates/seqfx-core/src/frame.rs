//! The frame buffer shared by every effect.
//!
//! A [`Frame`] is an RGBA grid that carries an 8-bit representation, a
//! 32-bit float representation, or both at once. Storage is reference
//! counted: cloning a frame is cheap and both clones observe the same pixels
//! until one of them is mutated (copy-on-write). That property is what
//! lets an effect "return an input verbatim" without allocating.
//!
//! Row 0 is the top row. All channels are straight alpha.
//!
//! # Example
//!
//! ```rust
//! use seqfx_core::{Frame, PixelFormat};
//!
//! let red = Frame::filled_byte(4, 4, [255, 0, 0, 255]);
//! let shared = red.clone();
//! assert!(red.ptr_eq(&shared));
//!
//! let mut f = red.to_format(PixelFormat::Float);
//! assert!(f.has_byte() && f.has_float());
//! f.floats_mut().unwrap()[0] = 0.5;
//! assert!(!f.has_byte()); // stale byte cache dropped
//! ```

use crate::error::{FrameError, FrameResult};
use crate::pixel::{self, CHANNELS};
use crate::rect::Rect;
use std::sync::Arc;

/// Storage kind of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8 bits per channel, `[0, 255]`.
    #[default]
    Byte,
    /// 32-bit float per channel, nominally `[0, 1]`.
    Float,
}

/// RGBA frame with byte and/or float storage.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    byte: Option<Arc<Vec<u8>>>,
    float: Option<Arc<Vec<f32>>>,
}

fn sample_count(width: u32, height: u32) -> FrameResult<usize> {
    if width == 0 || height == 0 {
        return Err(FrameError::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| FrameError::invalid_dimensions(width, height, "sample count overflows"))
}

impl Frame {
    /// Allocates a zeroed (transparent black) frame.
    ///
    /// This is the buffer allocator every effect goes through for its output.
    pub fn allocate(width: u32, height: u32, format: PixelFormat) -> FrameResult<Self> {
        let n = sample_count(width, height)?;
        Ok(match format {
            PixelFormat::Byte => Self {
                width,
                height,
                byte: Some(Arc::new(vec![0; n])),
                float: None,
            },
            PixelFormat::Float => Self {
                width,
                height,
                byte: None,
                float: Some(Arc::new(vec![0.0; n])),
            },
        })
    }

    /// Wraps existing byte samples.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> FrameResult<Self> {
        let n = sample_count(width, height)?;
        if data.len() != n {
            return Err(FrameError::BufferSize {
                expected: n,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            byte: Some(Arc::new(data)),
            float: None,
        })
    }

    /// Wraps existing float samples.
    pub fn from_floats(width: u32, height: u32, data: Vec<f32>) -> FrameResult<Self> {
        let n = sample_count(width, height)?;
        if data.len() != n {
            return Err(FrameError::BufferSize {
                expected: n,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            byte: None,
            float: Some(Arc::new(data)),
        })
    }

    /// Byte frame filled with one pixel value.
    ///
    /// Zero dimensions produce a 1x1 frame.
    pub fn filled_byte(width: u32, height: u32, px: [u8; 4]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let data = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            byte: Some(Arc::new(data)),
            float: None,
        }
    }

    /// Float frame filled with one pixel value.
    ///
    /// Zero dimensions produce a 1x1 frame.
    pub fn filled_float(width: u32, height: u32, px: [f32; 4]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let data = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            byte: None,
            float: Some(Arc::new(data)),
        }
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Samples per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Primary representation: float when present, byte otherwise.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        if self.float.is_some() {
            PixelFormat::Float
        } else {
            PixelFormat::Byte
        }
    }

    /// `true` when byte storage is populated.
    #[inline]
    pub fn has_byte(&self) -> bool {
        self.byte.is_some()
    }

    /// `true` when float storage is populated.
    #[inline]
    pub fn has_float(&self) -> bool {
        self.float.is_some()
    }

    /// Byte samples, if present.
    #[inline]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.byte.as_deref().map(Vec::as_slice)
    }

    /// Float samples, if present.
    #[inline]
    pub fn floats(&self) -> Option<&[f32]> {
        self.float.as_deref().map(Vec::as_slice)
    }

    /// Mutable byte samples (copy-on-write). Drops a cached float copy.
    pub fn bytes_mut(&mut self) -> FrameResult<&mut [u8]> {
        let data = self
            .byte
            .as_mut()
            .ok_or(FrameError::MissingStorage(PixelFormat::Byte))?;
        self.float = None;
        Ok(Arc::make_mut(data).as_mut_slice())
    }

    /// Mutable float samples (copy-on-write). Drops a cached byte copy.
    pub fn floats_mut(&mut self) -> FrameResult<&mut [f32]> {
        let data = self
            .float
            .as_mut()
            .ok_or(FrameError::MissingStorage(PixelFormat::Float))?;
        self.byte = None;
        Ok(Arc::make_mut(data).as_mut_slice())
    }

    /// Populates float storage from bytes if missing.
    pub fn ensure_float(&mut self) {
        if self.float.is_some() {
            return;
        }
        if let Some(bytes) = &self.byte {
            let data = bytes.iter().map(|&v| pixel::byte_to_unit(v)).collect();
            self.float = Some(Arc::new(data));
        }
    }

    /// Populates byte storage from floats if missing.
    pub fn ensure_byte(&mut self) {
        if self.byte.is_some() {
            return;
        }
        if let Some(floats) = &self.float {
            let data = floats.iter().map(|&v| pixel::unit_to_byte(v)).collect();
            self.byte = Some(Arc::new(data));
        }
    }

    /// Shares storage with `self` and guarantees `format` is populated.
    pub fn to_format(&self, format: PixelFormat) -> Frame {
        let mut f = self.clone();
        match format {
            PixelFormat::Byte => f.ensure_byte(),
            PixelFormat::Float => f.ensure_float(),
        }
        f
    }

    /// Deep copy with freshly allocated storage.
    pub fn duplicate(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            byte: self.byte.as_ref().map(|d| Arc::new(d.as_ref().clone())),
            float: self.float.as_ref().map(|d| Arc::new(d.as_ref().clone())),
        }
    }

    /// `true` if both frames share the same pixel storage.
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        let byte = match (&self.byte, &other.byte) {
            (Some(a), Some(b)) => Some(Arc::ptr_eq(a, b)),
            (None, None) => None,
            _ => Some(false),
        };
        let float = match (&self.float, &other.float) {
            (Some(a), Some(b)) => Some(Arc::ptr_eq(a, b)),
            (None, None) => None,
            _ => Some(false),
        };
        match (byte, float) {
            (None, None) => false,
            (b, f) => b.unwrap_or(true) && f.unwrap_or(true),
        }
    }

    /// Fails unless `other` has the same dimensions.
    pub fn check_same_size(&self, other: &Frame) -> FrameResult<()> {
        if self.dimensions() != other.dimensions() {
            return Err(FrameError::size_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Byte pixel at `(x, y)`.
    pub fn byte_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        self.bytes().map(|d| pixel::load(d, i))
    }

    /// Float pixel at `(x, y)`.
    pub fn float_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let i = self.index(x, y)?;
        self.floats().map(|d| pixel::load(d, i))
    }

    /// Pixel at `(x, y)` as float, read from whichever storage is primary.
    pub fn pixel_f32(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let i = self.index(x, y)?;
        if let Some(d) = self.floats() {
            return Some(pixel::load(d, i));
        }
        self.bytes().map(|d| pixel::u8_to_f32(pixel::load(d, i)))
    }

    /// Replaces every pixel inside `rect` with `color`.
    ///
    /// Writes the primary representation and drops the other one.
    pub fn fill_rect(&mut self, rect: Rect, color: [f32; 4]) {
        let Some(r) = rect.clip(self.width, self.height) else {
            return;
        };
        let width = self.width as usize;
        let rows = r.y as usize..r.bottom() as usize;
        let cols = r.x as usize..r.right() as usize;
        match self.format() {
            PixelFormat::Float => {
                if let Ok(data) = self.floats_mut() {
                    for y in rows {
                        for x in cols.clone() {
                            pixel::store(data, y * width + x, color);
                        }
                    }
                }
            }
            PixelFormat::Byte => {
                let px = pixel::f32_to_u8(color);
                if let Ok(data) = self.bytes_mut() {
                    for y in rows {
                        for x in cols.clone() {
                            pixel::store(data, y * width + x, px);
                        }
                    }
                }
            }
        }
    }

    /// Composites `color` over the pixel at `(x, y)` with extra `coverage`.
    ///
    /// Straight-alpha "over"; out-of-frame coordinates are ignored. Font
    /// backends rasterize glyphs through this.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [f32; 4], coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(i) = self.index(x as u32, y as u32) else {
            return;
        };
        let a = (color[3] * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let over = |dst: [f32; 4]| -> [f32; 4] {
            let out_a = a + dst[3] * (1.0 - a);
            if out_a <= 0.0 {
                return [0.0; 4];
            }
            let k = dst[3] * (1.0 - a);
            [
                (color[0] * a + dst[0] * k) / out_a,
                (color[1] * a + dst[1] * k) / out_a,
                (color[2] * a + dst[2] * k) / out_a,
                out_a,
            ]
        };
        match self.format() {
            PixelFormat::Float => {
                if let Ok(data) = self.floats_mut() {
                    let px = over(pixel::load(data, i));
                    pixel::store(data, i, px);
                }
            }
            PixelFormat::Byte => {
                if let Ok(data) = self.bytes_mut() {
                    let px = over(pixel::u8_to_f32(pixel::load(data, i)));
                    pixel::store(data, i, pixel::f32_to_u8(px));
                }
            }
        }
    }
}
