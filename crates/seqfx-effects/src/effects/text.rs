//! Text overlay.
//!
//! Lays out the strip's text against a normalized anchor and draws it, with
//! an optional background box and drop shadow, over a copy of input 1 (or
//! a transparent canvas). Shaping and rasterization go through the scene's
//! [`FontBackend`]. Layout runs y-up from the first baseline, drawing
//! converts to frame rows.

use crate::context::Scene;
use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::font::{FontBackend, FontId, FontSource, FontStyle, TextMetrics};
use crate::params::EffectParams;
use crate::registry::{EarlyOut, Effect, EffectType};
use glam::Vec2;
use seqfx_core::{Frame, Rect};
use tracing::{debug, warn};

/// Horizontal anchor of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignX {
    /// Block starts at the anchor
    Left,
    /// Block is centred on the anchor
    #[default]
    Center,
    /// Block ends at the anchor
    Right,
}

/// Vertical anchor of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignY {
    /// First line hangs below the anchor
    Top,
    /// Block is centred on the anchor
    #[default]
    Center,
    /// Last line sits on the anchor
    Bottom,
}

/// Font state of a text strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontHandle {
    /// Not resolved yet.
    #[default]
    Unloaded,
    /// Loaded into the backend.
    Loaded(FontId),
    /// The backend's default font.
    Fallback,
}

/// Text content and layout.
#[derive(Debug, PartialEq)]
pub struct TextParams {
    /// Content; `\n` breaks lines
    pub text: String,
    /// Font to load; `None` uses the backend default
    pub font: Option<FontSource>,
    /// Resolved font
    pub font_handle: FontHandle,
    /// Font size in pixels at full render size
    pub size: f32,
    /// Text color, straight RGBA
    pub color: [f32; 4],
    /// Drop shadow color
    pub shadow_color: [f32; 4],
    /// Background box color
    pub box_color: [f32; 4],
    /// Box padding as a fraction of the frame width
    pub box_margin: f32,
    /// Anchor in `[0, 1]`, y up
    pub loc: Vec2,
    /// Wrap width as a fraction of the frame width; 0 breaks on newlines only
    pub wrap_width: f32,
    /// Horizontal alignment
    pub align_x: TextAlignX,
    /// Vertical alignment
    pub align_y: TextAlignY,
    /// Bold weight
    pub bold: bool,
    /// Italic style
    pub italic: bool,
    /// Draw a drop shadow
    pub shadow: bool,
    /// Draw a background box
    pub draw_box: bool,
}

impl Clone for TextParams {
    /// Copies the settings; the font handle starts out unloaded.
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            font: self.font.clone(),
            font_handle: FontHandle::Unloaded,
            size: self.size,
            color: self.color,
            shadow_color: self.shadow_color,
            box_color: self.box_color,
            box_margin: self.box_margin,
            loc: self.loc,
            wrap_width: self.wrap_width,
            align_x: self.align_x,
            align_y: self.align_y,
            bold: self.bold,
            italic: self.italic,
            shadow: self.shadow,
            draw_box: self.draw_box,
        }
    }
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "Text".into(),
            font: None,
            font_handle: FontHandle::Unloaded,
            size: 60.0,
            color: [1.0; 4],
            shadow_color: [0.0, 0.0, 0.0, 0.7],
            box_color: [0.2, 0.2, 0.2, 0.7],
            box_margin: 0.01,
            loc: Vec2::new(0.5, 0.5),
            wrap_width: 1.0,
            align_x: TextAlignX::Center,
            align_y: TextAlignY::Center,
            bold: false,
            italic: false,
            shadow: false,
            draw_box: false,
        }
    }
}

impl TextParams {
    /// Whether drawing would change nothing.
    pub fn is_invisible(&self) -> bool {
        self.text.is_empty()
            || self.size < 1.0
            || (self.color[3] == 0.0 && (!self.shadow || self.shadow_color[3] == 0.0))
    }

    fn font_id(&self) -> Option<FontId> {
        match self.font_handle {
            FontHandle::Loaded(id) => Some(id),
            FontHandle::Unloaded | FontHandle::Fallback => None,
        }
    }
}

/// Baseline origin of the first line, in pixels, y up.
pub fn baseline_origin(params: &TextParams, metrics: &TextMetrics, width: u32, height: u32) -> (i32, i32) {
    let line_h = metrics.line_height.round() as i32;
    let text_w = metrics.bounds.width().round() as i32;
    let lines = metrics.lines.max(1) as i32;

    let mut x = (params.loc.x * width as f32) as i32;
    let mut y = (params.loc.y * height as f32) as i32 + (-metrics.descender).round() as i32;

    if params.align_x == TextAlignX::Left && params.align_y == TextAlignY::Top {
        y -= line_h;
        return (x, y);
    }
    match params.align_x {
        TextAlignX::Left => {}
        TextAlignX::Center => x -= text_w / 2,
        TextAlignX::Right => x -= text_w,
    }
    match params.align_y {
        TextAlignY::Top => y -= line_h,
        TextAlignY::Center => y += ((lines - 1) / 2) * line_h - line_h / 2,
        TextAlignY::Bottom => y += (lines - 1) * line_h,
    }
    (x, y)
}

/// Draws `text` with its first baseline at `(x, y)` in frame rows.
fn draw_text(
    out: &mut Frame,
    fonts: &dyn FontBackend,
    params: &TextParams,
    style: &FontStyle,
    (x, y): (i32, i32),
    color: [f32; 4],
) {
    fonts.rasterize(params.font_id(), &params.text, style, &mut |dx: i32, dy: i32, coverage: f32| {
        out.blend_pixel(x + dx, y + dy, color, coverage)
    });
}

/// Draws text over input 1.
#[derive(Debug, Clone, Copy)]
pub struct TextEffect;

impl Effect for TextEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Text
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Text(TextParams::default())
    }

    fn load(&self, params: &mut EffectParams, scene: &dyn Scene) {
        let Ok(p) = params.text_mut() else {
            return;
        };
        p.font_handle = match (&p.font, scene.fonts()) {
            (None, _) => FontHandle::Fallback,
            (Some(_), None) => {
                warn!("no font backend, text uses the default font");
                FontHandle::Fallback
            }
            (Some(source), Some(fonts)) => match fonts.load(source) {
                Ok(id) => FontHandle::Loaded(id),
                Err(e) => {
                    warn!(error = %e, "font load failed, text uses the default font");
                    FontHandle::Fallback
                }
            },
        };
    }

    fn free(&self, params: &mut EffectParams, scene: &dyn Scene) {
        if let Ok(p) = params.text() {
            if let (Some(id), Some(fonts)) = (p.font_id(), scene.fonts()) {
                fonts.unload(id);
            }
        }
        *params = EffectParams::None;
    }

    fn early_out(&self, params: &EffectParams, _fac: f32) -> EarlyOut {
        match params.text() {
            Ok(p) if p.is_invisible() => EarlyOut::UseInput1,
            _ => EarlyOut::NoInput,
        }
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let params = call.strip.params.text()?;
        let inputs = Inputs::prepare(call, 0)?;
        let mut out = match inputs.frame(0) {
            Some(canvas) => canvas.duplicate(),
            None => inputs.allocate_output(call.ctx)?,
        };

        let Some(fonts) = call.ctx.scene.fonts() else {
            warn!(id = ?call.strip.id, "no font backend, text not drawn");
            return Ok(Some(out));
        };

        let (width, height) = out.dimensions();
        let style = FontStyle {
            size: params.size * call.ctx.proxy_scale(),
            bold: params.bold,
            italic: params.italic,
            wrap_width: (params.wrap_width != 0.0).then(|| params.wrap_width * width as f32),
        };
        let metrics = fonts.measure(params.font_id(), &params.text, &style);
        let (x, y) = baseline_origin(params, &metrics, width, height);
        let h = height as i32;
        debug!(x, y, lines = metrics.lines, size = style.size, "text layout");

        if params.draw_box {
            let margin = (params.box_margin * width as f32) as i32;
            let b = metrics.bounds;
            let minx = x + b.xmin.floor() as i32 - margin;
            let maxx = x + b.xmax.ceil() as i32 + margin;
            let miny = y + b.ymin.floor() as i32 - margin;
            let maxy = y + b.ymax.ceil() as i32 + margin;
            out.fill_rect(Rect::from_edges(minx, h - maxy, maxx, h - miny), params.box_color);
        }

        if params.shadow {
            let dx = (metrics.max_advance as i32 / 55).max(1);
            let dy = (metrics.line_height as i32 / 30).max(1);
            draw_text(&mut out, fonts, params, &style, (x + dx, h - (y - dy)), params.shadow_color);
        }
        draw_text(&mut out, fonts, params, &style, (x, h - y), params.color);
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::RenderContext;
    use crate::engine::Compositor;
    use crate::font::{FontError, TextBounds};
    use crate::registry::resolve;
    use crate::strip::{EffectStrip, StripId, StripTiming};
    use seqfx_core::pixel::f32_to_u8;
    use std::sync::Mutex;

    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255; 4];

    /// Monospace block font: each glyph is a solid `size/2` by `3*size/4`
    /// box standing on the baseline.
    #[derive(Default)]
    struct Mono {
        log: Mutex<Vec<String>>,
        sizes: Mutex<Vec<f32>>,
    }

    impl FontBackend for Mono {
        fn load(&self, source: &FontSource) -> Result<FontId, FontError> {
            match source {
                FontSource::Memory { name, .. } if name == "bad" => Err(FontError::Invalid {
                    name: name.clone(),
                    reason: "corrupt".into(),
                }),
                _ => {
                    self.log.lock().unwrap().push("load".into());
                    Ok(FontId(7))
                }
            }
        }

        fn unload(&self, font: FontId) {
            self.log.lock().unwrap().push(format!("unload {}", font.0));
        }

        fn measure(&self, _font: Option<FontId>, text: &str, style: &FontStyle) -> TextMetrics {
            self.sizes.lock().unwrap().push(style.size);
            let advance = style.size / 2.0;
            let lines: Vec<&str> = text.split('\n').collect();
            let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f32;
            let descent = style.size * 0.25;
            TextMetrics {
                bounds: TextBounds {
                    xmin: 0.0,
                    xmax: widest * advance,
                    ymin: -((lines.len() - 1) as f32 * style.size + descent),
                    ymax: style.size * 0.75,
                },
                lines: lines.len(),
                line_height: style.size,
                descender: -descent,
                max_advance: advance,
            }
        }

        fn rasterize(&self, _font: Option<FontId>, text: &str, style: &FontStyle, plot: &mut dyn FnMut(i32, i32, f32)) {
            let advance = (style.size / 2.0) as i32;
            let ascent = (style.size * 0.75) as i32;
            let line_h = style.size as i32;
            for (row, line) in text.split('\n').enumerate() {
                for (col, ch) in line.chars().enumerate() {
                    if ch == ' ' {
                        continue;
                    }
                    for dy in -ascent..0 {
                        for dx in 0..advance {
                            plot(col as i32 * advance + dx, row as i32 * line_h + dy, 1.0);
                        }
                    }
                }
            }
        }
    }

    #[derive(Default)]
    struct Fonts {
        mono: Mono,
    }

    impl Scene for Fonts {
        fn fonts(&self) -> Option<&dyn FontBackend> {
            Some(&self.mono)
        }
    }

    fn text_strip(configure: impl FnOnce(&mut TextParams)) -> EffectStrip {
        let mut strip = EffectStrip::new(StripId(1), EffectType::Text, 3, StripTiming::new(0.0, 10.0));
        let p = strip.params.text_mut().unwrap();
        p.text = "A".into();
        p.size = 4.0;
        configure(p);
        strip
    }

    fn draw(scene: &dyn Scene, strip: &EffectStrip, canvas: Option<&Frame>) -> Frame {
        let ctx = RenderContext::new(16, 16, scene);
        let call = EffectCall::new(&ctx, strip, 0.0, 1.0, [canvas, None, None]);
        resolve(EffectType::Text).execute(&call).unwrap().unwrap()
    }

    fn metrics(width: f32, lines: usize) -> TextMetrics {
        TextMetrics {
            bounds: TextBounds {
                xmin: 0.0,
                xmax: width,
                ymin: -4.0,
                ymax: 16.0,
            },
            lines,
            line_height: 20.0,
            descender: -4.0,
            max_advance: 10.0,
        }
    }

    #[test]
    fn test_early_out() {
        let effect = resolve(EffectType::Text);
        let mut params = TextParams::default();
        assert_eq!(effect.early_out(&EffectParams::Text(params.clone()), 1.0), EarlyOut::NoInput);

        params.color[3] = 0.0;
        assert_eq!(effect.early_out(&EffectParams::Text(params.clone()), 1.0), EarlyOut::UseInput1);
        params.shadow = true;
        assert_eq!(effect.early_out(&EffectParams::Text(params.clone()), 1.0), EarlyOut::NoInput);

        let empty = TextParams {
            text: String::new(),
            ..Default::default()
        };
        assert_eq!(effect.early_out(&EffectParams::Text(empty), 1.0), EarlyOut::UseInput1);
        let tiny = TextParams {
            size: 0.5,
            ..Default::default()
        };
        assert_eq!(effect.early_out(&EffectParams::Text(tiny), 1.0), EarlyOut::UseInput1);
    }

    #[test]
    fn test_baseline_origin() {
        let mut params = TextParams::default();
        assert_eq!(baseline_origin(&params, &metrics(40.0, 1), 100, 100), (30, 44));

        params.align_x = TextAlignX::Left;
        params.align_y = TextAlignY::Top;
        assert_eq!(baseline_origin(&params, &metrics(40.0, 1), 100, 100), (50, 34));

        params.align_x = TextAlignX::Right;
        params.align_y = TextAlignY::Bottom;
        assert_eq!(baseline_origin(&params, &metrics(40.0, 3), 100, 100), (10, 94));

        params.align_y = TextAlignY::Center;
        assert_eq!(baseline_origin(&params, &metrics(40.0, 3), 100, 100), (10, 64));
    }

    #[test]
    fn test_draws_over_copy_of_input() {
        let scene = Fonts::default();
        let canvas = Frame::filled_byte(16, 16, BLUE);
        let out = draw(&scene, &text_strip(|_| {}), Some(&canvas));
        // Glyph box: columns 7..9, rows 6..9 (baseline at row 9).
        assert_eq!(out.byte_pixel(7, 6).unwrap(), WHITE);
        assert_eq!(out.byte_pixel(8, 8).unwrap(), WHITE);
        assert_eq!(out.byte_pixel(7, 9).unwrap(), BLUE);
        assert_eq!(out.byte_pixel(9, 7).unwrap(), BLUE);
        assert_eq!(canvas.byte_pixel(7, 6).unwrap(), BLUE);
    }

    #[test]
    fn test_box_and_shadow() {
        let scene = Fonts::default();
        let canvas = Frame::filled_byte(16, 16, BLUE);

        let boxed = draw(
            &scene,
            &text_strip(|p| {
                p.draw_box = true;
                p.box_margin = 0.0;
                p.color[3] = 0.0;
            }),
            Some(&canvas),
        );
        let box_px = f32_to_u8([0.2, 0.2, 0.2, 0.7]);
        assert_eq!(boxed.byte_pixel(7, 6).unwrap(), box_px);
        assert_eq!(boxed.byte_pixel(8, 9).unwrap(), box_px);
        assert_eq!(boxed.byte_pixel(7, 10).unwrap(), BLUE);
        assert_eq!(boxed.byte_pixel(9, 6).unwrap(), BLUE);

        let shadowed = draw(
            &scene,
            &text_strip(|p| {
                p.shadow = true;
                p.shadow_color = [0.0, 0.0, 0.0, 1.0];
            }),
            Some(&canvas),
        );
        assert_eq!(shadowed.byte_pixel(9, 9).unwrap(), [0, 0, 0, 255]);
        assert_eq!(shadowed.byte_pixel(8, 8).unwrap(), WHITE);
        assert_eq!(shadowed.byte_pixel(7, 9).unwrap(), BLUE);
    }

    #[test]
    fn test_blank_canvas_and_proxy_size() {
        let scene = Fonts::default();
        let strip = text_strip(|p| p.size = 8.0);
        let ctx = RenderContext::new(16, 16, &scene).with_preview_scale(0.5);
        let call = EffectCall::new(&ctx, &strip, 0.0, 1.0, [None, None, None]);
        let out = resolve(EffectType::Text).execute(&call).unwrap().unwrap();
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.byte_pixel(0, 0).unwrap(), [0; 4]);
        assert_eq!(out.byte_pixel(7, 6).unwrap(), WHITE);
        assert_eq!(*scene.mono.sizes.lock().unwrap(), vec![4.0]);
    }

    #[test]
    fn test_missing_backend_keeps_canvas() {
        let canvas = Frame::filled_byte(16, 16, BLUE);
        let out = draw(&crate::context::EmptyScene, &text_strip(|_| {}), Some(&canvas));
        assert!(out.bytes().unwrap().chunks(4).all(|p| p == BLUE));
    }

    #[test]
    fn test_font_lifecycle() {
        let scene = Fonts::default();
        let effect = resolve(EffectType::Text);
        let mut params = EffectParams::Text(TextParams {
            font: Some(FontSource::File("fonts/mono.ttf".into())),
            ..Default::default()
        });
        effect.load(&mut params, &scene);
        assert_eq!(params.text().unwrap().font_handle, FontHandle::Loaded(FontId(7)));

        let copied = effect.copy(&params);
        assert_eq!(copied.text().unwrap().font_handle, FontHandle::Unloaded);
        assert_eq!(copied.text().unwrap().font, params.text().unwrap().font);

        effect.free(&mut params, &scene);
        assert!(matches!(params, EffectParams::None));
        assert_eq!(*scene.mono.log.lock().unwrap(), vec!["load", "unload 7"]);
        assert_eq!(copied.text().unwrap().text, "Text");
    }

    #[test]
    fn test_font_fallback() {
        let scene = Fonts::default();
        let effect = resolve(EffectType::Text);
        let mut bad = EffectParams::Text(TextParams {
            font: Some(FontSource::Memory {
                name: "bad".into(),
                data: std::sync::Arc::from(&[0u8; 4][..]),
            }),
            ..Default::default()
        });
        effect.load(&mut bad, &scene);
        assert_eq!(bad.text().unwrap().font_handle, FontHandle::Fallback);

        let mut unset = EffectParams::Text(TextParams::default());
        effect.load(&mut unset, &scene);
        assert_eq!(unset.text().unwrap().font_handle, FontHandle::Fallback);
        assert!(scene.mono.log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clone_outlives_freed_original() {
        let scene = Fonts::default();
        let engine = Compositor::new(EngineConfig::default()).unwrap();
        let ctx = RenderContext::new(16, 16, &scene);
        let canvas = Frame::filled_byte(16, 16, BLUE);
        let mut original = text_strip(|p| p.font = Some(FontSource::File("fonts/mono.ttf".into())));
        engine.render(&ctx, &mut original, 0.0, None, [Some(&canvas), None, None]).unwrap();
        assert_eq!(original.params.text().unwrap().font_handle, FontHandle::Loaded(FontId(7)));

        let mut copy = original.clone();
        assert_eq!(copy.params.text().unwrap().font_handle, FontHandle::Unloaded);
        original.release(&scene);

        let out = engine.render(&ctx, &mut copy, 0.0, None, [Some(&canvas), None, None]).unwrap().unwrap();
        assert_eq!(copy.params.text().unwrap().font_handle, FontHandle::Loaded(FontId(7)));
        assert_eq!(out.byte_pixel(7, 6).unwrap(), WHITE);
        assert_eq!(*scene.mono.log.lock().unwrap(), vec!["load", "unload 7", "load"]);
    }
}
