//! `cosmic-text` font backend.
//!
//! Shaping goes through HarfBuzz-compatible shaping in `cosmic-text`,
//! rasterization through its swash cache. The font system is expensive to
//! create, so one backend instance is meant to be shared by every strip.

use super::{FontBackend, FontError, FontId, FontSource, FontStyle, TextBounds, TextMetrics};
use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, Style, SwashCache, Weight, fontdb};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Line height as a multiple of the font size.
const LINE_SPACING: f32 = 1.2;

struct LoadedFont {
    family: String,
    faces: Vec<fontdb::ID>,
}

struct State {
    fonts: FontSystem,
    cache: SwashCache,
    loaded: HashMap<u32, LoadedFont>,
    next_id: u32,
}

/// Font backend over a `cosmic-text` font system.
pub struct CosmicFonts {
    state: Mutex<State>,
}

impl CosmicFonts {
    /// Backend with the system fonts available.
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    /// Backend over an existing font system.
    pub fn with_font_system(fonts: FontSystem) -> Self {
        Self {
            state: Mutex::new(State {
                fonts,
                cache: SwashCache::new(),
                loaded: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CosmicFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CosmicFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicFonts").finish_non_exhaustive()
    }
}

fn shape(state: &mut State, font: Option<FontId>, text: &str, style: &FontStyle) -> Buffer {
    let family = font.and_then(|id| state.loaded.get(&id.0)).map(|f| f.family.clone());
    let mut attrs = match family.as_deref() {
        Some(name) => Attrs::new().family(Family::Name(name)),
        None => Attrs::new().family(Family::SansSerif),
    };
    if style.bold {
        attrs = attrs.weight(Weight::BOLD);
    }
    if style.italic {
        attrs = attrs.style(Style::Italic);
    }

    let metrics = Metrics::new(style.size, style.size * LINE_SPACING);
    let mut buffer = Buffer::new(&mut state.fonts, metrics);
    buffer.set_size(&mut state.fonts, style.wrap_width, None);
    buffer.set_text(&mut state.fonts, text, &attrs, Shaping::Advanced);
    buffer.shape_until_scroll(&mut state.fonts, false);
    buffer
}

/// First baseline, measured from the top of the layout box.
fn first_baseline(buffer: &Buffer) -> f32 {
    buffer.layout_runs().next().map(|run| run.line_y).unwrap_or(0.0)
}

impl FontBackend for CosmicFonts {
    fn load(&self, source: &FontSource) -> Result<FontId, FontError> {
        let (name, data) = match source {
            FontSource::File(path) => (path.display().to_string(), std::fs::read(path)?),
            FontSource::Memory { name, data } => (name.clone(), data.to_vec()),
        };
        let mut state = self.lock();
        let db = state.fonts.db_mut();
        let faces: Vec<fontdb::ID> = db.load_font_source(fontdb::Source::Binary(Arc::new(data))).to_vec();
        let family = faces
            .first()
            .and_then(|id| db.face(*id))
            .and_then(|face| face.families.first())
            .map(|(family, _)| family.clone())
            .ok_or_else(|| FontError::Invalid {
                name: name.clone(),
                reason: "no font faces found".into(),
            })?;

        let id = state.next_id;
        state.next_id += 1;
        debug!(id, %name, %family, "font loaded");
        state.loaded.insert(id, LoadedFont { family, faces });
        Ok(FontId(id))
    }

    fn unload(&self, font: FontId) {
        let mut state = self.lock();
        if let Some(loaded) = state.loaded.remove(&font.0) {
            let db = state.fonts.db_mut();
            for face in loaded.faces {
                db.remove_face(face);
            }
        }
    }

    fn measure(&self, font: Option<FontId>, text: &str, style: &FontStyle) -> TextMetrics {
        let mut state = self.lock();
        let buffer = shape(&mut state, font, text, style);
        let line_height = style.size * LINE_SPACING;

        let mut lines = 0usize;
        let mut width = 0.0f32;
        let mut ascent = style.size;
        let mut max_advance = 0.0f32;
        for run in buffer.layout_runs() {
            if lines == 0 {
                ascent = run.line_y - run.line_top;
            }
            lines += 1;
            width = width.max(run.line_w);
            for glyph in run.glyphs {
                max_advance = max_advance.max(glyph.w);
            }
        }
        let descent = (line_height - ascent).max(0.0);
        TextMetrics {
            bounds: TextBounds {
                xmin: 0.0,
                xmax: width,
                ymin: -(lines.saturating_sub(1) as f32 * line_height + descent),
                ymax: ascent,
            },
            lines,
            line_height,
            descender: -descent,
            max_advance: if max_advance > 0.0 { max_advance } else { style.size },
        }
    }

    fn rasterize(&self, font: Option<FontId>, text: &str, style: &FontStyle, plot: &mut dyn FnMut(i32, i32, f32)) {
        let mut guard = self.lock();
        let buffer = shape(&mut guard, font, text, style);
        let baseline = first_baseline(&buffer).round() as i32;
        let State { fonts, cache, .. } = &mut *guard;
        buffer.draw(fonts, cache, Color::rgba(255, 255, 255, 255), |x, y, w, h, color| {
            let coverage = color.a() as f32 / 255.0;
            if coverage <= 0.0 {
                return;
            }
            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    plot(x + dx, y + dy - baseline, coverage);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_garbage() {
        let fonts = CosmicFonts::with_font_system(FontSystem::new_with_locale_and_db(
            "en-US".into(),
            fontdb::Database::new(),
        ));
        let err = fonts
            .load(&FontSource::Memory {
                name: "junk".into(),
                data: Arc::from(&b"not a font"[..]),
            })
            .unwrap_err();
        assert!(matches!(err, FontError::Invalid { .. }));

        let err = fonts
            .load(&FontSource::File("/nonexistent/font.ttf".into()))
            .unwrap_err();
        assert!(matches!(err, FontError::Io(_)));
    }
}
