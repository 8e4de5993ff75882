//! Integration tests for the seqfx crates.
//!
//! End-to-end checks through the [`seqfx_effects::Compositor`] front door:
//! every effect type, strip lifecycles and configuration files.

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use seqfx_blend::BlendMode;
    use seqfx_core::{Frame, PixelFormat};
    use seqfx_effects::effects::gaussian::GaussianBlurParams;
    use seqfx_effects::effects::glow::GlowParams;
    use seqfx_effects::effects::wipe::WipeKind;
    use seqfx_effects::{
        Compositor, EffectStrip, EffectType, EmptyScene, EngineConfig, LoadState, RenderContext, StripId,
        StripTiming,
    };
    use std::io::Write;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn strip(effect_type: EffectType) -> EffectStrip {
        EffectStrip::new(StripId(1), effect_type, 3, StripTiming::new(0.0, 50.0))
    }

    fn gradient(w: u32, h: u32, seed: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = (x * 29 + y * 13 + seed * 71) % 256;
                data.extend_from_slice(&[v as u8, (255 - v) as u8, ((v * 5) % 256) as u8, (96 + v % 160) as u8]);
            }
        }
        Frame::from_bytes(w, h, data).unwrap()
    }

    fn all_effects() -> Vec<EffectType> {
        let mut types: Vec<EffectType> = EffectType::all().to_vec();
        types.extend(BlendMode::ALL.into_iter().map(EffectType::blend));
        types
    }

    #[test]
    fn test_cross_red_to_blue() {
        let engine = Compositor::new(EngineConfig::default()).unwrap();
        let ctx = RenderContext::new(8, 8, &EmptyScene);
        let a = Frame::filled_byte(8, 8, RED);
        let b = Frame::filled_byte(8, 8, BLUE);
        let mut s = strip(EffectType::Cross);

        let out = engine.render(&ctx, &mut s, 0.0, Some(0.25), [Some(&a), Some(&b), None]).unwrap().unwrap();
        assert!(out.bytes().unwrap().chunks(4).all(|p| p == [191, 0, 64, 255]));

        let af = a.to_format(PixelFormat::Float);
        let bf = Frame::filled_float(8, 8, [0.0, 0.0, 1.0, 1.0]);
        let out = engine.render(&ctx, &mut s, 0.0, Some(0.25), [Some(&af), Some(&bf), None]).unwrap().unwrap();
        let px = out.float_pixel(3, 5).unwrap();
        assert_relative_eq!(px[0], 0.75, epsilon = 1e-6);
        assert_relative_eq!(px[2], 0.25, epsilon = 1e-6);
        assert_relative_eq!(px[3], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_every_effect_renders_both_formats() {
        let engine = Compositor::new(EngineConfig::default()).unwrap();
        let ctx = RenderContext::new(12, 7, &EmptyScene);
        for format in [PixelFormat::Byte, PixelFormat::Float] {
            let a = gradient(12, 7, 1).to_format(format);
            let b = gradient(12, 7, 2).to_format(format);
            for t in all_effects() {
                let mut s = strip(t);
                let out = engine
                    .render(&ctx, &mut s, 20.0, Some(0.4), [Some(&a), Some(&b), None])
                    .unwrap_or_else(|e| panic!("{t}: {e}"));
                assert_eq!(s.load_state, LoadState::Loaded, "{t}");
                if let Some(out) = out {
                    assert_eq!(out.dimensions(), (12, 7), "{t}");
                    assert_eq!(out.format(), format, "{t}");
                }
            }
        }
    }

    #[test]
    fn test_copy_survives_release() {
        for t in all_effects() {
            let mut original = strip(t);
            let kind = original.params.kind();
            let copy = original.duplicate(StripId(2));
            original.release(&EmptyScene);
            assert_eq!(original.params.kind(), "none", "{t}");
            assert_eq!(copy.params.kind(), kind, "{t}");
            assert_eq!(copy.load_state, LoadState::NotLoaded, "{t}");
        }

        let mut glow = strip(EffectType::Glow);
        let custom = GlowParams {
            threshold: 0.1,
            distance: 5.0,
            ..Default::default()
        };
        *glow.params.glow_mut().unwrap() = custom;
        let copy = glow.duplicate(StripId(9));
        glow.release(&EmptyScene);
        assert_eq!(*copy.params.glow().unwrap(), custom);

        let mut wipe = strip(EffectType::Wipe);
        wipe.params.wipe_mut().unwrap().kind = WipeKind::Iris;
        let copy = wipe.duplicate(StripId(10));
        wipe.release(&EmptyScene);
        assert_eq!(copy.params.wipe().unwrap().kind, WipeKind::Iris);
    }

    #[test]
    fn test_early_out_returns_input_buffer() {
        let engine = Compositor::new(EngineConfig::default()).unwrap();
        let ctx = RenderContext::new(6, 6, &EmptyScene);
        let a = gradient(6, 6, 3);
        let b = gradient(6, 6, 4);

        let mut blur = strip(EffectType::GaussianBlur);
        let out = engine.render(&ctx, &mut blur, 0.0, None, [Some(&a), None, None]).unwrap().unwrap();
        assert!(out.ptr_eq(&a));

        let mut add = strip(EffectType::Add);
        let out = engine.render(&ctx, &mut add, 0.0, Some(0.0), [Some(&a), Some(&b), None]).unwrap().unwrap();
        assert!(out.ptr_eq(&a));

        let mut over = strip(EffectType::AlphaOver);
        let out = engine.render(&ctx, &mut over, 0.0, Some(0.0), [Some(&a), Some(&b), None]).unwrap().unwrap();
        assert!(out.ptr_eq(&b));
    }

    #[test]
    fn test_slice_size_does_not_change_output() {
        let a = gradient(17, 23, 5);
        let render = |cfg: EngineConfig, t: EffectType| {
            let engine = Compositor::new(cfg).unwrap();
            let ctx = RenderContext::new(17, 23, &EmptyScene);
            let mut s = strip(t);
            if let Ok(p) = s.params.gaussian_blur_mut() {
                *p = GaussianBlurParams { size_x: 3.0, size_y: 2.0 };
            }
            engine
                .render(&ctx, &mut s, 0.0, Some(0.6), [Some(&a), Some(&a), None])
                .unwrap()
                .unwrap()
        };
        let fine = EngineConfig {
            threads: 2,
            slice_rows: 1,
            blur_slice_rows: 1,
            ..Default::default()
        };
        for t in [EffectType::GaussianBlur, EffectType::Glow, EffectType::Cross, EffectType::Transform] {
            let coarse = render(EngineConfig::default(), t);
            let sliced = render(fine.clone(), t);
            assert_eq!(coarse.bytes().unwrap(), sliced.bytes().unwrap(), "{t}");
        }
    }

    #[test]
    fn test_config_file_drives_engine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "threads: 2\nslice_rows: 3\nadjustment_max_depth: 4").unwrap();
        let cfg = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.blur_slice_rows, 32);

        let engine = Compositor::new(cfg).unwrap();
        assert_eq!(engine.config().slice_rows, 3);
        let ctx = RenderContext::new(4, 9, &EmptyScene);
        let mut s = strip(EffectType::SolidColor);
        s.params.solid_color_mut().unwrap().color = [0.0, 1.0, 0.0];
        let out = engine.render(&ctx, &mut s, 0.0, None, [None, None, None]).unwrap().unwrap();
        assert!(out.bytes().unwrap().chunks(4).all(|p| p == [0, 255, 0, 255]));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "slice_rows: 0").unwrap();
        assert!(EngineConfig::from_file(bad.path()).is_err());
    }
}
