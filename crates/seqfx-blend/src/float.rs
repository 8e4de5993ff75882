//! Blend modes on straight-alpha float pixels.
//!
//! Results of the modes whose formula can leave `[0, 1]` (add, subtract,
//! burns, dodge, linear and vivid light) are clamped so the float and byte
//! domains agree.

use crate::hsv::{hsv_to_rgb, rgb_to_hsv};
use crate::mode::BlendMode;

#[inline]
fn burn(a: f32, b: f32) -> f32 {
    if b <= 0.0 {
        0.0
    } else {
        (1.0 - (1.0 - a) / b).max(0.0)
    }
}

#[inline]
fn dodge(a: f32, b: f32) -> f32 {
    if b >= 1.0 {
        1.0
    } else {
        (a / (1.0 - b)).min(1.0)
    }
}

/// Blends one channel of a per-channel mode.
///
/// HSV modes are not per-channel; for those the base value is returned.
#[inline]
pub fn blend_channel(mode: BlendMode, a: f32, b: f32) -> f32 {
    match mode {
        BlendMode::Add => (a + b).min(1.0),
        BlendMode::Subtract => (a - b).max(0.0),
        BlendMode::Multiply => a * b,
        BlendMode::Darken => a.min(b),
        BlendMode::ColorBurn => burn(a, b),
        BlendMode::LinearBurn => (a + b - 1.0).max(0.0),
        BlendMode::Screen => 1.0 - (1.0 - a) * (1.0 - b),
        BlendMode::Lighten => a.max(b),
        BlendMode::Dodge => dodge(a, b),
        BlendMode::Overlay => {
            if a > 0.5 {
                1.0 - 2.0 * (1.0 - a) * (1.0 - b)
            } else {
                2.0 * a * b
            }
        }
        BlendMode::SoftLight => (1.0 - 2.0 * b) * a * a + 2.0 * a * b,
        BlendMode::HardLight => {
            if b > 0.5 {
                1.0 - 2.0 * (1.0 - a) * (1.0 - b)
            } else {
                2.0 * a * b
            }
        }
        BlendMode::PinLight => {
            if b > 0.5 {
                a.max(2.0 * b - 1.0)
            } else {
                a.min(2.0 * b)
            }
        }
        BlendMode::LinearLight => (a + 2.0 * b - 1.0).clamp(0.0, 1.0),
        BlendMode::VividLight => {
            if b <= 0.5 {
                burn(a, 2.0 * b)
            } else {
                dodge(a, 2.0 * b - 1.0)
            }
        }
        BlendMode::Difference => (a - b).abs(),
        BlendMode::Exclusion => a + b - 2.0 * a * b,
        BlendMode::Color | BlendMode::Hue | BlendMode::Saturation | BlendMode::Value => a,
    }
}

/// Blends RGB triples, ignoring alpha.
pub fn blend_rgb(mode: BlendMode, a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    if !mode.is_hsv() {
        return [
            blend_channel(mode, a[0], b[0]),
            blend_channel(mode, a[1], b[1]),
            blend_channel(mode, a[2], b[2]),
        ];
    }
    let mut base = rgb_to_hsv(a);
    let layer = rgb_to_hsv(b);
    match mode {
        BlendMode::Hue => {
            if layer[1] <= 0.0 {
                return a;
            }
            base[0] = layer[0];
        }
        BlendMode::Saturation => {
            if base[1] <= 0.0 {
                return a;
            }
            base[1] = layer[1];
        }
        BlendMode::Color => {
            base[0] = layer[0];
            base[1] = layer[1];
        }
        _ => base[2] = layer[2],
    }
    hsv_to_rgb(base)
}

/// Blends `src2` onto `src1`, weighted by `src2`'s alpha.
///
/// Output alpha is `src1`'s alpha.
pub fn blend(mode: BlendMode, src1: [f32; 4], src2: [f32; 4]) -> [f32; 4] {
    let fac = src2[3];
    if fac == 0.0 {
        return src1;
    }
    let v = blend_rgb(
        mode,
        [src1[0], src1[1], src1[2]],
        [src2[0], src2[1], src2[2]],
    );
    [
        src1[0] + (v[0] - src1[0]) * fac,
        src1[1] + (v[1] - src1[1]) * fac,
        src1[2] + (v[2] - src1[2]) * fac,
        src1[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_multiply_screen() {
        assert_abs_diff_eq!(blend_channel(BlendMode::Multiply, 0.8, 0.2), 0.16, epsilon = 1e-6);
        assert_abs_diff_eq!(blend_channel(BlendMode::Screen, 0.5, 0.5), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_clamped_modes_stay_in_range() {
        for mode in BlendMode::ALL {
            for &a in &[0.0, 0.25, 0.5, 0.75, 1.0] {
                for &b in &[0.0, 0.25, 0.5, 0.75, 1.0] {
                    let v = blend_channel(mode, a, b);
                    assert!((-1e-6..=1.0 + 1e-6).contains(&v), "{mode} {a} {b} -> {v}");
                }
            }
        }
    }

    #[test]
    fn test_transparent_layer_is_noop() {
        let a = [0.3, 0.6, 0.9, 0.5];
        assert_eq!(blend(BlendMode::Difference, a, [1.0, 1.0, 1.0, 0.0]), a);
    }

    #[test]
    fn test_alpha_from_base() {
        let out = blend(BlendMode::Add, [0.1, 0.1, 0.1, 0.25], [0.5, 0.5, 0.5, 1.0]);
        assert_abs_diff_eq!(out[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(out[3], 0.25);
    }

    #[test]
    fn test_hue_takes_layer_hue() {
        let v = blend_rgb(BlendMode::Hue, [0.0, 0.0, 0.8], [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[0], 0.8, epsilon = 1e-5);
        assert_abs_diff_eq!(v[2], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_value_keeps_base_hue() {
        let v = blend_rgb(BlendMode::Value, [1.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert_abs_diff_eq!(v[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(v[1], 0.0, epsilon = 1e-5);
    }
}
