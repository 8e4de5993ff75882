//! Blend modes on straight-alpha 8-bit pixels.
//!
//! The piecewise-linear and polynomial modes run in integer arithmetic with
//! round-to-nearest division by 255. Modes with a division by a channel
//! value (burn, dodge, vivid light), soft light and the HSV modes evaluate
//! in float and quantize once.

use crate::float;
use crate::mode::BlendMode;
use seqfx_core::pixel::{byte_to_unit, unit_to_byte};

/// Rounded `x / 255` for `x >= 0`.
#[inline]
fn div255(x: i32) -> i32 {
    (x + 127) / 255
}

/// Rounded `x / 255`, rounding half away from zero.
#[inline]
fn div255_signed(x: i32) -> i32 {
    if x >= 0 { div255(x) } else { -div255(-x) }
}

#[inline]
fn via_float(mode: BlendMode, a: u8, b: u8) -> u8 {
    unit_to_byte(float::blend_channel(mode, byte_to_unit(a), byte_to_unit(b)))
}

/// Blends one channel of a per-channel mode.
///
/// HSV modes are not per-channel; for those the base value is returned.
#[inline]
pub fn blend_channel(mode: BlendMode, a: u8, b: u8) -> u8 {
    let (ai, bi) = (a as i32, b as i32);
    let v = match mode {
        BlendMode::Add => (ai + bi).min(255),
        BlendMode::Subtract => (ai - bi).max(0),
        BlendMode::Multiply => div255(ai * bi),
        BlendMode::Darken => ai.min(bi),
        BlendMode::LinearBurn => (ai + bi - 255).max(0),
        BlendMode::Screen => 255 - div255((255 - ai) * (255 - bi)),
        BlendMode::Lighten => ai.max(bi),
        BlendMode::Overlay => {
            if ai > 127 {
                255 - div255(2 * (255 - ai) * (255 - bi))
            } else {
                div255(2 * ai * bi)
            }
        }
        BlendMode::HardLight => {
            if bi > 127 {
                255 - div255(2 * (255 - ai) * (255 - bi))
            } else {
                div255(2 * ai * bi)
            }
        }
        BlendMode::PinLight => {
            if bi > 127 {
                ai.max(2 * bi - 255)
            } else {
                ai.min(2 * bi)
            }
        }
        BlendMode::LinearLight => (ai + 2 * bi - 255).clamp(0, 255),
        BlendMode::Difference => (ai - bi).abs(),
        BlendMode::Exclusion => ai + bi - div255(2 * ai * bi),
        BlendMode::ColorBurn | BlendMode::Dodge | BlendMode::SoftLight | BlendMode::VividLight => {
            return via_float(mode, a, b);
        }
        BlendMode::Color | BlendMode::Hue | BlendMode::Saturation | BlendMode::Value => ai,
    };
    v.clamp(0, 255) as u8
}

/// Blends RGB triples, ignoring alpha.
pub fn blend_rgb(mode: BlendMode, a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    if !mode.is_hsv() {
        return [
            blend_channel(mode, a[0], b[0]),
            blend_channel(mode, a[1], b[1]),
            blend_channel(mode, a[2], b[2]),
        ];
    }
    let unit = |px: [u8; 3]| [byte_to_unit(px[0]), byte_to_unit(px[1]), byte_to_unit(px[2])];
    let v = float::blend_rgb(mode, unit(a), unit(b));
    [unit_to_byte(v[0]), unit_to_byte(v[1]), unit_to_byte(v[2])]
}

/// Blends `src2` onto `src1`, weighted by `src2`'s alpha.
///
/// Output alpha is `src1`'s alpha.
pub fn blend(mode: BlendMode, src1: [u8; 4], src2: [u8; 4]) -> [u8; 4] {
    let fac = src2[3] as i32;
    if fac == 0 {
        return src1;
    }
    let v = blend_rgb(
        mode,
        [src1[0], src1[1], src1[2]],
        [src2[0], src2[1], src2[2]],
    );
    let mix = |a: u8, v: u8| -> u8 {
        let a = a as i32;
        (a + div255_signed((v as i32 - a) * fac)) as u8
    };
    [
        mix(src1[0], v[0]),
        mix(src1[1], v[1]),
        mix(src1[2], v[2]),
        src1[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div255_rounds() {
        assert_eq!(div255(0), 0);
        assert_eq!(div255(255 * 255), 255);
        assert_eq!(div255(127), 0);
        assert_eq!(div255(128), 1);
        assert_eq!(div255_signed(-128), -1);
    }

    #[test]
    fn test_identities() {
        assert_eq!(blend_channel(BlendMode::Multiply, 200, 255), 200);
        assert_eq!(blend_channel(BlendMode::Screen, 200, 0), 200);
        assert_eq!(blend_channel(BlendMode::Add, 200, 100), 255);
        assert_eq!(blend_channel(BlendMode::Subtract, 50, 100), 0);
        assert_eq!(blend_channel(BlendMode::Difference, 50, 100), 50);
    }

    #[test]
    fn test_opaque_layer_replaces_color() {
        let out = blend(BlendMode::Lighten, [10, 200, 30, 77], [100, 100, 100, 255]);
        assert_eq!(out, [100, 200, 100, 77]);
    }

    #[test]
    fn test_transparent_layer_is_noop() {
        let a = [1, 2, 3, 4];
        assert_eq!(blend(BlendMode::Exclusion, a, [255, 255, 255, 0]), a);
    }
}
