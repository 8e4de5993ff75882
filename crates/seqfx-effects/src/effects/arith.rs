//! Legacy add, subtract and multiply.
//!
//! Input 2 is applied to input 1 scaled by the factor and by input 2's own
//! alpha. The output alpha is always input 1's. The byte paths keep the
//! legacy fixed-point arithmetic (factor scaled by 256, alpha by 255).

use super::binary_slice;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{Capabilities, EarlyOut, Effect, EffectType, early_out_mul_input1};
use crate::slice::SliceMut;
use std::ops::Range;

#[inline]
fn fixed_fac(fac: f32) -> i64 {
    (256.0 * fac).round() as i64
}

/// `a + fac * alpha2 * b`, byte pixels.
#[inline]
pub fn add_byte(fac: i64, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    let f2 = fac * b[3] as i64;
    let ch = |c: usize| (a[c] as i64 + ((f2 * b[c] as i64) >> 16)).clamp(0, 255) as u8;
    [ch(0), ch(1), ch(2), a[3]]
}

/// `a - fac * alpha2 * b`, byte pixels.
#[inline]
pub fn sub_byte(fac: i64, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    let f2 = fac * b[3] as i64;
    let ch = |c: usize| (a[c] as i64 - ((f2 * b[c] as i64) >> 16)).clamp(0, 255) as u8;
    [ch(0), ch(1), ch(2), a[3]]
}

/// `a + fac * alpha2 * a * (b - 1)`, byte pixels.
#[inline]
pub fn mul_byte(fac: i64, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    let f2 = fac * b[3] as i64;
    let ch = |c: usize| {
        let a = a[c] as i64;
        (a + ((f2 * a * (b[c] as i64 - 255)) >> 24)).clamp(0, 255) as u8
    };
    [ch(0), ch(1), ch(2), a[3]]
}

/// `a + fac * alpha2 * b`, float pixels.
#[inline]
pub fn add_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let f = fac * b[3];
    [a[0] + f * b[0], a[1] + f * b[1], a[2] + f * b[2], a[3]]
}

/// `max(a - fac * alpha2 * b, 0)`, float pixels.
#[inline]
pub fn sub_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let f = fac * b[3];
    let ch = |c: usize| (a[c] - f * b[c]).max(0.0);
    [ch(0), ch(1), ch(2), a[3]]
}

/// `a + fac * alpha2 * a * (b - 1)`, float pixels.
#[inline]
pub fn mul_float(fac: f32, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let f = fac * b[3];
    let ch = |c: usize| a[c] + f * a[c] * (b[c] - 1.0);
    [ch(0), ch(1), ch(2), a[3]]
}

macro_rules! arith_effect {
    ($(#[$doc:meta])* $name:ident, $ty:expr, $byte:path, $float:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Effect for $name {
            fn effect_type(&self) -> EffectType {
                $ty
            }

            fn capabilities(&self) -> Capabilities {
                Capabilities {
                    multithreaded: true,
                    supports_mask: false,
                }
            }

            fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
                early_out_mul_input1(fac)
            }

            fn execute_slice(&self, call: &EffectCall<'_>, inputs: &Inputs, rows: Range<usize>, out: SliceMut<'_>) {
                let fac = call.fac;
                let fixed = fixed_fac(fac);
                binary_slice(inputs, &rows, out, |a, b| $byte(fixed, a, b), |a, b| $float(fac, a, b));
            }
        }
    };
}

arith_effect!(
    /// Additive blend.
    AddEffect,
    EffectType::Add,
    add_byte,
    add_float
);
arith_effect!(
    /// Subtractive blend.
    SubEffect,
    EffectType::Subtract,
    sub_byte,
    sub_float
);
arith_effect!(
    /// Multiplicative blend.
    MulEffect,
    EffectType::Multiply,
    mul_byte,
    mul_float
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{gradient_byte, run2};
    use approx::assert_abs_diff_eq;
    use seqfx_core::{Frame, PixelFormat};

    #[test]
    fn test_add_legacy_fixed_point() {
        let red = Frame::filled_byte(2, 2, [255, 0, 0, 255]);
        let blue = Frame::filled_byte(2, 2, [0, 0, 255, 255]);
        let out = run2(EffectType::Add, 1.0, &red, &blue);
        assert_eq!(out.byte_pixel(0, 0).unwrap(), [255, 0, 254, 255]);
    }

    #[test]
    fn test_sub_clamps_at_zero() {
        let gray = Frame::filled_byte(2, 2, [100, 100, 100, 200]);
        let white = Frame::filled_byte(2, 2, [255, 255, 255, 255]);
        let out = run2(EffectType::Subtract, 1.0, &gray, &white);
        assert_eq!(out.byte_pixel(1, 1).unwrap(), [0, 0, 0, 200]);

        let fout = run2(
            EffectType::Subtract,
            1.0,
            &gray.to_format(PixelFormat::Float),
            &white.to_format(PixelFormat::Float),
        );
        assert_eq!(fout.float_pixel(0, 0).unwrap()[0], 0.0);
    }

    #[test]
    fn test_second_alpha_scales() {
        let a = [0.2, 0.2, 0.2, 1.0];
        let b = [0.4, 0.4, 0.4, 0.5];
        let out = add_float(1.0, a, b);
        assert_abs_diff_eq!(out[0], 0.4, epsilon = 1e-6);
        assert_eq!(add_float(1.0, a, [1.0, 1.0, 1.0, 0.0]), a);
    }

    #[test]
    fn test_mul_float() {
        let out = mul_float(1.0, [0.5, 1.0, 0.0, 0.7], [0.5, 0.25, 1.0, 1.0]);
        assert_abs_diff_eq!(out[0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 0.0, epsilon = 1e-6);
        assert_eq!(out[3], 0.7);
    }

    #[test]
    fn test_output_alpha_is_first_input() {
        let a = gradient_byte(6, 6, 2);
        let b = gradient_byte(6, 6, 5);
        for t in [EffectType::Add, EffectType::Subtract, EffectType::Multiply] {
            let out = run2(t, 0.7, &a, &b);
            let (pa, po) = (a.bytes().unwrap(), out.bytes().unwrap());
            for i in (3..po.len()).step_by(4) {
                assert_eq!(po[i], pa[i], "{t} sample {i}");
            }
        }
    }

    #[test]
    fn test_mul_byte_tracks_float() {
        let a = gradient_byte(16, 2, 1);
        let b = gradient_byte(16, 2, 4);
        let ob = run2(EffectType::Multiply, 1.0, &a, &b);
        let of = run2(
            EffectType::Multiply,
            1.0,
            &a.to_format(PixelFormat::Float),
            &b.to_format(PixelFormat::Float),
        );
        for (x, y) in ob.bytes().unwrap().iter().zip(of.floats().unwrap()) {
            assert!((*x as f32 - y * 255.0).abs() <= 3.0);
        }
    }
}
