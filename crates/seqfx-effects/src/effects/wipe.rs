//! Geometric wipes: single bar, double bar, clock and iris.
//!
//! [`WipeZone`] is precomputed once per call from the parameters and frame
//! size; [`WipeZone::coverage`] then gives, for every pixel, the share of
//! input 1 in `[0, 1]`. Factor 0 shows input 2 everywhere and factor 1
//! shows input 1 everywhere. The geometry works in a y-up plane sampled at
//! pixel centres.

use crate::error::EffectResult;
use crate::exec::{EffectCall, Inputs};
use crate::params::EffectParams;
use crate::registry::{EarlyOut, Effect, EffectType, fade_factor};
use crate::slice::{SliceMut, run_sliced};
use crate::strip::EffectStrip;
use seqfx_core::Frame;
use seqfx_core::pixel::{
    load, premul_f32_to_straight_u8, premultiply, store, straight_u8_to_premul_f32, unpremultiply,
};
use std::f32::consts::PI;
use std::ops::Range;
use tracing::trace;

/// Wipe pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WipeKind {
    /// One straight boundary sweeping across the frame
    #[default]
    Single,
    /// Two boundaries moving apart from the centre
    Double,
    /// Expanding circle
    Iris,
    /// Angular sweep around the centre
    Clock,
}

/// Wipe settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WipeParams {
    /// Pattern
    pub kind: WipeKind,
    /// Soft band width as a fraction of the frame size
    pub edge_width: f32,
    /// Boundary angle in radians
    pub angle: f32,
    /// Sweep direction
    pub forward: bool,
}

impl Default for WipeParams {
    fn default() -> Self {
        Self {
            kind: WipeKind::Single,
            edge_width: 0.0,
            angle: 0.0,
            forward: true,
        }
    }
}

/// Soft band ramp: `side` outside the band, a linear ramp across it.
#[inline]
fn in_band(width: f32, dist: f32, side: bool) -> f32 {
    if width == 0.0 || width < dist {
        return if side { 1.0 } else { 0.0 };
    }
    if side {
        (dist + 0.5 * width) / width
    } else {
        (0.5 * width - dist) / width
    }
}

/// Per-call wipe geometry.
#[derive(Debug, Clone, Copy)]
pub struct WipeZone {
    kind: WipeKind,
    forward: bool,
    flip: bool,
    slope: f32,
    pythangle: f32,
    width: f32,
    height: f32,
    band: i32,
    clock_width: f32,
}

impl WipeZone {
    /// Precomputes the geometry for a `width` x `height` frame.
    pub fn new(params: &WipeParams, width: usize, height: usize) -> Self {
        let slope = params.angle.abs().tan();
        let (w, h) = (width as f32, height as f32);
        Self {
            kind: params.kind,
            forward: params.forward,
            flip: params.angle < 0.0,
            slope,
            pythangle: 1.0 / (slope * slope + 1.0).sqrt(),
            width: w,
            height: h,
            band: (params.edge_width * ((w + h) / 2.0)) as i32,
            clock_width: params.edge_width * PI,
        }
    }

    /// Share of input 1 at pixel `(col, row)` (row 0 on top), in `[0, 1]`.
    #[inline]
    pub fn coverage(&self, col: usize, row: usize, fac: f32) -> f32 {
        let x = col as f32 + 0.5;
        let y = self.height - row as f32 - 0.5;
        1.0 - self.check(x, y, fac)
    }

    fn check(&self, x: f32, y: f32, fac: f32) -> f32 {
        let (xo, yo) = (self.width, self.height);
        let (halfx, halfy) = (xo * 0.5, yo * 0.5);
        let x = if self.flip { xo - x } else { x };
        let angle = self.slope;
        let (posx, posy) = if self.forward {
            (fac * xo, fac * yo)
        } else {
            (xo - fac * xo, yo - fac * yo)
        };

        let output = match self.kind {
            WipeKind::Single => {
                let band = self.band.min((fac * yo) as i32).min((yo - fac * yo) as i32) as f32;
                let (b1, b2, hyp) = if angle == 0.0 {
                    (posy, y, (y - posy).abs())
                } else {
                    (
                        posy + angle * posx,
                        y + angle * x,
                        (angle * x + y - posy - angle * posx).abs() * self.pythangle,
                    )
                };
                in_band(band, hyp, (b1 < b2) == self.forward)
            }
            WipeKind::Double => {
                let mut hwidth = self.band as f32 * 0.5;
                let (b1, b2, b3, hyp, hyp2) = if angle == 0.0 {
                    (
                        posy * 0.5,
                        y,
                        yo - posy * 0.5,
                        (y - posy * 0.5).abs(),
                        (y - (yo - posy * 0.5)).abs(),
                    )
                } else {
                    let near = posy * 0.5 + angle * posx * 0.5;
                    let far = (yo - posy * 0.5) + angle * (xo - posx * 0.5);
                    (
                        near,
                        y + angle * x,
                        far,
                        (angle * x + y - near).abs() * self.pythangle,
                        (angle * x + y - far).abs() * self.pythangle,
                    )
                };
                hwidth = hwidth.min((b3 - b1).abs() / 2.0);
                let output = if b2 < b1 && b2 < b3 {
                    in_band(hwidth, hyp, false)
                } else if b2 > b1 && b2 > b3 {
                    in_band(hwidth, hyp2, false)
                } else if hyp < hwidth && hyp2 > hwidth {
                    in_band(hwidth, hyp, true)
                } else if hyp > hwidth && hyp2 < hwidth {
                    in_band(hwidth, hyp2, true)
                } else {
                    in_band(hwidth, hyp2, true) * in_band(hwidth, hyp, true)
                };
                if self.forward { output } else { 1.0 - output }
            }
            WipeKind::Clock => {
                let tau = 2.0 * PI;
                let widthf = self.clock_width;
                let centre = if self.forward { tau - tau * fac } else { tau * fac };
                let (dx, dy) = (x - halfx, y - halfy);
                let mut theta = dy.atan2(dx);
                if theta < 0.0 {
                    theta += tau;
                }
                let (low, high) = if self.forward {
                    (centre - widthf * fac, centre + widthf * (1.0 - fac))
                } else {
                    (centre - widthf * (1.0 - fac), centre + widthf * fac)
                };
                let (low, high) = (low.max(0.0), high.min(tau));
                let mut output = if theta < low {
                    0.0
                } else if theta > high {
                    1.0
                } else {
                    (theta - low) / (high - low)
                };
                if (dx == 0.0 && dy == 0.0) || output.is_nan() {
                    output = 1.0;
                }
                if self.forward { 1.0 - output } else { output }
            }
            WipeKind::Iris => {
                let fac = if self.forward { fac } else { 1.0 - fac };
                let hwidth = self.band as f32 * 0.5;
                let radius = halfx - halfx * fac;
                let pointdist = radius.hypot(radius);
                let dist = (halfx - x).hypot(halfy - y);
                let output = in_band(hwidth, (dist - pointdist).abs(), dist <= pointdist);
                if self.forward { output } else { 1.0 - output }
            }
        };
        output.clamp(0.0, 1.0)
    }
}

#[allow(clippy::too_many_arguments)]
fn wipe_rows<T: Copy>(
    zone: &WipeZone,
    fac: f32,
    width: usize,
    src1: &[T],
    src2: &[T],
    rows: Range<usize>,
    out: &mut [T],
    mix: impl Fn(f32, [T; 4], [T; 4]) -> [T; 4],
) {
    for (r, y) in rows.enumerate() {
        for x in 0..width {
            let i = y * width + x;
            let (a, b) = (load(src1, i), load(src2, i));
            let c = zone.coverage(x, y, fac);
            let px = if c >= 1.0 {
                a
            } else if c <= 0.0 {
                b
            } else {
                mix(c, a, b)
            };
            store(out, r * width + x, px);
        }
    }
}

#[inline]
fn mix_premul(c: f32, p1: [f32; 4], p2: [f32; 4]) -> [f32; 4] {
    std::array::from_fn(|k| p1[k] * c + p2[k] * (1.0 - c))
}

/// Geometric reveal of input 1 over input 2.
#[derive(Debug, Clone, Copy)]
pub struct WipeEffect;

impl Effect for WipeEffect {
    fn effect_type(&self) -> EffectType {
        EffectType::Wipe
    }

    fn default_params(&self) -> EffectParams {
        EffectParams::Wipe(WipeParams::default())
    }

    fn early_out(&self, _params: &EffectParams, fac: f32) -> EarlyOut {
        if fac == 0.0 {
            EarlyOut::UseInput2
        } else if fac == 1.0 {
            EarlyOut::UseInput1
        } else {
            EarlyOut::DoEffect
        }
    }

    fn default_factor(&self, strip: &EffectStrip, timeline_frame: f32) -> f32 {
        fade_factor(strip, timeline_frame)
    }

    fn execute(&self, call: &EffectCall<'_>) -> EffectResult<Option<Frame>> {
        let params = *call.strip.params.wipe()?;
        let inputs = Inputs::prepare(call, self.num_inputs())?;
        let zone = WipeZone::new(&params, inputs.width(), inputs.height());
        let mut out = inputs.allocate_output(call.ctx)?;
        let (fac, width) = (call.fac, inputs.width());
        trace!(width, height = inputs.height(), fac, kind = ?params.kind, "wipe");

        run_sliced(&mut out, call.schedule.slice_rows, |rows, slice| match slice {
            SliceMut::Byte(o) => wipe_rows(&zone, fac, width, inputs.bytes(0), inputs.bytes(1), rows, o, |c, a, b| {
                premul_f32_to_straight_u8(mix_premul(c, straight_u8_to_premul_f32(a), straight_u8_to_premul_f32(b)))
            }),
            SliceMut::Float(o) => {
                wipe_rows(&zone, fac, width, inputs.floats(0), inputs.floats(1), rows, o, |c, a, b| {
                    unpremultiply(mix_premul(c, premultiply(a), premultiply(b)))
                })
            }
        })?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{gradient_byte, run, strip};

    fn wipe(params: WipeParams, fac: f32, a: &Frame, b: &Frame) -> Frame {
        let mut s = strip(EffectType::Wipe);
        *s.params.wipe_mut().unwrap() = params;
        run(&s, fac, [Some(a), Some(b), None]).unwrap().unwrap()
    }

    #[test]
    fn test_single_boundaries() {
        let a = gradient_byte(13, 9, 1);
        let b = gradient_byte(13, 9, 2);
        for angle in [0.0, 0.4, -0.7, 1.2] {
            for edge_width in [0.0, 0.1, 0.5] {
                for forward in [true, false] {
                    let p = WipeParams {
                        kind: WipeKind::Single,
                        edge_width,
                        angle,
                        forward,
                    };
                    assert_eq!(wipe(p, 0.0, &a, &b).bytes(), b.bytes(), "{p:?} fac 0");
                    assert_eq!(wipe(p, 1.0, &a, &b).bytes(), a.bytes(), "{p:?} fac 1");
                }
            }
        }
    }

    #[test]
    fn test_single_half_splits_rows() {
        let a = Frame::filled_byte(4, 4, [255, 0, 0, 255]);
        let b = Frame::filled_byte(4, 4, [0, 0, 255, 255]);
        let out = wipe(WipeParams::default(), 0.5, &a, &b);
        assert_eq!(out.byte_pixel(0, 0).unwrap(), [0, 0, 255, 255]);
        assert_eq!(out.byte_pixel(3, 1).unwrap(), [0, 0, 255, 255]);
        assert_eq!(out.byte_pixel(0, 2).unwrap(), [255, 0, 0, 255]);
        assert_eq!(out.byte_pixel(2, 3).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_soft_edge_blends() {
        let p = WipeParams {
            edge_width: 1.0,
            ..Default::default()
        };
        let zone = WipeZone::new(&p, 20, 20);
        let row: Vec<f32> = (0..20).map(|y| zone.coverage(0, y, 0.5)).collect();
        assert!(row.iter().any(|&c| c > 0.0 && c < 1.0));
        assert!(row.windows(2).all(|w| w[0] <= w[1] + 1e-6));
    }

    #[test]
    fn test_coverage_in_unit_range() {
        for kind in [WipeKind::Single, WipeKind::Double, WipeKind::Iris, WipeKind::Clock] {
            for forward in [true, false] {
                let p = WipeParams {
                    kind,
                    edge_width: 0.3,
                    angle: 0.5,
                    forward,
                };
                let zone = WipeZone::new(&p, 16, 10);
                for fac in [0.0, 0.25, 0.5, 0.75, 1.0] {
                    for y in 0..10 {
                        for x in 0..16 {
                            let c = zone.coverage(x, y, fac);
                            assert!((0.0..=1.0).contains(&c), "{kind:?} {fac} ({x},{y}) = {c}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_iris_opens_from_centre() {
        let p = WipeParams {
            kind: WipeKind::Iris,
            ..Default::default()
        };
        let zone = WipeZone::new(&p, 20, 20);
        // Half way: centre shows input 2, corners input 1.
        assert_eq!(zone.coverage(10, 10, 0.5), 0.0);
        assert_eq!(zone.coverage(0, 0, 0.5), 1.0);
    }

    #[test]
    fn test_clock_sweeps() {
        let p = WipeParams {
            kind: WipeKind::Clock,
            ..Default::default()
        };
        let zone = WipeZone::new(&p, 20, 20);
        let revealed = |fac: f32| {
            (0..20)
                .flat_map(|y| (0..20).map(move |x| (x, y)))
                .filter(|&(x, y)| zone.coverage(x, y, fac) >= 1.0)
                .count()
        };
        assert!(revealed(0.25) < revealed(0.75));
    }

    #[test]
    fn test_early_out() {
        let params = EffectParams::Wipe(WipeParams::default());
        assert_eq!(WipeEffect.early_out(&params, 0.0), EarlyOut::UseInput2);
        assert_eq!(WipeEffect.early_out(&params, 1.0), EarlyOut::UseInput1);
        assert_eq!(WipeEffect.early_out(&params, 0.5), EarlyOut::DoEffect);
    }
}
