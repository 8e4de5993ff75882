//! Effect parameters: one shape per effect type.

use crate::effects::blend_mode::ColorMixParams;
use crate::effects::channel::MulticamParams;
use crate::effects::gaussian::GaussianBlurParams;
use crate::effects::glow::GlowParams;
use crate::effects::solid::SolidColorParams;
use crate::effects::speed::SpeedParams;
use crate::effects::text::TextParams;
use crate::effects::transform::TransformParams;
use crate::effects::wipe::WipeParams;
use crate::error::{EffectError, EffectResult};

/// Per-strip effect data.
///
/// Effects without settings keep [`EffectParams::None`]. `Clone` is the
/// deep copy used when a strip is duplicated: owned buffers are copied and
/// transient handles (font, frame map) are reset by the shapes holding them.
#[derive(Debug, Clone, Default)]
pub enum EffectParams {
    /// No stored settings.
    #[default]
    None,
    /// Wipe geometry.
    Wipe(WipeParams),
    /// Glow thresholds and blur.
    Glow(GlowParams),
    /// Affine transform.
    Transform(TransformParams),
    /// Gaussian blur radii.
    GaussianBlur(GaussianBlurParams),
    /// Speed control and frame map.
    Speed(SpeedParams),
    /// Text content and layout.
    Text(TextParams),
    /// Fill color.
    SolidColor(SolidColorParams),
    /// Blend sub-mode and factor.
    ColorMix(ColorMixParams),
    /// Alternate source channel.
    Multicam(MulticamParams),
}

macro_rules! params_accessors {
    ($( $variant:ident => $as_ref:ident, $as_mut:ident, $ty:ty, $label:literal; )*) => {
        impl EffectParams {
            /// Name of the stored shape.
            pub fn kind(&self) -> &'static str {
                match self {
                    EffectParams::None => "none",
                    $( EffectParams::$variant(_) => $label, )*
                }
            }

            $(
                #[doc = concat!("Borrows the ", $label, " parameters.")]
                pub fn $as_ref(&self) -> EffectResult<&$ty> {
                    match self {
                        EffectParams::$variant(p) => Ok(p),
                        other => Err(EffectError::ParamsMismatch {
                            effect: $label,
                            found: other.kind(),
                        }),
                    }
                }

                #[doc = concat!("Mutably borrows the ", $label, " parameters.")]
                pub fn $as_mut(&mut self) -> EffectResult<&mut $ty> {
                    match self {
                        EffectParams::$variant(p) => Ok(p),
                        other => Err(EffectError::ParamsMismatch {
                            effect: $label,
                            found: other.kind(),
                        }),
                    }
                }
            )*
        }
    };
}

params_accessors! {
    Wipe => wipe, wipe_mut, WipeParams, "wipe";
    Glow => glow, glow_mut, GlowParams, "glow";
    Transform => transform, transform_mut, TransformParams, "transform";
    GaussianBlur => gaussian_blur, gaussian_blur_mut, GaussianBlurParams, "gaussian_blur";
    Speed => speed, speed_mut, SpeedParams, "speed";
    Text => text, text_mut, TextParams, "text";
    SolidColor => solid_color, solid_color_mut, SolidColorParams, "solid_color";
    ColorMix => color_mix, color_mix_mut, ColorMixParams, "color_mix";
    Multicam => multicam, multicam_mut, MulticamParams, "multicam";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_shape_is_an_error() {
        let p = EffectParams::Glow(GlowParams::default());
        assert!(p.glow().is_ok());
        let err = p.wipe().unwrap_err();
        assert_eq!(err.to_string(), "wipe parameters requested, strip holds glow");
    }

    #[test]
    fn test_none_kind() {
        assert_eq!(EffectParams::None.kind(), "none");
        assert!(EffectParams::None.speed().is_err());
    }
}
