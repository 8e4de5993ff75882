//! The closed set of blend modes.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Paint-program blend mode.
///
/// `a` is the base (first input), `b` the blend layer (second input).
/// Per-channel modes work on each of R, G, B independently; [`Hue`],
/// [`Saturation`], [`Color`] and [`Value`] recombine HSV components.
///
/// [`Hue`]: BlendMode::Hue
/// [`Saturation`]: BlendMode::Saturation
/// [`Color`]: BlendMode::Color
/// [`Value`]: BlendMode::Value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `min(a, b)`
    Darken,
    /// `1 - (1 - a) / b`
    ColorBurn,
    /// `a + b - 1`
    LinearBurn,
    /// `1 - (1 - a)(1 - b)`
    Screen,
    /// `max(a, b)`
    Lighten,
    /// `a / (1 - b)`
    Dodge,
    /// Multiply or screen, keyed on the base.
    #[default]
    Overlay,
    /// Pegtop soft light: `(1 - 2b)a² + 2ab`
    SoftLight,
    /// Multiply or screen, keyed on the blend layer.
    HardLight,
    /// Darken or lighten, keyed on the blend layer.
    PinLight,
    /// `a + 2b - 1`
    LinearLight,
    /// Burn or dodge, keyed on the blend layer.
    VividLight,
    /// Hue and saturation of `b`, value of `a`.
    Color,
    /// Hue of `b`.
    Hue,
    /// Saturation of `b`.
    Saturation,
    /// Value of `b`.
    Value,
    /// `|a - b|`
    Difference,
    /// `a + b - 2ab`
    Exclusion,
}

impl BlendMode {
    /// Every mode, in menu order.
    pub const ALL: [BlendMode; 21] = [
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Multiply,
        BlendMode::Darken,
        BlendMode::ColorBurn,
        BlendMode::LinearBurn,
        BlendMode::Screen,
        BlendMode::Lighten,
        BlendMode::Dodge,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::PinLight,
        BlendMode::LinearLight,
        BlendMode::VividLight,
        BlendMode::Color,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Value,
        BlendMode::Difference,
        BlendMode::Exclusion,
    ];

    /// Stable lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Darken => "darken",
            Self::ColorBurn => "color_burn",
            Self::LinearBurn => "linear_burn",
            Self::Screen => "screen",
            Self::Lighten => "lighten",
            Self::Dodge => "dodge",
            Self::Overlay => "overlay",
            Self::SoftLight => "soft_light",
            Self::HardLight => "hard_light",
            Self::PinLight => "pin_light",
            Self::LinearLight => "linear_light",
            Self::VividLight => "vivid_light",
            Self::Color => "color",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Value => "value",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
        }
    }

    /// `true` for modes that mix whole RGB triples through HSV.
    #[inline]
    pub fn is_hsv(self) -> bool {
        matches!(
            self,
            Self::Color | Self::Hue | Self::Saturation | Self::Value
        )
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown blend mode name.
#[derive(Debug, Error)]
#[error("unknown blend mode: {0}")]
pub struct ParseBlendModeError(pub String);

impl FromStr for BlendMode {
    type Err = ParseBlendModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match key.as_str() {
            "sub" => Some(Self::Subtract),
            "mul" | "mult" => Some(Self::Multiply),
            "burn" => Some(Self::ColorBurn),
            "luminosity" => Some(Self::Value),
            "softlight" => Some(Self::SoftLight),
            "hardlight" => Some(Self::HardLight),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|m| m.name() == key))
            .ok_or(ParseBlendModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.name().parse::<BlendMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("Soft-Light".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!("mul".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert!("glitter".parse::<BlendMode>().is_err());
    }
}
