use crate::error::ConfigError;
use crate::utils::luma_601_truncated;
use image::{Luma, LumaA, Rgb, Rgba};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque sRGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub const fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.red, self.green, self.blue])
    }

    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.red, self.green, self.blue, u8::MAX])
    }

    /// Grayscale equivalent used when drawing on single-channel images
    pub fn to_luma(self) -> Luma<u8> {
        Luma([luma_601_truncated(self.red, self.green, self.blue)])
    }

    pub fn to_luma_alpha(self) -> LumaA<u8> {
        let Luma([luminance]) = self.to_luma();
        LumaA([luminance, u8::MAX])
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    /// Accepts `#rrggbb` and `#rgb`, case-insensitive, `#` optional.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor {
            value: value.to_owned(),
        };
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!("#ffffff".parse::<Color>(), Ok(Color::WHITE));
        assert_eq!("#000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("1E90FF".parse::<Color>(), Ok(Color::new(0x1e, 0x90, 0xff)));
        assert_eq!("#abc".parse::<Color>(), Ok(Color::new(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn rejects_garbage() {
        for value in ["", "#", "#12345", "#gggggg", "red", "#ééé", "#+1+2+3"] {
            assert_eq!(
                value.parse::<Color>(),
                Err(ConfigError::InvalidColor {
                    value: value.to_owned()
                }),
                "{value}"
            );
        }
    }

    #[test]
    fn sign_prefixed_pairs_are_not_hex() {
        for value in ["#+1+2+3", "+a+b+c", "#+f+f+f"] {
            assert!(value.parse::<Color>().is_err(), "{value}");
        }
        assert_eq!("#0a0b0c".parse::<Color>(), Ok(Color::new(10, 11, 12)));
    }

    #[test]
    fn displays_as_lower_hex() {
        assert_eq!(Color::new(255, 0, 16).to_string(), "#ff0010");
    }

    #[test]
    fn luma_uses_truncating_601_weights() {
        assert_eq!(Color::WHITE.to_luma(), Luma([255]));
        assert_eq!(Color::new(255, 0, 0).to_luma(), Luma([76]));
        assert_eq!(Color::BLACK.to_luma_alpha(), LumaA([0, 255]));
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&Color::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::new(1, 2, 3));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
