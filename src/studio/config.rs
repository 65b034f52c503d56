use crate::error::{ConfigError, Result};
use crate::studio::background::Background;
use crate::studio::codec::decode;
use crate::studio::color::Color;
use crate::studio::filter::FilterKind;
use crate::studio::frame::{Frame, MAX_FRAME_WIDTH};
use serde::{Deserialize, Serialize};

/// Background mode as named on the configuration surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundMode {
    #[default]
    Original,
    RemoveBackground,
    ColorFill,
    CustomImage,
}

/// Flat, user-facing configuration for one run
///
/// Mirrors the options a front end exposes. Colors stay strings here and
/// are checked by [`StudioConfig::to_recipe`], so a bad color is reported
/// as [`ConfigError::InvalidColor`] rather than a parse failure.
///
/// ```rust
/// use imageops_studio::{Background, Color, FilterKind, StudioConfig};
///
/// let config = StudioConfig::from_json(
///     r##"{"background_mode": "ColorFill", "fill_color": "#0f0", "filter_kind": "Retro"}"##,
/// ).unwrap();
/// let recipe = config.to_recipe().unwrap();
/// assert_eq!(recipe.background, Background::ColorFill(Color::new(0, 255, 0)));
/// assert_eq!(recipe.filter, FilterKind::Retro);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub crop_enabled: bool,
    pub background_mode: BackgroundMode,
    pub fill_color: String,
    /// Encoded JPEG or PNG; only settable through the API
    #[serde(skip)]
    pub custom_background: Option<Vec<u8>>,
    pub filter_kind: FilterKind,
    pub enhance_enabled: bool,
    pub frame_width: u32,
    pub frame_color: String,
    /// Drop alpha before encoding the result
    pub flatten_export: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            crop_enabled: false,
            background_mode: BackgroundMode::Original,
            fill_color: Color::WHITE.to_string(),
            custom_background: None,
            filter_kind: FilterKind::None,
            enhance_enabled: false,
            frame_width: 0,
            frame_color: Color::BLACK.to_string(),
            flatten_export: false,
        }
    }
}

impl StudioConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Validates the configuration into a typed [`Recipe`].
    ///
    /// Colors are only parsed for the modes that use them, and the custom
    /// background is only decoded in `CustomImage` mode.
    ///
    /// # Errors
    ///
    /// * `Error::Configuration` - invalid color or frame width
    /// * `Error::Decode` - custom background bytes are not an image
    pub fn to_recipe(&self) -> Result<Recipe> {
        let background = match self.background_mode {
            BackgroundMode::Original => Background::Original,
            BackgroundMode::RemoveBackground => Background::RemoveBackground,
            BackgroundMode::ColorFill => Background::ColorFill(self.fill_color.parse()?),
            BackgroundMode::CustomImage => Background::CustomImage(
                self.custom_background
                    .as_deref()
                    .map(decode)
                    .transpose()?,
            ),
        };

        let frame = Frame {
            width: self.frame_width,
            color: if self.frame_width > 0 {
                self.frame_color.parse()?
            } else {
                Color::BLACK
            },
        };

        let recipe = Recipe {
            crop: self.crop_enabled,
            background,
            enhance: self.enhance_enabled,
            filter: self.filter_kind,
            frame,
        };
        recipe.validate()?;
        Ok(recipe)
    }
}

/// Validated description of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    /// Ask the crop selector for a region before anything else
    pub crop: bool,
    pub background: Background,
    pub enhance: bool,
    pub filter: FilterKind,
    pub frame: Frame,
}

impl Recipe {
    /// Checks ranges that the types alone do not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.width > MAX_FRAME_WIDTH {
            return Err(ConfigError::FrameWidthTooLarge {
                width: self.frame.width,
                max: MAX_FRAME_WIDTH,
            });
        }
        Ok(())
    }
}
