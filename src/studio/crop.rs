use crate::error::{ConfigError, Result};
use crate::imageops_studio::content_bounds::ContentBounds;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Axis-aligned rectangle in source pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` image
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Intersection with a `width` x `height` image, `None` when empty
    pub fn clamp_to(self, width: u32, height: u32) -> Option<Self> {
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(Self::new(self.x, self.y, right - self.x, bottom - self.y))
    }

    const fn as_tuple(self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }
}

/// Source of the crop rectangle
///
/// Stands in for whatever lets a user pick a region. It is consulted once
/// per run, before background processing.
pub trait CropSelector: Send + Sync {
    fn acquire_crop_rectangle(&self, image: &DynamicImage) -> Result<Rect>;
}

/// Selects the whole image
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrop;

impl CropSelector for NoCrop {
    fn acquire_crop_rectangle(&self, image: &DynamicImage) -> Result<Rect> {
        Ok(Rect::full(image.width(), image.height()))
    }
}

/// Always selects the same rectangle
#[derive(Debug, Clone, Copy)]
pub struct FixedCrop(pub Rect);

impl CropSelector for FixedCrop {
    fn acquire_crop_rectangle(&self, _image: &DynamicImage) -> Result<Rect> {
        Ok(self.0)
    }
}

/// Trims a uniform border
///
/// The color at the top-left corner is taken as background; everything
/// differing from it by more than `threshold` luminance levels is kept.
/// A uniform image is kept whole.
#[derive(Debug, Clone, Copy)]
pub struct ContentBoundsCrop {
    pub threshold: u8,
}

impl Default for ContentBoundsCrop {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

impl CropSelector for ContentBoundsCrop {
    fn acquire_crop_rectangle(&self, image: &DynamicImage) -> Result<Rect> {
        let bounds = image.to_rgba8().content_bounds(self.threshold);
        Ok(match bounds {
            Some((x, y, width, height)) => Rect::new(x, y, width, height),
            None => Rect::full(image.width(), image.height()),
        })
    }
}

/// Crops `image` to `rect` clamped to its bounds.
///
/// # Errors
///
/// * `Error::Configuration` - if `rect` does not overlap the image
pub fn crop(image: &DynamicImage, rect: Rect) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let clamped = rect
        .clamp_to(width, height)
        .ok_or(ConfigError::EmptyCropRegion {
            rect: rect.as_tuple(),
            width,
            height,
        })?;

    if clamped == Rect::full(width, height) {
        return Ok(image.clone());
    }
    debug!(?rect, ?clamped, "cropping");
    Ok(image.crop_imm(clamped.x, clamped.y, clamped.width, clamped.height))
}
