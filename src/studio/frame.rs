use crate::error::Result;
use crate::imageops_studio::padding::Padding;
use crate::studio::color::Color;
use image::DynamicImage;
use tracing::{debug, instrument};

/// Largest accepted border, in pixels per side
pub const MAX_FRAME_WIDTH: u32 = 4096;

/// Border drawn around the finished image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub color: Color,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: 0,
            color: Color::BLACK,
        }
    }
}

/// Surrounds `image` with a `width`-pixel border of `color`.
///
/// The output keeps the input's color model: grayscale images get the
/// color's luma, images with alpha get an opaque border. A width of zero
/// returns the image unchanged.
///
/// # Errors
///
/// * `Error::Padding` - if the framed size does not fit in `u32`
///
/// # Examples
///
/// ```rust
/// use imageops_studio::{add_frame, Color};
/// use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
///
/// let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([9, 9, 9, 0])));
/// let framed = add_frame(image, 2, Color::WHITE).unwrap();
/// assert_eq!(framed.dimensions(), (7, 6));
/// assert_eq!(framed.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
/// assert_eq!(framed.get_pixel(2, 2), Rgba([9, 9, 9, 0]));
/// ```
#[instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
pub fn add_frame(image: DynamicImage, border: u32, color: Color) -> Result<DynamicImage> {
    if border == 0 {
        return Ok(image);
    }

    let framed = match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(gray.add_border(border, color.to_luma())?)
        }
        DynamicImage::ImageLumaA8(gray) => {
            DynamicImage::ImageLumaA8(gray.add_border(border, color.to_luma_alpha())?)
        }
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(rgb.add_border(border, color.to_rgb())?),
        DynamicImage::ImageRgba8(rgba) => {
            DynamicImage::ImageRgba8(rgba.add_border(border, color.to_rgba())?)
        }
        other => {
            debug!(color = ?other.color(), "framing a non-8-bit image as RGBA8");
            DynamicImage::ImageRgba8(other.into_rgba8().add_border(border, color.to_rgba())?)
        }
    };
    Ok(framed)
}
