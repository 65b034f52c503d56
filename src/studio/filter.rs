//! Stylistic filters
//!
//! Every filter is a deterministic function of its input. Posterize and Solarize work
//! on opaque RGB, Retro keeps the input's own color model, and Sketch always
//! yields a single-channel image.

use crate::error::Result;
use crate::imageops_studio::gaussian::GaussianBlurExt;
use crate::utils::{luma_601_rounded, luma_601_truncated};
use crate::Image;
use image::{DynamicImage, ImageBuffer, Luma, Pixel};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Posterize keeps this many high bits of each sample
const POSTERIZE_MASK: u8 = 0xF0;
/// Samples at or above this level are inverted by Solarize
const SOLARIZE_THRESHOLD: u8 = 128;
const RETRO_COLOR: f32 = 1.6;
const RETRO_CONTRAST: f32 = 1.2;
/// 21x21 blur for the pencil-sketch dodge
const SKETCH_BLUR_SIZE: u32 = 21;

/// Stylistic filter selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Identity
    #[default]
    None,
    /// 16 levels per channel
    Posterize,
    /// Invert bright samples
    Solarize,
    /// Saturation boost then contrast boost
    Retro,
    /// Grayscale pencil sketch
    Sketch,
}

/// Applies `kind` to `image`.
///
/// # Errors
///
/// * `Error::Blur` - if the Sketch blur fails; the other filters cannot fail
///
/// # Examples
///
/// ```rust
/// use imageops_studio::{apply_filter, FilterKind};
/// use image::{DynamicImage, Rgb, RgbImage};
///
/// let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([200, 17, 128])));
/// let out = apply_filter(image, FilterKind::Posterize).unwrap();
/// assert_eq!(out.to_rgb8().get_pixel(0, 0), &Rgb([192, 16, 128]));
/// ```
#[instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
pub fn apply_filter(image: DynamicImage, kind: FilterKind) -> Result<DynamicImage> {
    let filtered = match kind {
        FilterKind::None => image,
        FilterKind::Posterize => DynamicImage::ImageRgb8(map_rgb_samples(image, posterize_sample)),
        FilterKind::Solarize => DynamicImage::ImageRgb8(map_rgb_samples(image, solarize_sample)),
        FilterKind::Retro => retro(image),
        FilterKind::Sketch => DynamicImage::ImageLuma8(sketch(&image)?),
    };
    Ok(filtered)
}

#[inline]
fn posterize_sample(value: u8) -> u8 {
    value & POSTERIZE_MASK
}

#[inline]
fn solarize_sample(value: u8) -> u8 {
    if value >= SOLARIZE_THRESHOLD {
        u8::MAX - value
    } else {
        value
    }
}

fn map_rgb_samples(image: DynamicImage, f: impl Fn(u8) -> u8) -> image::RgbImage {
    let mut rgb = image.into_rgb8();
    for sample in rgb.iter_mut() {
        *sample = f(*sample);
    }
    rgb
}

fn retro(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(retro_buffer(&gray)),
        DynamicImage::ImageLumaA8(gray) => DynamicImage::ImageLumaA8(retro_buffer(&gray)),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(retro_buffer(&rgb)),
        DynamicImage::ImageRgba8(rgba) => DynamicImage::ImageRgba8(retro_buffer(&rgba)),
        other => {
            debug!(color = ?other.color(), "retro on a non-8-bit image, converting to RGBA8");
            DynamicImage::ImageRgba8(retro_buffer(&other.into_rgba8()))
        }
    }
}

/// Color enhancement followed by contrast enhancement.
///
/// Both steps blend the image away from a degenerate version of itself:
/// `out = degenerate + factor * (value - degenerate)`, truncated and clamped.
/// The alpha channel, when present, is left untouched.
fn retro_buffer<P>(image: &Image<P>) -> Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    let colors = usize::from(P::CHANNEL_COUNT) - usize::from(P::HAS_ALPHA);

    let mut saturated = image.clone();
    for pixel in saturated.pixels_mut() {
        let channels = &mut pixel.channels_mut()[..colors];
        let gray = gray_level(channels);
        for sample in channels.iter_mut() {
            *sample = blend(gray, *sample, RETRO_COLOR);
        }
    }

    let mean = mean_gray_level(&saturated, colors);
    let mut contrasted = saturated;
    for pixel in contrasted.pixels_mut() {
        for sample in pixel.channels_mut()[..colors].iter_mut() {
            *sample = blend(mean, *sample, RETRO_CONTRAST);
        }
    }
    contrasted
}

#[inline]
fn gray_level(colors: &[u8]) -> u8 {
    match *colors {
        [red, green, blue] => luma_601_truncated(red, green, blue),
        [luminance, ..] => luminance,
        [] => 0,
    }
}

fn mean_gray_level<P>(image: &Image<P>, colors: usize) -> u8
where
    P: Pixel<Subpixel = u8>,
{
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0;
    }
    let total: u64 = image
        .pixels()
        .map(|pixel| u64::from(gray_level(&pixel.channels()[..colors])))
        .sum();
    (total as f64 / count as f64 + 0.5) as u8
}

#[inline]
fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let degenerate = f32::from(degenerate);
    (degenerate + factor * (f32::from(value) - degenerate)).clamp(0.0, 255.0) as u8
}

fn sketch(image: &DynamicImage) -> Result<Image<Luma<u8>>> {
    let rgb = image.to_rgb8();
    let gray: Image<Luma<u8>> = ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [red, green, blue] = rgb.get_pixel(x, y).0;
        Luma([luma_601_rounded(red, green, blue)])
    });
    let inverted: Image<Luma<u8>> = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([u8::MAX - gray.get_pixel(x, y)[0]])
    });
    let blurred = inverted.gaussian_blur_sized(SKETCH_BLUR_SIZE, None)?;

    Ok(ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([color_dodge(gray.get_pixel(x, y)[0], blurred.get_pixel(x, y)[0])])
    }))
}

/// `min(255, round(base * 256 / (255 - blend)))`, 0 where the divisor is 0
#[inline]
fn color_dodge(base: u8, blend: u8) -> u8 {
    let divisor = u32::from(u8::MAX - blend);
    if divisor == 0 {
        return 0;
    }
    let scaled = (u32::from(base) * 256 + divisor / 2) / divisor;
    scaled.min(u32::from(u8::MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_rgb_image, create_test_rgba_image};
    use image::{GrayImage, LumaA, Rgb, RgbImage, Rgba};

    #[test]
    fn none_is_identity() {
        let image = DynamicImage::ImageRgba8(create_test_rgba_image());
        assert_eq!(apply_filter(image.clone(), FilterKind::None).unwrap(), image);
    }

    #[test]
    fn posterize_keeps_top_four_bits() {
        let image = DynamicImage::ImageRgb8(create_test_rgb_image());
        let out = apply_filter(image, FilterKind::Posterize).unwrap().into_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([192, 144, 96]));
        assert_eq!(out.get_pixel(1, 1), &Rgb([48, 64, 16]));
    }

    #[test]
    fn posterize_drops_alpha() {
        let image = DynamicImage::ImageRgba8(create_test_rgba_image());
        let out = apply_filter(image, FilterKind::Posterize).unwrap();
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn solarize_inverts_bright_samples() {
        assert_eq!(solarize_sample(127), 127);
        assert_eq!(solarize_sample(128), 127);
        assert_eq!(solarize_sample(255), 0);

        let image = DynamicImage::ImageRgb8(create_test_rgb_image());
        let out = apply_filter(image, FilterKind::Solarize).unwrap().into_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([55, 105, 100]));
    }

    #[test]
    fn retro_leaves_gray_pixels_alone_when_mean_matches() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([90, 90, 90])));
        assert_eq!(apply_filter(image.clone(), FilterKind::Retro).unwrap(), image);
    }

    #[test]
    fn retro_boosts_saturation_and_contrast() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        image.put_pixel(1, 0, Rgb([150, 100, 100]));
        let out = apply_filter(DynamicImage::ImageRgb8(image), FilterKind::Retro)
            .unwrap()
            .into_rgb8();

        // gray of (150,100,100) is 114; saturation gives (171,91,91)
        // mean gray is round((100 + 114) / 2) = 107
        assert_eq!(out.get_pixel(0, 0), &Rgb([98, 98, 98]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([183, 87, 87]));
    }

    #[test]
    fn retro_preserves_alpha_and_color_model() {
        let image = DynamicImage::ImageRgba8(create_test_rgba_image());
        let out = apply_filter(image, FilterKind::Retro).unwrap();
        let DynamicImage::ImageRgba8(out) = out else {
            panic!("expected RGBA output");
        };
        let alphas: Vec<u8> = out.pixels().map(|p| p[3]).collect();
        assert_eq!(alphas, vec![255, 128, 64, 0]);

        let gray = DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(2, 2, LumaA([40, 7])));
        assert!(matches!(
            apply_filter(gray, FilterKind::Retro).unwrap(),
            DynamicImage::ImageLumaA8(_)
        ));
    }

    #[test]
    fn sketch_is_single_channel() {
        for image in [
            DynamicImage::ImageRgb8(create_test_rgb_image()),
            DynamicImage::ImageRgba8(create_test_rgba_image()),
            DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([10]))),
        ] {
            let out = apply_filter(image, FilterKind::Sketch).unwrap();
            assert_eq!(out.color().channel_count(), 1);
        }
    }

    #[test]
    fn sketch_of_white_is_white() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            30,
            25,
            Rgba([255, 255, 255, 255]),
        ));
        let out = apply_filter(image, FilterKind::Sketch).unwrap().into_luma8();
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn sketch_draws_edges_dark() {
        let image = RgbImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgb([230, 230, 230])
            } else {
                Rgb([30, 30, 30])
            }
        });
        let out = apply_filter(DynamicImage::ImageRgb8(image), FilterKind::Sketch)
            .unwrap()
            .into_luma8();
        // flat areas far from the edge wash out to white
        assert_eq!(out.get_pixel(2, 20)[0], 255);
        assert_eq!(out.get_pixel(35, 20)[0], 255);
        // the dark side of the edge is drawn as a line
        assert!(out.get_pixel(20, 20)[0] < 100);
    }

    #[test]
    fn sketch_handles_images_smaller_than_the_blur() {
        for (width, height) in [(1, 1), (2, 5), (0, 0)] {
            let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([80, 90, 100])));
            let out = apply_filter(image, FilterKind::Sketch).unwrap().into_luma8();
            assert_eq!(out.dimensions(), (width, height));
            assert!(out.pixels().all(|p| p[0] == 255));
        }
    }

    #[test]
    fn dodge_handles_saturated_blend() {
        assert_eq!(color_dodge(0, 255), 0);
        assert_eq!(color_dodge(200, 255), 0);
        assert_eq!(color_dodge(255, 0), 255);
        assert_eq!(color_dodge(100, 128), 202);
    }
}
