use crate::error::Result;
use crate::imageops_studio::clahe::Clahe;
use crate::imageops_studio::convert_color::LabConvertExt;
use crate::imageops_studio::filter3x3::{Filter3x3Ext, SHARPEN_KERNEL};
use crate::imageops_studio::nlmeans::{DenoiseColored, DEFAULT_SEARCH_WINDOW, DEFAULT_TEMPLATE_WINDOW};
use crate::studio::cache::{ContentCache, ContentKey};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Denoise, local contrast, and sharpening pass
///
/// Implementations must be deterministic so results can be memoized with
/// [`CachedEnhancer`]. The output is always opaque RGB with the input's
/// dimensions.
pub trait ImageEnhancer: Send + Sync {
    fn enhance(&self, image: &DynamicImage) -> Result<RgbImage>;
}

/// The default enhancement chain
///
/// 1. colored NL-means on 8-bit Lab
/// 2. CLAHE on the Lab lightness channel
/// 3. 3x3 sharpen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseSharpenEnhancer {
    /// Lightness filter strength
    pub h: f32,
    /// Chroma filter strength
    pub h_color: f32,
    pub template_window: u32,
    pub search_window: u32,
    pub clip_limit: f32,
    pub tile_grid: (u32, u32),
}

impl Default for DenoiseSharpenEnhancer {
    fn default() -> Self {
        Self {
            h: 6.0,
            h_color: 6.0,
            template_window: DEFAULT_TEMPLATE_WINDOW,
            search_window: DEFAULT_SEARCH_WINDOW,
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

impl ImageEnhancer for DenoiseSharpenEnhancer {
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    fn enhance(&self, image: &DynamicImage) -> Result<RgbImage> {
        let clahe = Clahe::new(self.clip_limit, self.tile_grid)?;
        let rgb = image.to_rgb8();

        let denoised = rgb.denoise_colored(
            self.h,
            self.h_color,
            self.template_window,
            self.search_window,
        )?;

        let mut lab = denoised.to_lab8();
        lab.l = clahe.apply(&lab.l)?;
        let equalized = lab.to_rgb();

        Ok(equalized.filter3x3_clamped(&SHARPEN_KERNEL))
    }
}

/// Runs the default enhancement chain on `image`.
///
/// # Errors
///
/// Fails only for images with no pixels.
pub fn enhance(image: &DynamicImage) -> Result<RgbImage> {
    DenoiseSharpenEnhancer::default().enhance(image)
}

/// Memoizes an [`ImageEnhancer`] by the decoded pixels of its input
#[derive(Debug)]
pub struct CachedEnhancer<E> {
    inner: E,
    cache: Arc<ContentCache<RgbImage>>,
}

impl<E: ImageEnhancer> CachedEnhancer<E> {
    pub fn new(inner: E) -> Self {
        Self::with_cache(inner, Arc::default())
    }

    pub fn with_cache(inner: E, cache: Arc<ContentCache<RgbImage>>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<ContentCache<RgbImage>> {
        &self.cache
    }
}

impl<E: ImageEnhancer> ImageEnhancer for CachedEnhancer<E> {
    fn enhance(&self, image: &DynamicImage) -> Result<RgbImage> {
        let key = ContentKey::of_image(image);
        self.cache.get_or_try_compute(key, || {
            debug!(?key, "enhancing");
            self.inner.enhance(image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::create_large_test_image;
    use image::{ImageBuffer, Rgb, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noisy_rgba(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            let noise = ((x * 7919 + y * 104_729) % 31) as u8;
            Rgba([100 + noise, 80 + noise / 2, 60, (x * 10 % 256) as u8])
        })
    }

    #[test]
    fn keeps_dimensions_and_drops_alpha() {
        let image = DynamicImage::ImageRgba8(noisy_rgba(37, 23));
        let out = enhance(&image).unwrap();
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn tiny_images_are_supported() {
        let image = DynamicImage::ImageRgb8(create_large_test_image(3, 2));
        assert_eq!(enhance(&image).unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn flat_color_stays_close() {
        // 16x16 tiles so the clip limit leaves a flat histogram nearly alone
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(128, 128, Rgb([90, 120, 150])));
        let out = enhance(&image).unwrap();
        for pixel in out.pixels() {
            for (got, want) in pixel.0.iter().zip([90u8, 120, 150]) {
                assert!(got.abs_diff(want) <= 6, "{pixel:?}");
            }
        }
    }

    #[test]
    fn empty_image_is_an_operation_error() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = enhance(&image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl ImageEnhancer for Counting {
        fn enhance(&self, image: &DynamicImage) -> Result<RgbImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(image.to_rgb8())
        }
    }

    #[test]
    fn cached_enhancer_runs_once_per_image() {
        let calls = Arc::new(AtomicUsize::new(0));
        let enhancer = CachedEnhancer::new(Counting {
            calls: Arc::clone(&calls),
        });
        let image = DynamicImage::ImageRgb8(create_large_test_image(8, 8));

        let first = enhancer.enhance(&image).unwrap();
        let second = enhancer.enhance(&image.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let other = DynamicImage::ImageRgb8(create_large_test_image(8, 9));
        enhancer.enhance(&other).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
