use image::{ImageBuffer, Luma, LumaA, Pixel, Primitive};
use imageproc::definitions::Image;

/// Bounding box `(x, y, width, height)` of the pixels that differ from the
/// background color sampled at the top-left corner.
pub trait ContentBounds {
    /// Returns `None` when every pixel is within `threshold` of the corner.
    ///
    /// Pixels are compared on alpha-weighted luminance scaled to `0..=255`.
    fn content_bounds(&self, threshold: u8) -> Option<(u32, u32, u32, u32)>;
}

impl<P, S> ContentBounds for Image<P>
where
    P: Pixel<Subpixel = S>,
    S: Primitive + Into<f32>,
{
    fn content_bounds(&self, threshold: u8) -> Option<(u32, u32, u32, u32)> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let max = S::DEFAULT_MAX_VALUE.into();
        let level = |pixel: &P| merge_alpha(pixel.to_luma_alpha(), max) / max * 255.0;
        let background = level(self.get_pixel(0, 0));

        let difference: Image<Luma<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            Luma([(level(self.get_pixel(x, y)) - background).abs().min(255.0) as u8])
        });

        let mut bounds: Option<[u32; 4]> = None;
        for (x, y, pixel) in difference.enumerate_pixels() {
            if pixel[0] > threshold {
                let [x1, y1, x2, y2] = bounds.get_or_insert([x, y, x, y]);
                *x1 = (*x1).min(x);
                *y1 = (*y1).min(y);
                *x2 = (*x2).max(x);
                *y2 = (*y2).max(y);
            }
        }

        bounds.map(|[x1, y1, x2, y2]| (x1, y1, x2 - x1 + 1, y2 - y1 + 1))
    }
}

fn merge_alpha<S>(pixel: LumaA<S>, max: f32) -> f32
where
    S: Primitive + Into<f32>,
{
    let LumaA([luminance, alpha]) = pixel;
    luminance.into() * (alpha.into() / max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    #[test]
    fn finds_box_around_subject() {
        let mut image: Image<Rgb<u8>> = ImageBuffer::from_pixel(10, 8, Rgb([255, 255, 255]));
        for (x, y) in [(3, 2), (6, 5), (4, 4)] {
            image.put_pixel(x, y, Rgb([0, 0, 0]));
        }
        assert_eq!(image.content_bounds(10), Some((3, 2, 4, 4)));
    }

    #[test]
    fn uniform_image_has_no_content() {
        let image: Image<Rgb<u8>> = ImageBuffer::from_pixel(5, 5, Rgb([40, 40, 40]));
        assert_eq!(image.content_bounds(0), None);
    }

    #[test]
    fn transparent_border_counts_as_background() {
        let mut image: Image<Rgba<u8>> = ImageBuffer::from_pixel(6, 6, Rgba([255, 0, 0, 0]));
        image.put_pixel(2, 3, Rgba([255, 255, 255, 255]));
        assert_eq!(image.content_bounds(5), Some((2, 3, 1, 1)));
    }

    #[test]
    fn small_differences_below_threshold_are_ignored() {
        let mut image: Image<Rgb<u8>> = ImageBuffer::from_pixel(4, 4, Rgb([100, 100, 100]));
        image.put_pixel(1, 1, Rgb([104, 104, 104]));
        assert_eq!(image.content_bounds(8), None);
        assert_eq!(image.content_bounds(2), Some((1, 1, 1, 1)));
    }
}
