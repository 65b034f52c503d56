//! Fixtures shared by the unit tests.

use crate::Image;
use image::{Pixel, Primitive, Rgb, Rgba};

/// 2x2 RGB image:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// 2x2 RGBA image covering every kind of alpha:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Checkerboard of two warm/cool colors, for size-dependent tests
pub fn create_large_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([200, 150, 100])
        } else {
            Rgb([100, 150, 200])
        }
    })
}

/// Whether every channel of `actual` is within `tolerance` of `expected`
pub fn pixels_approx_equal<P>(expected: P, actual: P, tolerance: f32) -> bool
where
    P: Pixel,
    P::Subpixel: Primitive,
    f32: From<P::Subpixel>,
{
    expected
        .channels()
        .iter()
        .zip(actual.channels())
        .all(|(e, a)| (f32::from(*e) - f32::from(*a)).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_have_expected_corners() {
        let rgb = create_test_rgb_image();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([50, 75, 25]));

        let rgba = create_test_rgba_image();
        assert_eq!(rgba.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn checkerboard_alternates() {
        let image = create_large_test_image(10, 10);
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([100, 150, 200]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([200, 150, 100]));
    }

    #[test]
    fn approx_equal_respects_tolerance() {
        let pixel = Rgb([100u8, 150, 200]);
        assert!(pixels_approx_equal(pixel, Rgb([101, 149, 201]), 1.5));
        assert!(!pixels_approx_equal(pixel, Rgb([105, 145, 205]), 1.5));
    }
}
