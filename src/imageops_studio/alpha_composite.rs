use crate::error::CompositeError;
use crate::utils::{normalize_alpha_with_max, round_to_u8};
use crate::Image;
use image::{ImageBuffer, Rgb, Rgba};

/// Result type for alpha compositing
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Porter-Duff "source over" compositing with straight (non-premultiplied) alpha
///
/// For foreground `f` and background `b`:
/// - `αo = αf + αb (1 - αf)`
/// - `Co = (Cf αf + Cb αb (1 - αf)) / αo`
///
/// A fully opaque foreground pixel therefore replaces the background
/// exactly, and a fully transparent one leaves it untouched.
pub trait AlphaCompositeExt {
    /// Composites `self` over `background`.
    ///
    /// # Errors
    ///
    /// * `CompositeError::DimensionMismatch` - if the layers differ in size
    ///
    /// # Examples
    ///
    /// ```rust
    /// use imageops_studio::{AlphaCompositeExt, Image};
    /// use image::{ImageBuffer, Rgba};
    ///
    /// let subject: Image<Rgba<u8>> = ImageBuffer::from_pixel(4, 4, Rgba([255, 0, 0, 0]));
    /// let backdrop: Image<Rgba<u8>> = ImageBuffer::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
    /// let out = subject.composite_over(&backdrop).unwrap();
    /// assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    /// ```
    fn composite_over(&self, background: &Image<Rgba<u8>>) -> CompositeResult<Image<Rgba<u8>>>;

    /// Composites `self` over a solid opaque color.
    fn composite_over_color(&self, color: Rgb<u8>) -> Image<Rgba<u8>>;
}

impl AlphaCompositeExt for Image<Rgba<u8>> {
    fn composite_over(&self, background: &Image<Rgba<u8>>) -> CompositeResult<Image<Rgba<u8>>> {
        if self.dimensions() != background.dimensions() {
            return Err(CompositeError::DimensionMismatch {
                expected: self.dimensions(),
                actual: background.dimensions(),
            });
        }

        Ok(ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            over(*self.get_pixel(x, y), *background.get_pixel(x, y))
        }))
    }

    fn composite_over_color(&self, color: Rgb<u8>) -> Image<Rgba<u8>> {
        let Rgb([red, green, blue]) = color;
        let backdrop = Rgba([red, green, blue, u8::MAX]);
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            over(*self.get_pixel(x, y), backdrop)
        })
    }
}

#[inline]
fn over(foreground: Rgba<u8>, background: Rgba<u8>) -> Rgba<u8> {
    let max_value = f32::from(u8::MAX);
    let Rgba([fr, fg, fb, fa]) = foreground;
    let Rgba([br, bg, bb, ba]) = background;

    match fa {
        u8::MAX => return foreground,
        0 => return background,
        _ => {}
    }

    let alpha_f = normalize_alpha_with_max(fa, max_value);
    let alpha_b = normalize_alpha_with_max(ba, max_value) * (1.0 - alpha_f);
    let alpha_out = alpha_f + alpha_b;

    let blend = |f: u8, b: u8| (f32::from(f) * alpha_f + f32::from(b) * alpha_b) / alpha_out;
    Rgba([
        round_to_u8(blend(fr, br)),
        round_to_u8(blend(fg, bg)),
        round_to_u8(blend(fb, bb)),
        round_to_u8(alpha_out * max_value),
    ])
}
