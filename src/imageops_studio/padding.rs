use crate::error::PaddingError;
use image::{imageops, ImageBuffer, Pixel};

/// Border padding on image buffers
///
/// The original pixels are copied verbatim into the canvas (no blending), so
/// transparent pixels stay transparent rather than showing the pad color.
pub trait Padding<P: Pixel>: Sized {
    /// Adds a uniform border of `border` pixels on all four sides.
    ///
    /// The original lands at `(border, border)`. A zero border returns the
    /// image unchanged.
    ///
    /// # Errors
    ///
    /// * `PaddingError::SizeOverflow` - if the padded size does not fit in `u32`
    fn add_border(
        self,
        border: u32,
        color: P,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, PaddingError>;
}

impl<P: Pixel> Padding<P> for ImageBuffer<P, Vec<P::Subpixel>> {
    fn add_border(self, border: u32, color: P) -> Result<Self, PaddingError> {
        if border == 0 {
            return Ok(self);
        }
        let (width, height) = self.dimensions();
        let overflow = PaddingError::SizeOverflow {
            width,
            height,
            border,
        };
        let grow = |side: u32| {
            border
                .checked_mul(2)
                .and_then(|total| side.checked_add(total))
        };
        let pad_width = grow(width).ok_or_else(|| overflow.clone())?;
        let pad_height = grow(height).ok_or(overflow)?;

        let mut canvas = Self::from_pixel(pad_width, pad_height, color);
        imageops::replace(&mut canvas, &self, i64::from(border), i64::from(border));
        Ok(canvas)
    }
}
