use crate::error::BlurError;
use crate::Image;
use image::{ImageBuffer, Luma};
use libblur::{
    gaussian_blur, BlurImage, BlurImageMut, ConvolutionMode, EdgeMode, FastBlurChannels,
    GaussianBlurParams, ThreadingPolicy,
};

/// Gaussian blur with an explicit kernel size
pub trait GaussianBlurExt: Sized {
    /// Blurs with a `size` x `size` Gaussian kernel.
    ///
    /// `sigma` of `None` (or non-positive) derives the standard deviation
    /// from the kernel size as `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
    /// Borders are reflect-101. An empty image is returned as is.
    ///
    /// # Errors
    ///
    /// * `BlurError::InvalidKernelSize` - If `size` is not an odd positive integer
    /// * `BlurError::Backend` - If the convolution itself fails
    fn gaussian_blur_sized(&self, size: u32, sigma: Option<f32>) -> Result<Self, BlurError>;
}

impl GaussianBlurExt for Image<Luma<u8>> {
    fn gaussian_blur_sized(&self, size: u32, sigma: Option<f32>) -> Result<Self, BlurError> {
        if size == 0 || size % 2 == 0 {
            return Err(BlurError::InvalidKernelSize { size });
        }
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Ok(self.clone());
        }

        // zero sigma lets libblur derive it from the kernel size
        let sigma = sigma.filter(|s| *s > 0.0).map_or(0.0, f64::from);

        let source = BlurImage::borrow(self.as_raw(), width, height, FastBlurChannels::Plane);
        let mut buffer = vec![0u8; self.as_raw().len()];
        let mut blurred = BlurImageMut::borrow(&mut buffer, width, height, FastBlurChannels::Plane);

        gaussian_blur(
            &source,
            &mut blurred,
            GaussianBlurParams::new(size, sigma),
            EdgeMode::Reflect101,
            ThreadingPolicy::Single,
            ConvolutionMode::Exact,
        )
        .map_err(|e| BlurError::Backend(e.to_string()))?;

        ImageBuffer::from_raw(width, height, buffer)
            .ok_or_else(|| BlurError::Backend("blurred buffer does not fit the image".to_owned()))
    }
}
