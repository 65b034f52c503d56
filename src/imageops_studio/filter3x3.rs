use crate::utils::{reflect_101, round_to_u8};
use crate::Image;
use image::Pixel;
use itertools::iproduct;

/// Identity plus four-neighbour edge emphasis
pub const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// 3x3 correlation applied independently to every channel
pub trait Filter3x3Ext {
    /// Correlates the image with a row-major 3x3 `kernel`.
    ///
    /// Borders are reflect-101; results are rounded and clamped to
    /// `0..=255`, so strong kernels never wrap around.
    fn filter3x3_clamped(&self, kernel: &[f32; 9]) -> Self;
}

impl<P> Filter3x3Ext for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    fn filter3x3_clamped(&self, kernel: &[f32; 9]) -> Self {
        let (width, height) = self.dimensions();
        let mut output = Self::new(width, height);
        let channels = usize::from(P::CHANNEL_COUNT);

        for (y, x) in iproduct!(0..height, 0..width) {
            let mut sums = [0.0f32; 4];
            for (ky, kx) in iproduct!(0..3u32, 0..3u32) {
                let weight = kernel[(ky * 3 + kx) as usize];
                if weight == 0.0 {
                    continue;
                }
                let sx = reflect_101(i64::from(x) + i64::from(kx) - 1, width);
                let sy = reflect_101(i64::from(y) + i64::from(ky) - 1, height);
                for (sum, sample) in sums.iter_mut().zip(self.get_pixel(sx, sy).channels()) {
                    *sum += weight * f32::from(*sample);
                }
            }

            let target = output.get_pixel_mut(x, y).channels_mut();
            for (channel, sum) in target.iter_mut().zip(sums.iter()).take(channels) {
                *channel = round_to_u8(*sum);
            }
        }

        output
    }
}
