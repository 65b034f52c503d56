use crate::error::NLMeansError;
use crate::imageops_studio::convert_color::LabConvertExt;
use crate::imageops_studio::summed_area_table::SummedAreaTable;
use crate::utils::{reflect_101, round_to_u8, validate_non_empty_image};
use crate::Image;
use image::{ImageBuffer, Luma, Rgb};
use itertools::iproduct;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Template (patch) window used by the colored denoiser, in pixels
pub const DEFAULT_TEMPLATE_WINDOW: u32 = 7;
/// Search window used by the colored denoiser, in pixels
pub const DEFAULT_SEARCH_WINDOW: u32 = 21;

/// Non-Local Means denoising trait
///
/// Non-Local Means replaces each pixel with a weighted average of the pixels
/// in a search window around it. The weight of a candidate is determined by
/// how similar its surrounding patch (template window) is to the patch
/// around the pixel being denoised.
///
/// # Algorithm
///
/// For each pixel p and each candidate q inside the `big_window` search area:
/// 1. `d = mean over patch pixels and channels of (patch_p - patch_q)²`
/// 2. `w = exp(-d / h²)`
/// 3. `p' = Σ(w × q) / Σw`
///
/// Patch distances are evaluated once per search offset over the whole image
/// with a summed-area table, so the cost is independent of `small_window`.
/// Samples outside the image are mirrored (reflect-101).
///
/// # Examples
///
/// ```rust
/// use imageops_studio::NLMeans;
/// use image::{GrayImage, Luma};
///
/// let gray = GrayImage::from_pixel(10, 10, Luma([100u8]));
/// let denoised = gray.nl_means(10.0, 3, 7).unwrap();
/// assert_eq!(denoised, gray);
/// ```
pub trait NLMeans {
    /// Apply Non-Local Means denoising to the image
    ///
    /// # Arguments
    ///
    /// * `h` - Filtering parameter (must be positive)
    /// * `small_window` - Patch size for similarity comparison (odd)
    /// * `big_window` - Search window size (odd, larger than `small_window`)
    ///
    /// # Errors
    ///
    /// * `NLMeansError::InvalidWindowSize` - If window sizes are not odd positive integers
    /// * `NLMeansError::InvalidFilteringParameter` - If h is not positive
    /// * `NLMeansError::InvalidWindowSizes` - If big_window <= small_window
    /// * `NLMeansError::EmptyImage` - If the image has no pixels
    fn nl_means(&self, h: f32, small_window: u32, big_window: u32) -> Result<Self, NLMeansError>
    where
        Self: Sized;
}

/// Colored Non-Local Means denoising
///
/// The image is converted to 8-bit Lab; lightness is denoised with `h` and
/// the chroma pair jointly with `h_color`, so color noise can be suppressed
/// harder than luminance detail.
pub trait DenoiseColored {
    fn denoise_colored(
        &self,
        h: f32,
        h_color: f32,
        small_window: u32,
        big_window: u32,
    ) -> Result<Self, NLMeansError>
    where
        Self: Sized;
}

/// Validation function for Non-Local Means parameters
fn validate_parameters(
    h: f32,
    small_window: u32,
    big_window: u32,
    width: u32,
    height: u32,
) -> Result<(), NLMeansError> {
    if !(h > 0.0) {
        return Err(NLMeansError::InvalidFilteringParameter { h });
    }

    if small_window == 0 || small_window % 2 == 0 {
        return Err(NLMeansError::InvalidWindowSize { size: small_window });
    }

    if big_window == 0 || big_window % 2 == 0 {
        return Err(NLMeansError::InvalidWindowSize { size: big_window });
    }

    if big_window <= small_window {
        return Err(NLMeansError::InvalidWindowSizes {
            small_window,
            big_window,
        });
    }

    validate_non_empty_image(width, height, "NL-Means").map_err(|_| NLMeansError::EmptyImage)
}

/// Planar view of the channels being denoised together
struct Planes<'a> {
    channels: Vec<&'a [u8]>,
    width: u32,
    height: u32,
}

impl Planes<'_> {
    #[inline]
    fn sample(&self, channel: usize, x: i64, y: i64) -> f32 {
        let x = reflect_101(x, self.width) as usize;
        let y = reflect_101(y, self.height) as usize;
        f32::from(self.channels[channel][y * self.width as usize + x])
    }
}

/// Running weighted sums for one set of search offsets
struct Accumulator {
    weights: Vec<f64>,
    sums: Vec<Vec<f64>>,
    distances: SummedAreaTable,
}

impl Accumulator {
    fn new(planes: &Planes<'_>, template_radius: u32) -> Self {
        let pixel_count = planes.width as usize * planes.height as usize;
        Self {
            weights: vec![0.0; pixel_count],
            sums: vec![vec![0.0; pixel_count]; planes.channels.len()],
            distances: SummedAreaTable::new(
                planes.width + 2 * template_radius,
                planes.height + 2 * template_radius,
            ),
        }
    }

    fn add_offset(
        &mut self,
        planes: &Planes<'_>,
        (dx, dy): (i64, i64),
        template_radius: u32,
        normalization: f64,
    ) {
        let radius = i64::from(template_radius);
        let channel_count = planes.channels.len();

        // Squared difference between every pixel and its shifted partner,
        // over an area extended by the template radius.
        self.distances.refill(|ex, ey| {
            let x = i64::from(ex) - radius;
            let y = i64::from(ey) - radius;
            (0..channel_count)
                .map(|c| {
                    let diff = planes.sample(c, x, y) - planes.sample(c, x + dx, y + dy);
                    f64::from(diff * diff)
                })
                .sum()
        });

        let template = 2 * template_radius + 1;
        for (y, x) in iproduct!(0..planes.height, 0..planes.width) {
            let distance = self.distances.region_sum(x, y, template, template) / normalization;
            let weight = (-distance).exp();
            let index = y as usize * planes.width as usize + x as usize;
            self.weights[index] += weight;
            for (c, sums) in self.sums.iter_mut().enumerate() {
                let neighbor = planes.sample(c, i64::from(x) + dx, i64::from(y) + dy);
                sums[index] += weight * f64::from(neighbor);
            }
        }
    }

    #[cfg(feature = "rayon")]
    fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.weights.iter_mut().zip(&other.weights) {
            *mine += theirs;
        }
        for (mine, theirs) in self.sums.iter_mut().zip(&other.sums) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self
    }
}

/// Jointly denoise the given single-channel planes
///
/// All planes must share the same dimensions; patch distances sum over every
/// plane, and each plane is averaged with the shared weights.
pub(crate) fn nl_means_planes(
    planes: &[&Image<Luma<u8>>],
    h: f32,
    small_window: u32,
    big_window: u32,
) -> Result<Vec<Image<Luma<u8>>>, NLMeansError> {
    let Some(first) = planes.first() else {
        return Ok(Vec::new());
    };
    let (width, height) = first.dimensions();
    validate_parameters(h, small_window, big_window, width, height)?;
    debug_assert!(planes.iter().all(|p| p.dimensions() == (width, height)));

    let planes = Planes {
        channels: planes.iter().map(|p| p.as_raw().as_slice()).collect(),
        width,
        height,
    };

    let template_radius = small_window / 2;
    let search_radius = i64::from(big_window / 2);
    // mean over template pixels and channels, scaled by h²
    let normalization = f64::from(h) * f64::from(h)
        * f64::from(small_window * small_window)
        * planes.channels.len() as f64;

    let offsets: Vec<(i64, i64)> =
        iproduct!(-search_radius..=search_radius, -search_radius..=search_radius)
            .map(|(dy, dx)| (dx, dy))
            .collect();

    #[cfg(feature = "rayon")]
    let accumulator = offsets
        .par_iter()
        .fold(
            || Accumulator::new(&planes, template_radius),
            |mut acc, &offset| {
                acc.add_offset(&planes, offset, template_radius, normalization);
                acc
            },
        )
        .reduce(
            || Accumulator::new(&planes, template_radius),
            Accumulator::merge,
        );

    #[cfg(not(feature = "rayon"))]
    let accumulator = offsets.iter().fold(
        Accumulator::new(&planes, template_radius),
        |mut acc, &offset| {
            acc.add_offset(&planes, offset, template_radius, normalization);
            acc
        },
    );

    // The zero offset always contributes weight 1, so every weight sum is >= 1.
    Ok(accumulator
        .sums
        .iter()
        .map(|sums| {
            ImageBuffer::from_fn(width, height, |x, y| {
                let index = (y * width + x) as usize;
                Luma([round_to_u8((sums[index] / accumulator.weights[index]) as f32)])
            })
        })
        .collect())
}

impl NLMeans for Image<Luma<u8>> {
    fn nl_means(&self, h: f32, small_window: u32, big_window: u32) -> Result<Self, NLMeansError> {
        let mut denoised = nl_means_planes(&[self], h, small_window, big_window)?;
        Ok(denoised.remove(0))
    }
}

impl DenoiseColored for Image<Rgb<u8>> {
    fn denoise_colored(
        &self,
        h: f32,
        h_color: f32,
        small_window: u32,
        big_window: u32,
    ) -> Result<Self, NLMeansError> {
        let mut lab = self.to_lab8();
        lab.l = lab.l.nl_means(h, small_window, big_window)?;

        let mut chroma = nl_means_planes(&[&lab.a, &lab.b], h_color, small_window, big_window)?;
        lab.b = chroma.pop().ok_or(NLMeansError::EmptyImage)?;
        lab.a = chroma.pop().ok_or(NLMeansError::EmptyImage)?;

        Ok(lab.to_rgb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parameters() {
        assert!(validate_parameters(10.0, 3, 7, 50, 50).is_ok());

        assert!(matches!(
            validate_parameters(0.0, 3, 7, 50, 50),
            Err(NLMeansError::InvalidFilteringParameter { .. })
        ));
        assert!(matches!(
            validate_parameters(f32::NAN, 3, 7, 50, 50),
            Err(NLMeansError::InvalidFilteringParameter { .. })
        ));

        assert!(matches!(
            validate_parameters(10.0, 4, 7, 50, 50),
            Err(NLMeansError::InvalidWindowSize { size: 4 })
        ));

        assert!(matches!(
            validate_parameters(10.0, 3, 8, 50, 50),
            Err(NLMeansError::InvalidWindowSize { size: 8 })
        ));

        assert!(matches!(
            validate_parameters(10.0, 7, 7, 50, 50),
            Err(NLMeansError::InvalidWindowSizes {
                small_window: 7,
                big_window: 7
            })
        ));

        assert!(matches!(
            validate_parameters(10.0, 3, 7, 0, 5),
            Err(NLMeansError::EmptyImage)
        ));
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let image: Image<Luma<u8>> = ImageBuffer::from_pixel(12, 9, Luma([87]));
        let denoised = image.nl_means(6.0, 3, 7).unwrap();
        assert_eq!(denoised, image);
    }

    #[test]
    fn images_smaller_than_search_window_are_supported() {
        let image: Image<Luma<u8>> = ImageBuffer::from_fn(4, 3, |x, y| Luma([(x * 40 + y) as u8]));
        let denoised = image.nl_means(6.0, 7, 21).unwrap();
        assert_eq!(denoised.dimensions(), (4, 3));
    }

    #[test]
    fn isolated_noise_is_smoothed() {
        let mut image: Image<Luma<u8>> = ImageBuffer::from_pixel(15, 15, Luma([100]));
        image.put_pixel(7, 7, Luma([140]));

        let denoised = image.nl_means(30.0, 3, 7).unwrap();
        let center = denoised.get_pixel(7, 7)[0];
        assert!(center < 140, "spike should be attenuated, got {}", center);
        assert!(center >= 100);
    }

    #[test]
    fn strong_edges_survive_mild_filtering() {
        let image: Image<Luma<u8>> =
            ImageBuffer::from_fn(16, 16, |x, _| Luma([if x < 8 { 20 } else { 230 }]));

        let denoised = image.nl_means(6.0, 7, 21).unwrap();
        assert!(denoised.get_pixel(2, 8)[0] < 40);
        assert!(denoised.get_pixel(13, 8)[0] > 210);
    }

    #[test]
    fn colored_denoise_keeps_flat_color() {
        let image: Image<Rgb<u8>> = ImageBuffer::from_pixel(10, 8, Rgb([180, 60, 40]));
        let denoised = image
            .denoise_colored(6.0, 6.0, DEFAULT_TEMPLATE_WINDOW, DEFAULT_SEARCH_WINDOW)
            .unwrap();
        assert_eq!(denoised.dimensions(), (10, 8));
        let expected = image.to_lab8().to_rgb();
        assert_eq!(denoised, expected);
    }

    #[test]
    fn empty_plane_list_yields_nothing() {
        let result = nl_means_planes(&[], 6.0, 3, 7).unwrap();
        assert!(result.is_empty());
    }
}
