use crate::error::ClaheError;
use crate::utils::{reflect_101, round_to_u8};
use crate::Image;
use image::{ImageBuffer, Luma};
use itertools::iproduct;

const BINS: usize = 256;

/// Contrast Limited Adaptive Histogram Equalization
///
/// The image is split into a grid of tiles; each tile gets its own
/// equalization lookup table built from a clipped histogram, and every
/// output pixel is a bilinear blend of the four nearest tile tables.
///
/// # Examples
///
/// ```rust
/// use imageops_studio::Clahe;
/// use image::{ImageBuffer, Luma};
///
/// let image = ImageBuffer::from_fn(32, 32, |x, _| Luma([(x * 4) as u8]));
/// let equalized = Clahe::new(2.0, (8, 8)).unwrap().apply(&image).unwrap();
/// assert_eq!(equalized.dimensions(), (32, 32));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clahe {
    clip_limit: f32,
    tiles_x: u32,
    tiles_y: u32,
}

impl Clahe {
    /// Create a new equalizer.
    ///
    /// `clip_limit` is relative to a uniform histogram: each bin may hold at
    /// most `clip_limit * tile_area / 256` samples before the excess is
    /// redistributed. A limit of `0` disables clipping.
    pub fn new(clip_limit: f32, (tiles_x, tiles_y): (u32, u32)) -> Result<Self, ClaheError> {
        if !clip_limit.is_finite() || clip_limit < 0.0 {
            return Err(ClaheError::InvalidClipLimit(clip_limit));
        }
        if tiles_x == 0 || tiles_y == 0 {
            return Err(ClaheError::InvalidTileGrid {
                columns: tiles_x,
                rows: tiles_y,
            });
        }
        Ok(Self {
            clip_limit,
            tiles_x,
            tiles_y,
        })
    }

    pub fn apply(&self, image: &Image<Luma<u8>>) -> Result<Image<Luma<u8>>, ClaheError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ClaheError::EmptyImage);
        }

        // Histograms are gathered over a grid that divides evenly; samples past
        // the image edge are mirrored.
        let tile_width = width.div_ceil(self.tiles_x);
        let tile_height = height.div_ceil(self.tiles_y);
        let tile_area = tile_width * tile_height;

        let luts = self.tile_luts(image, tile_width, tile_height, tile_area);

        let inv_tile_width = 1.0 / tile_width as f32;
        let inv_tile_height = 1.0 / tile_height as f32;
        let last_x = self.tiles_x as i64 - 1;
        let last_y = self.tiles_y as i64 - 1;

        Ok(ImageBuffer::from_fn(width, height, |x, y| {
            let value = image.get_pixel(x, y)[0] as usize;

            let tx = x as f32 * inv_tile_width - 0.5;
            let ty = y as f32 * inv_tile_height - 0.5;
            let tx1 = tx.floor() as i64;
            let ty1 = ty.floor() as i64;
            let xa = tx - tx1 as f32;
            let ya = ty - ty1 as f32;

            let left = tx1.max(0) as usize;
            let right = (tx1 + 1).min(last_x) as usize;
            let top = ty1.max(0) as usize;
            let bottom = (ty1 + 1).min(last_y) as usize;

            let lut = |row: usize, column: usize| {
                f32::from(luts[row * self.tiles_x as usize + column][value])
            };
            let upper = lut(top, left) * (1.0 - xa) + lut(top, right) * xa;
            let lower = lut(bottom, left) * (1.0 - xa) + lut(bottom, right) * xa;
            Luma([round_to_u8(upper * (1.0 - ya) + lower * ya)])
        }))
    }

    fn tile_luts(
        &self,
        image: &Image<Luma<u8>>,
        tile_width: u32,
        tile_height: u32,
        tile_area: u32,
    ) -> Vec<[u8; BINS]> {
        let (width, height) = image.dimensions();
        let clip = if self.clip_limit > 0.0 {
            Some(((self.clip_limit * tile_area as f32 / BINS as f32) as u32).max(1))
        } else {
            None
        };
        let scale = (BINS - 1) as f32 / tile_area as f32;

        iproduct!(0..self.tiles_y, 0..self.tiles_x)
            .map(|(row, column)| {
                let mut histogram = [0u32; BINS];
                for (dy, dx) in iproduct!(0..tile_height, 0..tile_width) {
                    let x = reflect_101(i64::from(column * tile_width + dx), width);
                    let y = reflect_101(i64::from(row * tile_height + dy), height);
                    histogram[image.get_pixel(x, y)[0] as usize] += 1;
                }

                if let Some(limit) = clip {
                    clip_histogram(&mut histogram, limit);
                }

                let mut lut = [0u8; BINS];
                let mut cumulative = 0u32;
                for (entry, count) in lut.iter_mut().zip(histogram.iter()) {
                    cumulative += count;
                    *entry = round_to_u8(cumulative as f32 * scale);
                }
                lut
            })
            .collect()
    }
}

/// Caps every bin at `limit` and spreads the excess evenly, handing any
/// remainder out one sample at a time across the range.
fn clip_histogram(histogram: &mut [u32; BINS], limit: u32) {
    let mut clipped = 0u32;
    for count in histogram.iter_mut() {
        if *count > limit {
            clipped += *count - limit;
            *count = limit;
        }
    }

    let batch = clipped / BINS as u32;
    let mut residual = clipped - batch * BINS as u32;
    for count in histogram.iter_mut() {
        *count += batch;
    }

    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        for count in histogram.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *count += 1;
            residual -= 1;
        }
    }
}
