/// Summed-area table (integral image)
///
/// Stores, for every coordinate `(x, y)`, the sum of all values in the
/// rectangle spanning the origin to `(x - 1, y - 1)`. The table carries one
/// extra leading row and column of zeros, so any rectangular sum is four
/// lookups without edge branches.
#[derive(Debug, Clone)]
pub struct SummedAreaTable {
    data: Vec<f64>,
    width: u32,
    height: u32,
}

impl SummedAreaTable {
    /// Creates a zeroed table covering `width` x `height` source values.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width as usize + 1;
        Self {
            data: vec![0.0; stride * (height as usize + 1)],
            width,
            height,
        }
    }

    /// Creates a table whose source value at `(x, y)` is `f(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> f64,
    {
        let mut table = Self::new(width, height);
        table.refill(f);
        table
    }

    /// Recomputes the table in place from a new source function.
    ///
    /// The leading zero row and column are never written, so the buffer can
    /// be reused across many fills of the same size.
    pub fn refill<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32) -> f64,
    {
        let stride = self.width as usize + 1;
        for y in 0..self.height {
            let row = (y as usize + 1) * stride;
            let above = y as usize * stride;
            let mut row_sum = 0.0;
            for x in 0..self.width {
                // sat(x, y) = row prefix + sat(x, y - 1)
                row_sum += f(x, y);
                let column = x as usize + 1;
                self.data[row + column] = row_sum + self.data[above + column];
            }
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Sum of the source values in the `width` x `height` rectangle whose
    /// top-left corner is `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle extends beyond the table.
    #[inline]
    pub fn region_sum(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        let stride = self.width as usize + 1;
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + width as usize, y0 + height as usize);
        self.data[y1 * stride + x1] - self.data[y0 * stride + x1] - self.data[y1 * stride + x0]
            + self.data[y0 * stride + x0]
    }
}
