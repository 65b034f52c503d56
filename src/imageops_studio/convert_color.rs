use crate::utils::round_to_u8;
use crate::Image;
use image::{ImageBuffer, Luma, Rgb};

// sRGB primaries, D65 white point
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412_453, 0.357_580, 0.180_423],
    [0.212_671, 0.715_160, 0.072_169],
    [0.019_334, 0.119_193, 0.950_227],
];
const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.240_479, -1.537_150, -0.498_535],
    [-0.969_256, 1.875_991, 0.041_556],
    [0.055_648, -0.204_043, 1.057_311],
];
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;

const EPSILON: f32 = 0.008_856;
const KAPPA: f32 = 903.3;

/// 8-bit Lab image stored as three planes
///
/// Uses the common 8-bit encoding: `L` is scaled from `0..=100` to
/// `0..=255`, `a` and `b` are offset by 128.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lab8Planes {
    pub l: Image<Luma<u8>>,
    pub a: Image<Luma<u8>>,
    pub b: Image<Luma<u8>>,
}

/// Conversion of sRGB images into 8-bit Lab
pub trait LabConvertExt {
    fn to_lab8(&self) -> Lab8Planes;
}

impl LabConvertExt for Image<Rgb<u8>> {
    fn to_lab8(&self) -> Lab8Planes {
        let (width, height) = self.dimensions();
        let mut l = ImageBuffer::new(width, height);
        let mut a = ImageBuffer::new(width, height);
        let mut b = ImageBuffer::new(width, height);

        for (x, y, pixel) in self.enumerate_pixels() {
            let [lightness, green_red, blue_yellow] = rgb_to_lab8(pixel.0);
            l.put_pixel(x, y, Luma([lightness]));
            a.put_pixel(x, y, Luma([green_red]));
            b.put_pixel(x, y, Luma([blue_yellow]));
        }

        Lab8Planes { l, a, b }
    }
}

impl Lab8Planes {
    pub fn dimensions(&self) -> (u32, u32) {
        self.l.dimensions()
    }

    /// Converts back to sRGB, clamping out-of-gamut colors.
    pub fn to_rgb(&self) -> Image<Rgb<u8>> {
        let (width, height) = self.dimensions();
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb(lab8_to_rgb([
                self.l.get_pixel(x, y)[0],
                self.a.get_pixel(x, y)[0],
                self.b.get_pixel(x, y)[0],
            ]))
        })
    }
}

#[inline]
fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.040_45 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inverse(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > EPSILON {
        cube
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

#[inline]
fn multiply(matrix: &[[f32; 3]; 3], vector: [f32; 3]) -> [f32; 3] {
    matrix.map(|row| row[0] * vector[0] + row[1] * vector[1] + row[2] * vector[2])
}

pub(crate) fn rgb_to_lab8([red, green, blue]: [u8; 3]) -> [u8; 3] {
    let linear = [red, green, blue].map(|c| srgb_to_linear(f32::from(c) / 255.0));
    let [x, y, z] = multiply(&RGB_TO_XYZ, linear);

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);

    let lightness = if y > EPSILON { 116.0 * fy - 16.0 } else { KAPPA * y };
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    [
        round_to_u8(lightness * 255.0 / 100.0),
        round_to_u8(a + 128.0),
        round_to_u8(b + 128.0),
    ]
}

pub(crate) fn lab8_to_rgb([lightness, a, b]: [u8; 3]) -> [u8; 3] {
    let lightness = f32::from(lightness) * 100.0 / 255.0;
    let a = f32::from(a) - 128.0;
    let b = f32::from(b) - 128.0;

    let (y, fy) = if lightness > KAPPA * EPSILON {
        let fy = (lightness + 16.0) / 116.0;
        (fy * fy * fy, fy)
    } else {
        let y = lightness / KAPPA;
        (y, lab_f(y))
    };
    let x = lab_f_inverse(fy + a / 500.0) * WHITE_X;
    let z = lab_f_inverse(fy - b / 200.0) * WHITE_Z;

    multiply(&XYZ_TO_RGB, [x, y, z])
        .map(|c| round_to_u8(linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0))
}
