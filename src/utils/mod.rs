//! Internal utility functions for imageops-studio.
//!
//! This module contains common functionality used across different image operations.

use image::Primitive;
use imageproc::definitions::Clamp;

/// Clamps a floating-point value to the range of a primitive type.
///
/// # Arguments
///
/// * `value` - The floating-point value to clamp
///
/// # Returns
///
/// The clamped value as the target primitive type
#[inline]
pub fn clamp_f32_to_primitive<T: Primitive + Clamp<f32>>(value: f32) -> T {
    T::clamp(value)
}

/// Rounds half away from zero, then saturates to `u8`.
#[inline]
pub fn round_to_u8(value: f32) -> u8 {
    clamp_f32_to_primitive(value.round())
}

/// Normalizes an alpha value using a pre-computed max value.
///
/// # Arguments
///
/// * `alpha` - The alpha value to normalize
/// * `max_value` - The pre-computed maximum value for the type
///
/// # Returns
///
/// The normalized alpha value as a floating-point number between 0 and 1
#[inline]
pub fn normalize_alpha_with_max<S>(alpha: S, max_value: f32) -> f32
where
    S: Into<f32> + Primitive,
{
    alpha.into() / max_value
}

/// Maps a possibly out-of-range coordinate into `0..len` by mirroring
/// around the edge samples without repeating them (`gfedcb|abcdefgh|gfedcba`).
///
/// Offsets larger than the image are folded repeatedly, so any window size
/// works on any non-empty axis.
#[inline]
pub fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let folded = index.rem_euclid(period);
    let mirrored = if folded >= len { period - folded } else { folded };
    mirrored as u32
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise an error
pub fn validate_non_empty_image(width: u32, height: u32, context: &str) -> Result<(), String> {
    if width == 0 || height == 0 {
        Err(format!("{}: Image dimensions must be non-zero", context))
    } else {
        Ok(())
    }
}

/// ITU-R 601-2 luma transform with integer arithmetic.
///
/// `L = (299 R + 587 G + 114 B) / 1000`, truncating.
#[inline]
pub fn luma_601_truncated(red: u8, green: u8, blue: u8) -> u8 {
    ((u32::from(red) * 299 + u32::from(green) * 587 + u32::from(blue) * 114) / 1000) as u8
}

/// ITU-R 601-2 luma transform, rounded to nearest.
#[inline]
pub fn luma_601_rounded(red: u8, green: u8, blue: u8) -> u8 {
    round_to_u8(0.299 * f32::from(red) + 0.587 * f32::from(green) + 0.114 * f32::from(blue))
}
