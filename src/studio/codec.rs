//! Byte-stream boundary: JPEG or PNG in, PNG out.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, ImageResult};
use std::io::Cursor;

/// Decodes a JPEG or PNG byte stream, sniffing the format from its header.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(Error::Decode)
}

/// Encodes `image` as PNG, keeping its color model.
pub fn encode_png(image: &DynamicImage) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
