//! Tile image codec.
//!
//! Thin wrapper over the `image` crate: decode whatever the tile server sends
//! into RGBA, encode RGBA to PNG for disk, and build placeholder tiles.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Pixel used to fill placeholder tiles (fully transparent).
pub const PLACEHOLDER_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Errors from encoding or decoding tile images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Response body could not be decoded as an image
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Image could not be encoded as PNG
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Decodes an encoded image (PNG in practice) into RGBA pixels.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let img = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Encodes RGBA pixels as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Creates a square placeholder tile of the given edge length.
pub fn placeholder(tile_size: u32) -> RgbaImage {
    RgbaImage::from_pixel(tile_size, tile_size, PLACEHOLDER_PIXEL)
}
