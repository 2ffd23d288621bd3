//! Writing tone mapped output to image files.

use std::path::Path;

use hdr_tonemap_core::output_len;
use image::{ImageBuffer, Rgba};

/// Error type for export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("invalid image data: {len} bytes for {width}x{height} BGRA")]
    InvalidImageData { len: usize, width: u32, height: u32 },
}

fn bgra_to_rgba_image(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, ExportError> {
    let invalid = || ExportError::InvalidImageData {
        len: data.len(),
        width,
        height,
    };
    if output_len(width, height).ok() != Some(data.len()) {
        return Err(invalid());
    }
    let mut rgba_data = data.to_vec();
    for chunk in rgba_data.chunks_exact_mut(4) {
        chunk.swap(0, 2); // Swap B and R
    }
    // Rows are already top to bottom, no flip needed
    ImageBuffer::from_raw(width, height, rgba_data).ok_or_else(invalid)
}

/// Saves a BGRA8 buffer as a PNG file.
pub fn save_bgra_png(
    path: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ExportError> {
    let img = bgra_to_rgba_image(data, width, height)?;
    img.save_with_format(path.as_ref(), image::ImageFormat::Png)?;
    log::debug!("wrote {}x{} PNG to {}", width, height, path.as_ref().display());
    Ok(())
}

/// Encodes a BGRA8 buffer as PNG in memory.
pub fn encode_bgra_png(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let img = bgra_to_rgba_image(data, width, height)?;
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
