//! Borrowed pixel buffers and their size rules.

use glam::Vec3;

use crate::error::{Result, ToneMapError};

/// Number of `f32` values per input pixel (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Number of bytes per output pixel (BGRA8).
pub const OUTPUT_CHANNELS: usize = 4;

/// A caller-owned linear RGB image, 32-bit float per channel.
///
/// Pixels are row-major with row 0 at the top of the image.
#[derive(Debug, Clone, Copy)]
pub struct HdrImage<'a> {
    data: &'a [f32],
    width: u32,
    height: u32,
}

impl<'a> HdrImage<'a> {
    /// Wraps `data` as a `width x height` RGB image.
    ///
    /// Fails if either dimension is zero or `data` does not hold exactly
    /// `width * height * 3` values.
    pub fn new(data: &'a [f32], width: u32, height: u32) -> Result<Self> {
        let expected = pixel_count(width, height)?
            .checked_mul(INPUT_CHANNELS)
            .ok_or(ToneMapError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(ToneMapError::SizeMismatch {
                buffer: "input",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw interleaved RGB values.
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the pixel at column `x`, row `y`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * INPUT_CHANNELS;
        let rgb = &self.data[index..index + INPUT_CHANNELS];
        Some(Vec3::new(rgb[0], rgb[1], rgb[2]))
    }

    /// Iterates pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Vec3> + 'a {
        self.data
            .chunks_exact(INPUT_CHANNELS)
            .map(|rgb| Vec3::new(rgb[0], rgb[1], rgb[2]))
    }
}

/// `width * height`, rejecting zero dimensions and overflow.
pub fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(ToneMapError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(ToneMapError::InvalidDimensions { width, height })
}

/// Required length in bytes of a BGRA8 output buffer.
pub fn output_len(width: u32, height: u32) -> Result<usize> {
    pixel_count(width, height)?
        .checked_mul(OUTPUT_CHANNELS)
        .ok_or(ToneMapError::InvalidDimensions { width, height })
}

/// Checks that `out` can receive a `width x height` BGRA8 image.
pub fn validate_output(out: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = output_len(width, height)?;
    if out.len() != expected {
        return Err(ToneMapError::SizeMismatch {
            buffer: "output",
            expected,
            actual: out.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_accepts_exact_len() {
        let data = vec![0.0; 2 * 3 * 3];
        let image = HdrImage::new(&data, 2, 3).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 3);
        assert_eq!(image.pixels().count(), 6);
    }

    #[test]
    fn test_image_rejects_zero_dimensions() {
        assert!(matches!(
            HdrImage::new(&[], 0, 4),
            Err(ToneMapError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(HdrImage::new(&[], 4, 0).is_err());
    }

    #[test]
    fn test_image_rejects_short_buffer() {
        let data = vec![0.0; 5];
        assert!(matches!(
            HdrImage::new(&data, 1, 2),
            Err(ToneMapError::SizeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_pixel_lookup_is_row_major() {
        let data = [
            0.0, 0.1, 0.2, 1.0, 1.1, 1.2, //
            2.0, 2.1, 2.2, 3.0, 3.1, 3.2,
        ];
        let image = HdrImage::new(&data, 2, 2).unwrap();
        assert_eq!(image.pixel(1, 0), Some(Vec3::new(1.0, 1.1, 1.2)));
        assert_eq!(image.pixel(0, 1), Some(Vec3::new(2.0, 2.1, 2.2)));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_output_validation() {
        assert_eq!(output_len(3, 2).unwrap(), 24);
        assert!(validate_output(&[0; 24], 3, 2).is_ok());
        assert!(validate_output(&[0; 23], 3, 2).is_err());
        assert!(validate_output(&[], 0, 2).is_err());
    }
}
