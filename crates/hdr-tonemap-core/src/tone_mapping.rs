//! Tone mapping parameters and the reference operator.
//!
//! The GPU fragment shader and the functions in this module implement the
//! same curve: exposure scaling, extended Reinhard compression keyed on the
//! white point, then gamma encoding. The CPU path exists so results can be
//! checked without a GPU and so callers have a fallback.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToneMapError};
use crate::image::{output_len, HdrImage};

/// Display gamma applied after compression. Not caller-configurable.
pub const GAMMA: f32 = 2.2;

/// Per-call tone mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneMapParams {
    /// Multiplier applied to linear input before compression (default 1.0).
    pub exposure: f32,
    /// Scaled input value that maps to full display brightness (default 1.0).
    pub white_point: f32,
}

impl Default for ToneMapParams {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            white_point: 1.0,
        }
    }
}

impl ToneMapParams {
    /// Creates parameters from an exposure and a white point.
    pub fn new(exposure: f32, white_point: f32) -> Self {
        Self {
            exposure,
            white_point,
        }
    }

    /// Sets the exposure value.
    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }

    /// Sets the white point.
    pub fn with_white_point(mut self, white_point: f32) -> Self {
        self.white_point = white_point;
        self
    }

    /// The fixed gamma used for encoding.
    pub fn gamma(&self) -> f32 {
        GAMMA
    }

    /// Checks that both values are finite, exposure is non-negative and the
    /// white point is strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !self.exposure.is_finite() || self.exposure < 0.0 {
            return Err(ToneMapError::InvalidParams(format!(
                "exposure must be finite and >= 0, got {}",
                self.exposure
            )));
        }
        if !self.white_point.is_finite() || self.white_point <= 0.0 {
            return Err(ToneMapError::InvalidParams(format!(
                "white point must be finite and > 0, got {}",
                self.white_point
            )));
        }
        Ok(())
    }
}

/// Largest linear value the GPU input texture holds (`f16::MAX`).
pub const MAX_LINEAR: f32 = 65504.0;

/// Maps a raw linear value into `[0, MAX_LINEAR]`. NaN and negatives become 0.
pub fn saturate_linear(value: f32) -> f32 {
    value.max(0.0).min(MAX_LINEAR)
}

/// Extended Reinhard: `x * (1 + x / L^2) / (1 + x)`.
///
/// Maps 0 to 0 and `white_point` to exactly 1, strictly increasing on
/// `[0, white_point]` and 1 from there on, infinity included.
pub fn extended_reinhard(x: f32, white_point: f32) -> f32 {
    if x >= white_point {
        return 1.0;
    }
    x * (1.0 + x / (white_point * white_point)) / (1.0 + x)
}

/// Tone maps one linear channel value to a gamma-encoded value in `[0, 1]`.
pub fn tone_map_channel(value: f32, params: &ToneMapParams) -> f32 {
    let scaled = saturate_linear(value) * params.exposure;
    let mapped = extended_reinhard(scaled, params.white_point);
    mapped.clamp(0.0, 1.0).powf(1.0 / GAMMA)
}

/// Tone maps a linear RGB pixel, channel by channel.
pub fn tone_map_pixel(rgb: Vec3, params: &ToneMapParams) -> Vec3 {
    Vec3::new(
        tone_map_channel(rgb.x, params),
        tone_map_channel(rgb.y, params),
        tone_map_channel(rgb.z, params),
    )
}

/// Converts a value in `[0, 1]` to an 8-bit unorm, as a render target does.
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Tone maps a whole image on the CPU into a BGRA8 buffer.
///
/// `out` must hold exactly `width * height * 4` bytes. Rows are written top
/// to bottom, alpha is always 255.
pub fn tone_map_cpu(image: &HdrImage<'_>, params: &ToneMapParams, out: &mut [u8]) -> Result<()> {
    params.validate()?;
    let expected = output_len(image.width(), image.height())?;
    if out.len() != expected {
        return Err(ToneMapError::SizeMismatch {
            buffer: "output",
            expected,
            actual: out.len(),
        });
    }

    for (rgb, bgra) in image.data().chunks_exact(3).zip(out.chunks_exact_mut(4)) {
        let encoded = tone_map_pixel(Vec3::new(rgb[0], rgb[1], rgb[2]), params);
        bgra[0] = quantize(encoded.z);
        bgra[1] = quantize(encoded.y);
        bgra[2] = quantize(encoded.x);
        bgra[3] = u8::MAX;
    }
    Ok(())
}
