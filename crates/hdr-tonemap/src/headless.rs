//! One-shot tone mapping helpers.
//!
//! Each call creates a temporary [`RenderContext`], renders once, and tears
//! it down. Handy for scripts and tests; keep a context around when
//! converting many images.

use std::path::Path;

use hdr_tonemap_core::{HdrImage, RenderConfig, ToneMapParams};
use hdr_tonemap_render::{RenderContext, RenderResult};

/// Tone maps `image` into a caller-provided BGRA8 buffer.
pub fn tone_map(image: &HdrImage<'_>, params: &ToneMapParams, out: &mut [u8]) -> RenderResult<()> {
    RenderContext::new(RenderConfig::default()).render_tone_map(image, params, out)
}

/// Tone maps `image` and returns the BGRA8 pixels, row 0 at the top.
///
/// # Example
/// ```no_run
/// use hdr_tonemap::*;
///
/// let data = vec![0.5_f32; 4 * 4 * 3];
/// let image = HdrImage::new(&data, 4, 4).unwrap();
/// let pixels = tone_map_to_vec(&image, &ToneMapParams::new(1.0, 4.0)).unwrap();
/// assert_eq!(pixels.len(), 4 * 4 * 4);
/// ```
pub fn tone_map_to_vec(image: &HdrImage<'_>, params: &ToneMapParams) -> RenderResult<Vec<u8>> {
    RenderContext::new(RenderConfig::default()).render_tone_map_to_vec(image, params)
}

/// Tone maps `image` and saves it as a PNG file.
pub fn tone_map_to_file(
    path: impl AsRef<Path>,
    image: &HdrImage<'_>,
    params: &ToneMapParams,
) -> RenderResult<()> {
    let pixels = tone_map_to_vec(image, params)?;
    hdr_tonemap_render::save_bgra_png(path, &pixels, image.width(), image.height())?;
    Ok(())
}
