//! hdr-tonemap: GPU tone mapping of linear HDR images.
//!
//! Converts a linear RGB `f32` image into an 8-bit BGRA image of the same
//! size by drawing a fullscreen quad with a tone mapping fragment shader
//! into an offscreen render target, then reading the pixels back.
//!
//! # Quick Start
//!
//! ```no_run
//! use hdr_tonemap::*;
//!
//! fn main() -> RenderResult<()> {
//!     let mut context = RenderContext::new(RenderConfig::default());
//!
//!     let linear = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
//!     let image = HdrImage::new(&linear, 2, 1)?;
//!     let mut bgra = vec![0u8; 2 * 4];
//!     context.render_tone_map(&image, &ToneMapParams::new(1.0, 1.0), &mut bgra)?;
//!
//!     assert_eq!(&bgra[..4], &[0, 0, 0, 255]);
//!     Ok(())
//! }
//! ```
//!
//! # Operator
//!
//! Per channel: `c' = max(c, 0) * exposure`, then extended Reinhard
//! `c'(1 + c'/L^2) / (1 + c')` with `L` the white point, then
//! `pow(clamp(x, 0, 1), 1 / 2.2)` and 8-bit quantization. Alpha is 255.
//!
//! # C ABI
//!
//! The [`ffi`] module exports `hdr_init`, `hdr_upload`, `hdr_cleanup` and
//! `hdr_last_error` over a process-wide context (see [`global`]).

pub mod ffi;
pub mod global;
mod headless;

pub use headless::{tone_map, tone_map_to_file, tone_map_to_vec};

// Re-export core types
pub use hdr_tonemap_core::{
    extended_reinhard, output_len, tone_map_channel, tone_map_cpu, tone_map_pixel,
    BackendPreference, HdrImage, PowerPreference, RenderConfig, ShaderSource, ToneMapError,
    ToneMapParams, Vec3, GAMMA,
};

// Re-export render types
pub use hdr_tonemap_render::{
    encode_bgra_png, save_bgra_png, ExportError, RenderContext, RenderError, RenderResult,
    ResourceCounts, ShaderStage,
};

/// Installs the `env_logger` backend for `log` if no logger is set yet.
///
/// Filtering follows `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
