//! Offscreen wgpu backend for hdr-tonemap.
//!
//! This crate provides:
//! - A headless [`RenderContext`] that owns the GPU device and queue
//! - The fullscreen quad and the tone mapping [`ShaderProgram`]
//! - The per-call [`ToneMapPass`]: upload, draw, and BGRA readback
//! - PNG export of tone mapped output

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel sizes are bounded by device texture limits
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod context;
pub mod error;
pub mod export;
pub mod quad;
pub mod readback;
mod resources;
pub mod shader;
pub mod tone_mapping;

pub use context::{Gpu, RenderContext};
pub use error::{RenderError, RenderResult};
pub use export::{encode_bgra_png, save_bgra_png, ExportError};
pub use quad::{QuadGeometry, QuadVertex, QUAD_VERTICES};
pub use readback::aligned_bytes_per_row;
pub use resources::ResourceCounts;
pub use shader::{
    load_shader_source, resolve_sources, ShaderProgram, ShaderStage, DEFAULT_FRAGMENT_SHADER,
    DEFAULT_VERTEX_SHADER, MAX_LOG_LEN,
};
pub use tone_mapping::{ToneMapPass, ToneMapUniforms, INPUT_FORMAT, TARGET_FORMAT};
