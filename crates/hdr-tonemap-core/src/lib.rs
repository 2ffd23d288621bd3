//! Core types for hdr-tonemap.
//!
//! This crate has no GPU dependency. It provides:
//! - [`ToneMapParams`] and the reference tone mapping operator
//! - [`HdrImage`] and the buffer size rules shared by every backend
//! - [`RenderConfig`] for selecting the adapter and the shader source

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Quantization truncates on purpose after clamping
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod error;
pub mod image;
pub mod options;
pub mod tone_mapping;

pub use error::{Result, ToneMapError};
pub use image::{output_len, pixel_count, validate_output, HdrImage};
pub use options::{BackendPreference, PowerPreference, RenderConfig, ShaderSource};
pub use tone_mapping::{
    extended_reinhard, quantize, saturate_linear, tone_map_channel, tone_map_cpu, tone_map_pixel,
    ToneMapParams, GAMMA, MAX_LINEAR,
};

// Re-export glam types for convenience
pub use glam::Vec3;
