//! Rendering error types.

use std::path::PathBuf;

use hdr_tonemap_core::ToneMapError;
use thiserror::Error;

use crate::shader::ShaderStage;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter: {0}")]
    AdapterCreationFailed(#[from] wgpu::RequestAdapterError),

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// A GPU operation was attempted on a context that is not initialized.
    #[error("render context not initialized")]
    NotInitialized,

    /// A shader source file could not be read.
    #[error("shader source not found: {}", .path.display())]
    ShaderSourceMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A shader source file was read but contains no code.
    #[error("shader source is empty: {}", .0.display())]
    ShaderSourceEmpty(PathBuf),

    /// A shader stage failed to compile, or the program failed to link.
    #[error("shader build failed for {stage}:\n{log}")]
    ShaderBuildFailed { stage: ShaderStage, log: String },

    /// The input texture could not be created or filled.
    #[error("texture upload failed: {0}")]
    TextureUploadFailed(String),

    /// The render target cannot be drawn into.
    #[error("render target incomplete: {0}")]
    IncompleteRenderTarget(String),

    /// A GPU validation error outside of a more specific step.
    #[error("GPU validation error: {0}")]
    Validation(String),

    /// Copying the rendered image back to host memory failed.
    #[error("pixel readback failed: {0}")]
    ReadbackFailed(String),

    /// Writing output to an image file failed.
    #[error(transparent)]
    Export(#[from] crate::export::ExportError),

    /// Invalid input image, output buffer, or parameters.
    #[error(transparent)]
    Input(#[from] ToneMapError),
}

impl RenderError {
    /// Whether the error happened while bringing up the context.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            Self::AdapterCreationFailed(_) | Self::DeviceCreationFailed(_)
        )
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
