//! Configuration options for the offscreen renderer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Renderer configuration, fixed for the lifetime of a render context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RenderConfig {
    /// Which graphics APIs may back the context.
    pub backend: BackendPreference,

    /// Adapter selection hint.
    pub power_preference: PowerPreference,

    /// Whether to request a software (fallback) adapter.
    pub force_fallback_adapter: bool,

    /// Where the tone mapping shader pair comes from.
    pub shaders: ShaderSource,
}

impl RenderConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend preference.
    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the power preference.
    pub fn with_power_preference(mut self, power_preference: PowerPreference) -> Self {
        self.power_preference = power_preference;
        self
    }

    /// Sets whether a fallback adapter is forced.
    pub fn with_fallback_adapter(mut self, force: bool) -> Self {
        self.force_fallback_adapter = force;
        self
    }

    /// Sets the shader source.
    pub fn with_shaders(mut self, shaders: ShaderSource) -> Self {
        self.shaders = shaders;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded render config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Graphics API selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Any available backend.
    #[default]
    All,
    /// Vulkan, Metal, DX12 or WebGPU.
    Primary,
    Vulkan,
    Metal,
    Dx12,
    /// OpenGL / GLES.
    Gl,
}

/// Adapter power preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    None,
    LowPower,
    #[default]
    HighPerformance,
}

/// Origin of the vertex and fragment shader sources.
///
/// Shaders are WGSL. The vertex stage must expose `vs_main` and the fragment
/// stage `fs_main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ShaderSource {
    /// The shader pair compiled into the library.
    #[default]
    Embedded,
    /// Two files read at render time.
    Files { vertex: PathBuf, fragment: PathBuf },
    /// Source text supplied directly.
    Inline { vertex: String, fragment: String },
}

impl ShaderSource {
    /// Shorthand for [`ShaderSource::Files`].
    pub fn files(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self::Files {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Shorthand for [`ShaderSource::Inline`].
    pub fn inline(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::Inline {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}
