//! Shader management.
//!
//! A [`ShaderProgram`] is the wgpu counterpart of a linked vertex + fragment
//! program: two shader modules compiled separately and linked into a render
//! pipeline against the tone map bind group layout and the quad vertex
//! layout. Each step is checked; a failed build never yields a program.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use hdr_tonemap_core::ShaderSource;
use pollster::FutureExt;

use crate::context::Gpu;
use crate::error::{RenderError, RenderResult};
use crate::quad::QuadVertex;
use crate::resources::Tracked;
use crate::tone_mapping::TARGET_FORMAT;

/// Built-in vertex stage.
pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/default.vert.wgsl");

/// Built-in tone mapping fragment stage.
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/default.frag.wgsl");

/// Vertex shader entry point.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment shader entry point.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Diagnostics kept per failed stage, in bytes.
pub const MAX_LOG_LEN: usize = 1024;

/// The step of a program build that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// Linking the stages into a pipeline.
    Program,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
            Self::Program => "PROGRAM",
        })
    }
}

/// Reads a shader source file.
///
/// A missing or unreadable file is an error, and so is a file with no code
/// in it.
pub fn load_shader_source(path: &Path) -> RenderResult<String> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        log::error!("shader source not found: {}: {source}", path.display());
        RenderError::ShaderSourceMissing {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if text.trim().is_empty() {
        log::error!("shader source is empty: {}", path.display());
        return Err(RenderError::ShaderSourceEmpty(path.to_path_buf()));
    }
    Ok(text)
}

/// Resolves a configured source into `(vertex, fragment)` text.
pub fn resolve_sources(source: &ShaderSource) -> RenderResult<(Cow<'_, str>, Cow<'_, str>)> {
    match source {
        ShaderSource::Embedded => Ok((
            Cow::Borrowed(DEFAULT_VERTEX_SHADER),
            Cow::Borrowed(DEFAULT_FRAGMENT_SHADER),
        )),
        ShaderSource::Files { vertex, fragment } => Ok((
            Cow::Owned(load_shader_source(vertex)?),
            Cow::Owned(load_shader_source(fragment)?),
        )),
        ShaderSource::Inline { vertex, fragment } => {
            Ok((Cow::Borrowed(vertex.as_str()), Cow::Borrowed(fragment.as_str())))
        }
    }
}

/// Cuts a diagnostic down to [`MAX_LOG_LEN`] bytes on a char boundary.
fn truncate_log(mut log: String) -> String {
    if log.len() > MAX_LOG_LEN {
        let mut end = MAX_LOG_LEN;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

fn build_failure(stage: ShaderStage, log: String) -> RenderError {
    let log = truncate_log(log);
    log::error!("shader build failed for {stage}:\n{log}");
    RenderError::ShaderBuildFailed { stage, log }
}

fn format_message(message: &wgpu::CompilationMessage) -> String {
    match &message.location {
        Some(location) => format!(
            "{}:{}: {}",
            location.line_number, location.line_position, message.message
        ),
        None => message.message.clone(),
    }
}

/// A linked tone mapping program.
pub struct ShaderProgram {
    pipeline: Tracked<wgpu::RenderPipeline>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    pub fn build(gpu: &Gpu, vertex_source: &str, fragment_source: &str) -> RenderResult<Self> {
        let vertex = compile_stage(gpu, ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(gpu, ShaderStage::Fragment, fragment_source)?;

        let (pipeline, error) = gpu.scoped(|| {
            gpu.device()
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Tone Map Pipeline"),
                    layout: Some(gpu.pipeline_layout()),
                    vertex: wgpu::VertexState {
                        module: &vertex,
                        entry_point: Some(VERTEX_ENTRY),
                        buffers: &[QuadVertex::layout()],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &fragment,
                        entry_point: Some(FRAGMENT_ENTRY),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: TARGET_FORMAT,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
        });
        if let Some(error) = error {
            return Err(build_failure(ShaderStage::Program, error.to_string()));
        }

        // The modules are no longer needed once the pipeline exists.
        drop(vertex);
        drop(fragment);

        log::debug!("tone map program linked");
        Ok(Self {
            pipeline: gpu.tracker().track(pipeline),
        })
    }

    /// Reads both stages from disk and builds them.
    pub fn build_from_paths(
        gpu: &Gpu,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> RenderResult<Self> {
        let vertex = load_shader_source(vertex_path)?;
        let fragment = load_shader_source(fragment_path)?;
        Self::build(gpu, &vertex, &fragment)
    }

    /// Builds the program described by a configured source.
    pub fn from_source(gpu: &Gpu, source: &ShaderSource) -> RenderResult<Self> {
        let (vertex, fragment) = resolve_sources(source)?;
        Self::build(gpu, &vertex, &fragment)
    }

    /// Makes this program current for the pass.
    pub fn activate(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
    }

    /// Frees the GPU program.
    pub fn release(self) {
        drop(self);
    }
}

fn compile_stage(gpu: &Gpu, stage: ShaderStage, source: &str) -> RenderResult<wgpu::ShaderModule> {
    let label = format!("Tone Map {stage} Shader");
    let (module, error) = gpu.scoped(|| {
        gpu.device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
    });

    let info = module.get_compilation_info().block_on();
    let mut errors = Vec::new();
    for message in &info.messages {
        match message.message_type {
            wgpu::CompilationMessageType::Error => errors.push(format_message(message)),
            wgpu::CompilationMessageType::Warning => {
                log::warn!("{stage} shader: {}", format_message(message));
            }
            _ => {
                log::debug!("{stage} shader: {}", format_message(message));
            }
        }
    }

    // The scope error repeats the compilation messages when there are any.
    if let (true, Some(error)) = (errors.is_empty(), error) {
        errors.push(error.to_string());
    }
    if !errors.is_empty() {
        return Err(build_failure(stage, errors.join("\n")));
    }
    Ok(module)
}
