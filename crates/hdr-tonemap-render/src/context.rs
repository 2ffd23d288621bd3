//! Headless render context.
//!
//! [`RenderContext`] owns the GPU instance, adapter, device and queue used
//! for offscreen tone mapping. It is created cold and brought up on first
//! use. Every GPU-touching method takes `&mut self`, so a context is used by
//! one caller at a time; independent contexts can coexist in one process.

use hdr_tonemap_core::{validate_output, HdrImage, RenderConfig, ToneMapParams};
use hdr_tonemap_core::{BackendPreference, PowerPreference};
use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};
use crate::quad::QuadGeometry;
use crate::resources::{ResourceCounts, ResourceTracker};
use crate::shader::ShaderProgram;
use crate::tone_mapping::{create_bind_group_layout, create_sampler, ToneMapPass};

const ERROR_FILTERS: [wgpu::ErrorFilter; 3] = [
    wgpu::ErrorFilter::Validation,
    wgpu::ErrorFilter::OutOfMemory,
    wgpu::ErrorFilter::Internal,
];

fn backends(preference: BackendPreference) -> wgpu::Backends {
    match preference {
        BackendPreference::All => wgpu::Backends::all(),
        BackendPreference::Primary => wgpu::Backends::PRIMARY,
        BackendPreference::Vulkan => wgpu::Backends::VULKAN,
        BackendPreference::Metal => wgpu::Backends::METAL,
        BackendPreference::Dx12 => wgpu::Backends::DX12,
        BackendPreference::Gl => wgpu::Backends::GL,
    }
}

fn power_preference(preference: PowerPreference) -> wgpu::PowerPreference {
    match preference {
        PowerPreference::None => wgpu::PowerPreference::None,
        PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
    }
}

/// Live GPU state of an initialized context.
pub struct Gpu {
    /// Kept alive for the adapter and device.
    #[allow(dead_code)]
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    quad: Option<QuadGeometry>,
    tracker: ResourceTracker,
}

impl Gpu {
    async fn new(config: &RenderConfig, tracker: ResourceTracker) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: backends(config.backend),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: power_preference(config.power_preference),
                compatible_surface: None,
                force_fallback_adapter: config.force_fallback_adapter,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("hdr-tonemap device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let bind_group_layout = create_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Tone Map Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let sampler = create_sampler(&device);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            bind_group_layout,
            pipeline_layout,
            sampler,
            quad: None,
            tracker,
        })
    }

    #[must_use]
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[must_use]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    #[must_use]
    pub fn pipeline_layout(&self) -> &wgpu::PipelineLayout {
        &self.pipeline_layout
    }

    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub(crate) fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Creates the fullscreen quad if it does not exist yet.
    pub fn ensure_quad(&mut self) -> &QuadGeometry {
        self.quad
            .get_or_insert_with(|| QuadGeometry::new(&self.device))
    }

    /// The fullscreen quad, once [`Gpu::ensure_quad`] has run.
    #[must_use]
    pub fn quad(&self) -> Option<&QuadGeometry> {
        self.quad.as_ref()
    }

    /// Runs `f` with GPU error capture and returns its value together with
    /// the first error raised, if any.
    pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        for filter in ERROR_FILTERS {
            self.device.push_error_scope(filter);
        }
        let value = f();
        let mut first = None;
        for _ in ERROR_FILTERS {
            if let Some(error) = self.device.pop_error_scope().block_on() {
                first.get_or_insert(error);
            }
        }
        (value, first)
    }
}

/// An offscreen tone mapping context.
pub struct RenderContext {
    config: RenderConfig,
    gpu: Option<Gpu>,
    tracker: ResourceTracker,
}

impl RenderContext {
    /// Creates a context. No GPU work happens until [`RenderContext::ensure`].
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            gpu: None,
            tracker: ResourceTracker::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether the GPU state is up.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.gpu.is_some()
    }

    /// Brings up the GPU state if needed. Calling it again is a no-op.
    pub fn ensure(&mut self) -> RenderResult<()> {
        if self.gpu.is_some() {
            return Ok(());
        }
        let gpu = Gpu::new(&self.config, self.tracker.clone())
            .block_on()
            .inspect_err(|e| log::error!("render context initialization failed: {e}"))?;
        let info = gpu.adapter.get_info();
        log::info!(
            "render context ready on {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Brings up the context and the fullscreen quad.
    pub fn ensure_quad(&mut self) -> RenderResult<()> {
        self.ensure()?;
        let gpu = self.gpu.as_mut().ok_or(RenderError::NotInitialized)?;
        gpu.ensure_quad();
        Ok(())
    }

    /// The GPU state, if initialized.
    #[must_use]
    pub fn gpu(&self) -> Option<&Gpu> {
        self.gpu.as_ref()
    }

    /// Information about the adapter in use, if initialized.
    #[must_use]
    pub fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.gpu.as_ref().map(|gpu| gpu.adapter.get_info())
    }

    /// Live per-call GPU objects. Returns to zero after every render call.
    #[must_use]
    pub fn live_resources(&self) -> ResourceCounts {
        self.tracker.counts()
    }

    /// Tone maps `image` into `out` as BGRA8.
    ///
    /// `out` must hold exactly `width * height * 4` bytes. It is written only
    /// when the whole pipeline succeeds; on error its contents are unchanged.
    pub fn render_tone_map(
        &mut self,
        image: &HdrImage<'_>,
        params: &ToneMapParams,
        out: &mut [u8],
    ) -> RenderResult<()> {
        params.validate()?;
        validate_output(out, image.width(), image.height())?;

        self.ensure_quad()?;
        let gpu = self.gpu.as_ref().ok_or(RenderError::NotInitialized)?;
        let quad = gpu.quad().ok_or(RenderError::NotInitialized)?;
        log::debug!(
            "tone mapping {}x{} (exposure {}, white point {})",
            image.width(),
            image.height(),
            params.exposure,
            params.white_point
        );

        let pass = ToneMapPass::prepare(gpu, image, params)?;
        let program = ShaderProgram::from_source(gpu, &self.config.shaders)?;

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tone map encoder"),
            });
        let ((), error) = gpu.scoped(|| {
            pass.encode(quad, &program, &mut encoder);
            gpu.queue().submit(std::iter::once(encoder.finish()));
        });
        if let Some(error) = error {
            log::error!("tone map draw failed: {error}");
            return Err(RenderError::Validation(error.to_string()));
        }

        pass.read_into(gpu, out)?;
        program.release();
        drop(pass);
        Ok(())
    }

    /// Like [`RenderContext::render_tone_map`], allocating the output.
    pub fn render_tone_map_to_vec(
        &mut self,
        image: &HdrImage<'_>,
        params: &ToneMapParams,
    ) -> RenderResult<Vec<u8>> {
        let mut out = vec![0; hdr_tonemap_core::output_len(image.width(), image.height())?];
        self.render_tone_map(image, params, &mut out)?;
        Ok(out)
    }

    /// Waits for outstanding work and releases the device. Safe to call
    /// repeatedly; a later [`RenderContext::ensure`] starts over.
    pub fn teardown(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            let _ = gpu.device.poll(wgpu::PollType::wait_indefinitely());
            gpu.device.destroy();
            log::info!("render context torn down");
        }
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.teardown();
    }
}
