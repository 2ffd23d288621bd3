//! Tone mapping render pass.

use hdr_tonemap_core::{saturate_linear, HdrImage, ToneMapParams};

use crate::buffer::{create_readback_buffer, create_uniform_buffer};
use crate::context::Gpu;
use crate::error::{RenderError, RenderResult};
use crate::quad::QuadGeometry;
use crate::readback::aligned_bytes_per_row;
use crate::resources::Tracked;
use crate::shader::ShaderProgram;

/// Input texture format. Half floats keep HDR range with linear filtering.
pub const INPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Render target format, 8 bits per channel.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU representation of tone mapping uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ToneMapUniforms {
    pub exposure: f32,
    pub white_point: f32,
    pub gamma: f32,
    pub _padding: f32,
}

impl From<&ToneMapParams> for ToneMapUniforms {
    fn from(params: &ToneMapParams) -> Self {
        Self {
            exposure: params.exposure,
            white_point: params.white_point,
            gamma: params.gamma(),
            _padding: 0.0,
        }
    }
}

impl Default for ToneMapUniforms {
    fn default() -> Self {
        Self::from(&ToneMapParams::default())
    }
}

/// Bind group 0: `tex0` (binding 0), its sampler (binding 1), uniforms
/// (binding 2).
pub(crate) fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Tone Map Bind Group Layout"),
        entries: &[
            // Input texture
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            // Sampler
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            // Uniforms
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ToneMapUniforms>() as u64,
                    ),
                },
                count: None,
            },
        ],
    })
}

/// Linear min/mag filtering, clamped at the edges.
pub(crate) fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Tone Map Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn to_f16_bits(value: f32) -> u16 {
    half::f16::from_f32(saturate_linear(value)).to_bits()
}

/// Expands RGB f32 to RGBA f16 bits, alpha 1.
///
/// Channels are saturated to `[0, MAX_LINEAR]` first, so nothing packs to
/// infinity or NaN.
pub(crate) fn pack_rgba16f(image: &HdrImage<'_>) -> Vec<u16> {
    let one = half::f16::ONE.to_bits();
    image
        .data()
        .chunks_exact(3)
        .flat_map(|rgb| {
            [
                to_f16_bits(rgb[0]),
                to_f16_bits(rgb[1]),
                to_f16_bits(rgb[2]),
                one,
            ]
        })
        .collect()
}

fn check_dimensions(gpu: &Gpu, width: u32, height: u32) -> Result<(), String> {
    let max = gpu.device().limits().max_texture_dimension_2d;
    if width > max || height > max {
        return Err(format!(
            "{width}x{height} exceeds the device limit of {max} texels per side"
        ));
    }
    Ok(())
}

/// Creates the input texture and fills it from `image`.
pub(crate) fn upload_input(
    gpu: &Gpu,
    image: &HdrImage<'_>,
) -> RenderResult<Tracked<wgpu::Texture>> {
    let (width, height) = (image.width(), image.height());
    check_dimensions(gpu, width, height).map_err(RenderError::TextureUploadFailed)?;

    let texels = pack_rgba16f(image);
    let (texture, error) = gpu.scoped(|| {
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("HDR Input Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: INPUT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4 * 2), // 4 channels * 2 bytes per f16
                rows_per_image: Some(height),
            },
            extent(width, height),
        );
        texture
    });
    let texture = gpu.tracker().track(texture);
    if let Some(error) = error {
        return Err(RenderError::TextureUploadFailed(error.to_string()));
    }
    Ok(texture)
}

/// Creates the render target and checks it can be drawn into and copied
/// out of.
pub(crate) fn create_render_target(
    gpu: &Gpu,
    width: u32,
    height: u32,
) -> RenderResult<Tracked<wgpu::Texture>> {
    let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC;
    let features = gpu.adapter().get_texture_format_features(TARGET_FORMAT);
    if !features.allowed_usages.contains(required) {
        return Err(RenderError::IncompleteRenderTarget(format!(
            "{TARGET_FORMAT:?} does not support {required:?} on this adapter"
        )));
    }
    check_dimensions(gpu, width, height).map_err(RenderError::IncompleteRenderTarget)?;

    let (texture, error) = gpu.scoped(|| {
        gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Tone Map Target"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: required,
            view_formats: &[],
        })
    });
    let texture = gpu.tracker().track(texture);
    if let Some(error) = error {
        return Err(RenderError::IncompleteRenderTarget(error.to_string()));
    }
    Ok(texture)
}

/// Per-call GPU objects of one tone map draw.
///
/// Everything here is released when the pass is dropped, including on
/// early error returns.
pub struct ToneMapPass {
    input: Tracked<wgpu::Texture>,
    target: Tracked<wgpu::Texture>,
    uniforms: Tracked<wgpu::Buffer>,
    readback: Tracked<wgpu::Buffer>,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl ToneMapPass {
    /// Uploads the input, allocates the render target and binds the
    /// parameters.
    pub fn prepare(gpu: &Gpu, image: &HdrImage<'_>, params: &ToneMapParams) -> RenderResult<Self> {
        let (width, height) = (image.width(), image.height());
        let input = upload_input(gpu, image)?;
        let target = create_render_target(gpu, width, height)?;

        let uniforms = gpu.tracker().track(create_uniform_buffer(
            gpu.device(),
            &ToneMapUniforms::from(params),
            Some("Tone Map Uniform Buffer"),
        ));
        let readback_size = u64::from(aligned_bytes_per_row(width)) * u64::from(height);
        let readback = gpu.tracker().track(create_readback_buffer(
            gpu.device(),
            readback_size,
            Some("Tone Map Readback Buffer"),
        ));

        let input_view = input.create_view(&wgpu::TextureViewDescriptor::default());
        let (bind_group, error) = gpu.scoped(|| {
            gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Tone Map Bind Group"),
                layout: gpu.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&input_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(gpu.sampler()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        });
        if let Some(error) = error {
            return Err(RenderError::Validation(error.to_string()));
        }

        Ok(Self {
            input,
            target,
            uniforms,
            readback,
            bind_group,
            width,
            height,
        })
    }

    /// Records the draw into the render target and the copy into the
    /// readback buffer.
    pub fn encode(
        &self,
        quad: &QuadGeometry,
        program: &ShaderProgram,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let target_view = self.target.create_view(&wgpu::TextureViewDescriptor::default());
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tone Map Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            #[allow(clippy::cast_precision_loss)]
            let (width, height) = (self.width as f32, self.height as f32);
            render_pass.set_viewport(0.0, 0.0, width, height, 0.0, 1.0);
            program.activate(&mut render_pass);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            quad.draw(&mut render_pass);
        }

        crate::readback::copy_to_buffer(
            encoder,
            &self.target,
            &self.readback,
            self.width,
            self.height,
        );
    }

    /// Maps the readback buffer and writes BGRA pixels into `out`.
    ///
    /// Call after the encoder from [`ToneMapPass::encode`] was submitted.
    pub fn read_into(&self, gpu: &Gpu, out: &mut [u8]) -> RenderResult<()> {
        crate::readback::read_bgra(gpu, &self.readback, self.width, self.height, out)
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Input texture, kept for inspection.
    #[must_use]
    pub fn input_texture(&self) -> &wgpu::Texture {
        &self.input
    }

    /// Uniform buffer holding the bound parameters.
    #[must_use]
    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniforms
    }
}
