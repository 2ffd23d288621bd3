//! Fullscreen quad geometry.

use crate::buffer::create_vertex_buffer;

/// One quad vertex: NDC position and texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    /// Vertex buffer layout: location 0 = position, location 1 = uv,
    /// interleaved with a 16 byte stride.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two counter-clockwise triangles covering NDC `[-1, 1]^2`.
///
/// Texture coordinates use a top-left origin: NDC `(-1, 1)` samples
/// `uv (0, 0)`, which is row 0 of the uploaded image. Since the render
/// target's row 0 is also its top row, readback preserves row order.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
];

/// The shared quad vertex buffer. Created once per context, never modified.
pub struct QuadGeometry {
    vertex_buffer: wgpu::Buffer,
}

impl QuadGeometry {
    /// Number of vertices drawn per pass.
    pub const VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = create_vertex_buffer(device, &QUAD_VERTICES, Some("Fullscreen Quad"));
        Self { vertex_buffer }
    }

    #[must_use]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    /// Binds the quad to vertex slot 0 and draws it.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..Self::VERTEX_COUNT, 0..1);
    }
}
