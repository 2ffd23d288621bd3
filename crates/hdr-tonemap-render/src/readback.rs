//! Copying the render target back to host memory.

use crate::context::Gpu;
use crate::error::{RenderError, RenderResult};

const BYTES_PER_PIXEL: u32 = 4;

/// Calculates bytes per row with proper alignment for wgpu buffer copies.
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Records a copy of an RGBA8 texture into a readback buffer.
pub(crate) fn copy_to_buffer(
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
    buffer: &wgpu::Buffer,
    width: u32,
    height: u32,
) {
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(aligned_bytes_per_row(width)),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Strips row padding from `padded` RGBA rows and writes BGRA into `out`.
pub fn unpad_rgba_to_bgra(padded: &[u8], width: u32, height: u32, out: &mut [u8]) {
    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let stride = aligned_bytes_per_row(width) as usize;

    for (src_row, dst_row) in padded
        .chunks(stride)
        .take(height as usize)
        .zip(out.chunks_exact_mut(row_bytes))
    {
        for (src, dst) in src_row[..row_bytes]
            .chunks_exact(4)
            .zip(dst_row.chunks_exact_mut(4))
        {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = src[3];
        }
    }
}

/// Maps `buffer`, waits for the GPU, and unpacks it into `out` as BGRA.
pub(crate) fn read_bgra(
    gpu: &Gpu,
    buffer: &wgpu::Buffer,
    width: u32,
    height: u32,
    out: &mut [u8],
) -> RenderResult<()> {
    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    gpu.device()
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?;
    rx.recv()
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?;

    {
        let data = buffer_slice.get_mapped_range();
        unpad_rgba_to_bgra(&data, width, height, out);
    }
    buffer.unmap();
    Ok(())
}
