//! Tone maps a synthetic HDR gradient at several exposures and writes PNGs.
//!
//! Run with `cargo run --example gradient_demo -- [output_dir]`.

use std::path::PathBuf;

use hdr_tonemap::*;

const WIDTH: u32 = 512;
const HEIGHT: u32 = 64;

/// Horizontal ramp from 0 to 16 in linear units, tinted per row band.
fn gradient() -> Vec<f32> {
    let mut data = Vec::with_capacity((WIDTH * HEIGHT * 3) as usize);
    for y in 0..HEIGHT {
        let tint = match y * 3 / HEIGHT {
            0 => Vec3::new(1.0, 0.6, 0.3),
            1 => Vec3::ONE,
            _ => Vec3::new(0.3, 0.6, 1.0),
        };
        for x in 0..WIDTH {
            let value = 16.0 * (x as f32 / (WIDTH - 1) as f32).powi(2);
            let rgb = tint * value;
            data.extend_from_slice(&[rgb.x, rgb.y, rgb.z]);
        }
    }
    data
}

fn main() -> RenderResult<()> {
    init_logging();
    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(std::env::temp_dir, PathBuf::from);

    let data = gradient();
    let image = HdrImage::new(&data, WIDTH, HEIGHT)?;
    let mut context = RenderContext::new(RenderConfig::default());

    for exposure in [0.25_f32, 1.0, 4.0] {
        let params = ToneMapParams::new(exposure, 8.0);
        let pixels = context.render_tone_map_to_vec(&image, &params)?;
        let path = out_dir.join(format!("gradient_exposure_{exposure}.png"));
        save_bgra_png(&path, &pixels, WIDTH, HEIGHT)?;
        log::info!("wrote {}", path.display());
    }

    context.teardown();
    Ok(())
}
