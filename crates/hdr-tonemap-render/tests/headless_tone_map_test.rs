//! Headless tone mapping integration tests.
//!
//! These tests require a GPU adapter (real or software fallback). When no
//! adapter is available they print a message and return early.

use std::path::Path;

use hdr_tonemap_core::{tone_map_cpu, HdrImage, RenderConfig, ShaderSource, ToneMapParams};
use hdr_tonemap_render::{
    RenderContext, RenderError, ResourceCounts, ShaderProgram, ShaderStage, ToneMapPass,
};

fn ready_context(config: RenderConfig) -> Option<RenderContext> {
    let mut context = RenderContext::new(config);
    match context.ensure() {
        Ok(()) => Some(context),
        Err(e) => {
            eprintln!("Skipping headless test: no GPU adapter available ({e})");
            None
        }
    }
}

fn render(
    context: &mut RenderContext,
    data: &[f32],
    width: u32,
    height: u32,
    params: ToneMapParams,
) -> Vec<u8> {
    let image = HdrImage::new(data, width, height).unwrap();
    context
        .render_tone_map_to_vec(&image, &params)
        .expect("tone map render failed")
}

fn shader_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shaders")
}

#[test]
fn headless_zero_input_is_opaque_black() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    // 67 columns forces padded readback rows
    for (width, height) in [(1, 1), (4, 3), (67, 5)] {
        let data = vec![0.0; (width * height * 3) as usize];
        for params in [ToneMapParams::default(), ToneMapParams::new(8.0, 0.5)] {
            let pixels = render(&mut context, &data, width, height, params);
            assert_eq!(pixels.len(), (width * height * 4) as usize);
            assert!(pixels.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
        }
    }
}

#[test]
fn headless_two_pixel_scene() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let pixels = render(
        &mut context,
        &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        2,
        1,
        ToneMapParams::new(1.0, 1.0),
    );
    assert_eq!(&pixels[..4], &[0, 0, 0, 255]);
    for &channel in &pixels[4..7] {
        assert!(channel >= 254, "expected saturated channel, got {channel}");
    }
    assert_eq!(pixels[7], 255);
}

#[test]
fn headless_white_point_saturates() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    // exposure * value == white point
    let pixels = render(&mut context, &[2.0, 2.0, 2.0], 1, 1, ToneMapParams::new(2.0, 4.0));
    for &channel in &pixels[..3] {
        assert!(channel >= 254, "expected saturated channel, got {channel}");
    }
}

#[test]
fn headless_exposure_is_monotonic() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let mut previous = 0u8;
    for exposure in [0.0, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0] {
        let params = ToneMapParams::new(exposure, 2.0);
        let pixels = render(&mut context, &[0.3, 0.3, 0.3], 1, 1, params);
        assert!(pixels[1] >= previous, "exposure {exposure} decreased output");
        previous = pixels[1];
    }
    assert!(previous > 0);
}

#[test]
fn headless_very_bright_input_stays_white() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    // 1e5 and f32::MAX are past the half float range of the input texture
    let data = [1.0e5, 1.0e5, 1.0e5, 6.0e4, 6.0e4, 6.0e4, f32::MAX, f32::MAX, f32::MAX];
    let pixels = render(&mut context, &data, 3, 1, ToneMapParams::default());
    assert_eq!(pixels, [255; 12]);

    // value * exposure overflows f32
    let params = ToneMapParams::new(1.0e35, 1.0);
    let pixels = render(&mut context, &[6.0e4, 6.0e4, 6.0e4], 1, 1, params);
    assert_eq!(pixels, [255; 4]);

    let image = HdrImage::new(&data, 3, 1).unwrap();
    let mut cpu = [0u8; 12];
    tone_map_cpu(&image, &ToneMapParams::default(), &mut cpu).unwrap();
    assert_eq!(cpu, [255; 12]);
}

#[test]
fn headless_pass_reports_its_size() {
    let Some(context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let gpu = context.gpu().unwrap();
    let data = vec![0.5; 5 * 3 * 3];
    let image = HdrImage::new(&data, 5, 3).unwrap();
    let pass = ToneMapPass::prepare(gpu, &image, &ToneMapParams::new(2.0, 4.0)).unwrap();

    assert_eq!(pass.size(), (5, 3));
    let input = pass.input_texture();
    assert_eq!((input.width(), input.height()), (5, 3));
    assert_eq!(input.format(), hdr_tonemap_render::INPUT_FORMAT);
    assert_eq!(pass.uniform_buffer().size(), 16);

    assert_eq!(context.live_resources().textures, 2);
    drop(pass);
    assert_eq!(context.live_resources(), ResourceCounts::default());
}

#[test]
fn headless_matches_cpu_reference() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let (width, height) = (16u32, 4u32);
    let data: Vec<f32> = (0..width * height * 3)
        .map(|i| (i as f32 / 24.0).powi(2))
        .collect();
    let params = ToneMapParams::new(1.5, 6.0);
    let gpu = render(&mut context, &data, width, height, params);

    let image = HdrImage::new(&data, width, height).unwrap();
    let mut cpu = vec![0u8; gpu.len()];
    tone_map_cpu(&image, &params, &mut cpu).unwrap();

    for (i, (g, c)) in gpu.iter().zip(&cpu).enumerate() {
        assert!(g.abs_diff(*c) <= 1, "byte {i}: gpu {g} vs cpu {c}");
    }
}

#[test]
fn headless_top_left_origin_and_bgra_order() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    #[rustfmt::skip]
    let data = [
        1.0, 0.0, 0.0,   0.0, 1.0, 0.0, // top row: red, green
        0.0, 0.0, 1.0,   1.0, 1.0, 1.0, // bottom row: blue, white
    ];
    let pixels = render(&mut context, &data, 2, 2, ToneMapParams::default());
    let px = |i: usize| &pixels[i * 4..i * 4 + 4];
    let high = |v: u8| v >= 254;

    // BGRA: red lands in byte 2, blue in byte 0
    assert!(high(px(0)[2]) && px(0)[0] == 0 && px(0)[1] == 0);
    assert!(high(px(1)[1]) && px(1)[0] == 0 && px(1)[2] == 0);
    assert!(high(px(2)[0]) && px(2)[1] == 0 && px(2)[2] == 0);
    assert!(px(3)[..3].iter().copied().all(high));
}

#[test]
fn headless_ensure_is_idempotent() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let info = context.adapter_info().map(|info| info.name);
    assert!(context.ensure().is_ok());
    assert!(context.ensure().is_ok());
    assert!(context.is_ready());
    assert_eq!(context.adapter_info().map(|info| info.name), info);
}

#[test]
fn headless_quad_persists_across_calls() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    assert!(context.gpu().unwrap().quad().is_none());
    render(&mut context, &[0.5; 3], 1, 1, ToneMapParams::default());
    assert!(context.gpu().unwrap().quad().is_some());
    render(&mut context, &[0.5; 3], 1, 1, ToneMapParams::default());
    assert!(context.gpu().unwrap().quad().is_some());
}

#[test]
fn headless_calls_do_not_leak_resources() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let baseline = context.live_resources();
    assert_eq!(baseline, ResourceCounts::default());
    for i in 0..8 {
        let size = 1 + i * 3;
        let data = vec![0.25; (size * size * 3) as usize];
        render(&mut context, &data, size, size, ToneMapParams::default());
        assert_eq!(context.live_resources(), baseline);
    }
}

#[test]
fn headless_program_counts_until_released() {
    let Some(context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let gpu = context.gpu().unwrap();
    let program = ShaderProgram::from_source(gpu, &ShaderSource::Embedded).unwrap();
    assert_eq!(context.live_resources().programs, 1);
    program.release();
    assert_eq!(context.live_resources().programs, 0);
}

#[test]
fn headless_missing_shader_file_is_reported() {
    let shaders = ShaderSource::files(
        shader_dir().join("default.vert.wgsl"),
        shader_dir().join("does_not_exist.frag.wgsl"),
    );
    let Some(mut context) = ready_context(RenderConfig::default().with_shaders(shaders)) else {
        return;
    };
    let image = HdrImage::new(&[1.0, 1.0, 1.0], 1, 1).unwrap();
    let mut out = [9u8; 4];
    let result = context.render_tone_map(&image, &ToneMapParams::default(), &mut out);
    assert!(matches!(result, Err(RenderError::ShaderSourceMissing { .. })));
    assert_eq!(out, [9; 4]);
    assert_eq!(context.live_resources(), ResourceCounts::default());
}

#[test]
fn headless_file_shaders_render_like_embedded() {
    let shaders = ShaderSource::files(
        shader_dir().join("default.vert.wgsl"),
        shader_dir().join("default.frag.wgsl"),
    );
    let Some(mut from_files) = ready_context(RenderConfig::default().with_shaders(shaders)) else {
        return;
    };
    let Some(mut embedded) = ready_context(RenderConfig::default()) else {
        return;
    };
    let data = [0.1, 0.7, 3.0, 12.0, 0.0, 0.4];
    let params = ToneMapParams::new(1.2, 4.0);
    assert_eq!(
        render(&mut from_files, &data, 2, 1, params),
        render(&mut embedded, &data, 2, 1, params)
    );
}

#[test]
fn headless_broken_fragment_stage_is_reported() {
    let shaders = ShaderSource::inline(
        hdr_tonemap_render::DEFAULT_VERTEX_SHADER,
        "@fragment fn fs_main() -> @location(0) vec4<f32> { return undefined_value; }",
    );
    let Some(mut context) = ready_context(RenderConfig::default().with_shaders(shaders)) else {
        return;
    };
    let image = HdrImage::new(&[1.0, 1.0, 1.0], 1, 1).unwrap();
    let mut out = [9u8; 4];
    let result = context.render_tone_map(&image, &ToneMapParams::default(), &mut out);
    match result {
        Err(RenderError::ShaderBuildFailed { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
            assert!(log.len() <= hdr_tonemap_render::MAX_LOG_LEN);
        }
        other => panic!("expected fragment build failure, got {other:?}"),
    }
    assert_eq!(out, [9; 4]);
    assert_eq!(context.live_resources(), ResourceCounts::default());
}

#[test]
fn headless_build_from_paths() {
    let Some(context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let gpu = context.gpu().unwrap();
    let vertex = shader_dir().join("default.vert.wgsl");

    let program =
        ShaderProgram::build_from_paths(gpu, &vertex, &shader_dir().join("default.frag.wgsl"))
            .unwrap();
    assert_eq!(context.live_resources().programs, 1);
    program.release();

    let missing = shader_dir().join("missing.frag.wgsl");
    match ShaderProgram::build_from_paths(gpu, &vertex, &missing) {
        Err(RenderError::ShaderSourceMissing { path, .. }) => assert_eq!(path, missing),
        Err(other) => panic!("expected missing source, got {other:?}"),
        Ok(_) => panic!("expected missing source, got a program"),
    }
    assert_eq!(context.live_resources().programs, 0);
}

#[test]
fn headless_broken_vertex_stage_is_reported() {
    let Some(context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let result = ShaderProgram::build(
        context.gpu().unwrap(),
        "this is not wgsl",
        hdr_tonemap_render::DEFAULT_FRAGMENT_SHADER,
    );
    assert!(matches!(
        result,
        Err(RenderError::ShaderBuildFailed { stage: ShaderStage::Vertex, .. })
    ));
}

#[test]
fn headless_missing_entry_point_fails_link() {
    let Some(context) = ready_context(RenderConfig::default()) else {
        return;
    };
    let fragment = hdr_tonemap_render::DEFAULT_FRAGMENT_SHADER.replace("fs_main", "main_image");
    let result = ShaderProgram::build(
        context.gpu().unwrap(),
        hdr_tonemap_render::DEFAULT_VERTEX_SHADER,
        &fragment,
    );
    assert!(matches!(
        result,
        Err(RenderError::ShaderBuildFailed { stage: ShaderStage::Program, .. })
    ));
    assert_eq!(context.live_resources().programs, 0);
}

#[test]
fn headless_teardown_then_reinitialize() {
    let Some(mut context) = ready_context(RenderConfig::default()) else {
        return;
    };
    render(&mut context, &[1.0; 3], 1, 1, ToneMapParams::default());
    context.teardown();
    assert!(!context.is_ready());
    context.teardown();

    let pixels = render(&mut context, &[0.0; 3], 1, 1, ToneMapParams::default());
    assert!(context.is_ready());
    assert_eq!(pixels, [0, 0, 0, 255]);
}
