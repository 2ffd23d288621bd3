//! Tests for the high-level Rust API.

use hdr_tonemap::*;

fn gpu_available(context: &mut RenderContext) -> bool {
    match context.ensure() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Skipping test: no GPU available ({e})");
            false
        }
    }
}

#[test]
fn test_invalid_image_rejected() {
    let data = [0.0_f32; 5];
    assert!(matches!(
        HdrImage::new(&data, 2, 1),
        Err(ToneMapError::SizeMismatch { .. })
    ));
    assert!(matches!(
        HdrImage::new(&[], 0, 1),
        Err(ToneMapError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_cpu_reference_scene() {
    let data = [0.0_f32, 0.0, 0.0, 1.0, 1.0, 1.0];
    let image = HdrImage::new(&data, 2, 1).unwrap();
    let mut out = [0u8; 8];
    tone_map_cpu(&image, &ToneMapParams::new(1.0, 1.0), &mut out).unwrap();
    assert_eq!(out, [0, 0, 0, 255, 255, 255, 255, 255]);
}

#[test]
fn test_one_shot_matches_context() {
    let mut context = RenderContext::new(RenderConfig::default());
    if !gpu_available(&mut context) {
        return;
    }

    let data: Vec<f32> = (0..16 * 3).map(|i| i as f32 / 8.0).collect();
    let image = HdrImage::new(&data, 4, 4).unwrap();
    let params = ToneMapParams::new(1.5, 3.0);

    let from_context = context.render_tone_map_to_vec(&image, &params).unwrap();
    let one_shot = tone_map_to_vec(&image, &params).unwrap();
    assert_eq!(from_context, one_shot);

    let mut into_buffer = vec![0u8; output_len(4, 4).unwrap()];
    tone_map(&image, &params, &mut into_buffer).unwrap();
    assert_eq!(into_buffer, one_shot);
}

#[test]
fn test_tone_map_to_file() {
    let mut context = RenderContext::new(RenderConfig::default());
    if !gpu_available(&mut context) {
        return;
    }
    context.teardown();

    let data = [0.0_f32, 0.0, 0.0, 1.0, 1.0, 1.0];
    let image = HdrImage::new(&data, 2, 1).unwrap();
    let path = std::env::temp_dir().join("hdr_tonemap_api_test.png");
    tone_map_to_file(&path, &image, &ToneMapParams::default()).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_global_context_lifecycle() {
    global::shutdown();
    if global::init().is_err() {
        eprintln!("Skipping test: no GPU available");
        return;
    }
    assert!(global::is_initialized());

    let data = [1.0_f32; 3];
    let image = HdrImage::new(&data, 1, 1).unwrap();
    let params = ToneMapParams::new(1.0, 1.0);
    let pixels = global::with_context(|context| context.render_tone_map_to_vec(&image, &params))
        .unwrap();
    assert_eq!(pixels, vec![255, 255, 255, 255]);

    global::shutdown();
    assert!(!global::is_initialized());
}
