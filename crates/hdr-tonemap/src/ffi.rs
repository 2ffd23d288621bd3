//! C ABI over the shared render context.
//!
//! ```c
//! bool    hdr_init(void);
//! int32_t hdr_upload(const float *linear_rgb, int32_t width, int32_t height,
//!                    uint8_t *output_bgra, float exposure, float white_point);
//! void    hdr_cleanup(void);
//! size_t  hdr_last_error(char *buf, size_t len);
//! ```
//!
//! All calls serialize on the shared context's mutex.

#![allow(unsafe_code)]

use std::ffi::c_char;
use std::sync::{Mutex, PoisonError};

use hdr_tonemap_core::{pixel_count, HdrImage, ToneMapParams};
use hdr_tonemap_render::RenderError;

use crate::global;

/// The call succeeded.
pub const HDR_OK: i32 = 0;
/// A pointer was null, a dimension was not positive, or a parameter was out
/// of range.
pub const HDR_ERR_INVALID_ARGUMENT: i32 = -1;
/// The GPU context could not be created.
pub const HDR_ERR_INIT: i32 = -2;
/// Shader build, render target, draw or readback failed.
pub const HDR_ERR_RENDER: i32 = -3;

static LAST_ERROR: Mutex<String> = Mutex::new(String::new());

fn set_last_error(message: String) {
    log::error!("{message}");
    *LAST_ERROR.lock().unwrap_or_else(PoisonError::into_inner) = message;
}

fn clear_last_error() {
    LAST_ERROR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

fn status_of(error: &RenderError) -> i32 {
    if error.is_initialization() {
        HDR_ERR_INIT
    } else if matches!(error, RenderError::Input(_)) {
        HDR_ERR_INVALID_ARGUMENT
    } else {
        HDR_ERR_RENDER
    }
}

fn fail(error: &RenderError) -> i32 {
    set_last_error(error.to_string());
    status_of(error)
}

/// Initializes the shared context. Returns `true` on success, including
/// when it was already initialized.
#[no_mangle]
pub extern "C" fn hdr_init() -> bool {
    match global::init() {
        Ok(()) => {
            clear_last_error();
            true
        }
        Err(e) => {
            fail(&e);
            false
        }
    }
}

/// Tone maps `linear_rgb` into `output_bgra`.
///
/// Initializes the shared context if needed. Returns [`HDR_OK`] or one of
/// the negative `HDR_ERR_*` codes; on error `output_bgra` is not written.
///
/// # Safety
///
/// `linear_rgb` must point to `width * height * 3` readable floats and
/// `output_bgra` to `width * height * 4` writable bytes, and the two regions
/// must not overlap. Null pointers are rejected.
#[no_mangle]
pub unsafe extern "C" fn hdr_upload(
    linear_rgb: *const f32,
    width: i32,
    height: i32,
    output_bgra: *mut u8,
    exposure: f32,
    white_point: f32,
) -> i32 {
    if linear_rgb.is_null() || output_bgra.is_null() {
        set_last_error("null image pointer".to_string());
        return HDR_ERR_INVALID_ARGUMENT;
    }
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        set_last_error(format!("invalid image dimensions {width}x{height}"));
        return HDR_ERR_INVALID_ARGUMENT;
    };
    let pixels = match pixel_count(width, height) {
        Ok(pixels) => pixels,
        Err(e) => return fail(&e.into()),
    };

    // SAFETY: the caller guarantees both regions have the documented sizes.
    let input = unsafe { std::slice::from_raw_parts(linear_rgb, pixels * 3) };
    let output = unsafe { std::slice::from_raw_parts_mut(output_bgra, pixels * 4) };

    let image = match HdrImage::new(input, width, height) {
        Ok(image) => image,
        Err(e) => return fail(&e.into()),
    };
    let params = ToneMapParams::new(exposure, white_point);

    crate::init_logging();
    match global::with_context(|context| context.render_tone_map(&image, &params, output)) {
        Ok(()) => {
            clear_last_error();
            HDR_OK
        }
        Err(e) => fail(&e),
    }
}

/// Releases the shared context. Safe to call at any time, any number of
/// times.
#[no_mangle]
pub extern "C" fn hdr_cleanup() {
    global::shutdown();
}

/// Copies the last error message into `buf` as a NUL-terminated string,
/// truncating to `len - 1` bytes. Returns the full message length; 0 means
/// no error is recorded.
///
/// # Safety
///
/// `buf` must be null or point to `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn hdr_last_error(buf: *mut c_char, len: usize) -> usize {
    let message = LAST_ERROR.lock().unwrap_or_else(PoisonError::into_inner);
    if !buf.is_null() && len > 0 {
        let copied = message.len().min(len - 1);
        // SAFETY: `buf` holds `len` bytes and `copied < len`.
        unsafe {
            std::ptr::copy_nonoverlapping(message.as_ptr().cast::<c_char>(), buf, copied);
            *buf.add(copied) = 0;
        }
    }
    message.len()
}
