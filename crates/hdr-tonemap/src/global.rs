//! Process-wide render context.
//!
//! Most callers should own a [`RenderContext`] directly. This module keeps a
//! single shared context behind a mutex for callers that cannot hold one,
//! chiefly the C ABI in [`crate::ffi`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use hdr_tonemap_core::RenderConfig;
use hdr_tonemap_render::{RenderContext, RenderResult};

static CONTEXT: Mutex<Option<RenderContext>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<RenderContext>> {
    CONTEXT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initializes the shared context with the default configuration.
///
/// Calling it again once initialized is a no-op that returns `Ok`.
pub fn init() -> RenderResult<()> {
    init_with_config(RenderConfig::default())
}

/// Initializes the shared context.
///
/// `config` only takes effect when no shared context exists yet; call
/// [`shutdown`] first to switch configurations.
pub fn init_with_config(config: RenderConfig) -> RenderResult<()> {
    crate::init_logging();
    let mut guard = lock();
    let context = guard.get_or_insert_with(|| RenderContext::new(config));
    context.ensure()
}

/// Returns whether the shared context is initialized.
#[must_use]
pub fn is_initialized() -> bool {
    lock().as_ref().is_some_and(RenderContext::is_ready)
}

/// Runs `f` with exclusive access to the shared context, creating it cold
/// with the default configuration if needed.
pub fn with_context<F, R>(f: F) -> R
where
    F: FnOnce(&mut RenderContext) -> R,
{
    let mut guard = lock();
    let context = guard.get_or_insert_with(|| RenderContext::new(RenderConfig::default()));
    f(context)
}

/// Tears down and drops the shared context. No-op if it was never created.
pub fn shutdown() {
    if let Some(mut context) = lock().take() {
        context.teardown();
    }
}
