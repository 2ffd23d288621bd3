//! Bookkeeping for per-call GPU objects.
//!
//! Every texture, buffer and pipeline a render call creates is wrapped in a
//! [`Tracked`] handle. Dropping the handle destroys the GPU object right
//! away (rather than whenever wgpu gets to it) and decrements the live count
//! kept by [`ResourceTracker`], so leaks show up in [`ResourceCounts`].

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Live per-call GPU objects owned by a render context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub textures: usize,
    pub buffers: usize,
    pub programs: usize,
}

impl ResourceCounts {
    /// Total number of live objects.
    #[must_use]
    pub fn total(&self) -> usize {
        self.textures + self.buffers + self.programs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Texture,
    Buffer,
    Program,
}

#[derive(Debug, Default)]
struct Counters {
    textures: AtomicUsize,
    buffers: AtomicUsize,
    programs: AtomicUsize,
}

impl Counters {
    fn slot(&self, kind: ResourceKind) -> &AtomicUsize {
        match kind {
            ResourceKind::Texture => &self.textures,
            ResourceKind::Buffer => &self.buffers,
            ResourceKind::Program => &self.programs,
        }
    }
}

/// Shared live-object counters. Cloning shares the same counters.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            textures: self.counters.textures.load(Ordering::Acquire),
            buffers: self.counters.buffers.load(Ordering::Acquire),
            programs: self.counters.programs.load(Ordering::Acquire),
        }
    }

    /// Starts tracking `resource`.
    pub fn track<T: Release>(&self, resource: T) -> Tracked<T> {
        let kind = T::KIND;
        self.counters.slot(kind).fetch_add(1, Ordering::AcqRel);
        Tracked {
            resource,
            tracker: self.clone(),
        }
    }

    fn untrack(&self, kind: ResourceKind) {
        self.counters.slot(kind).fetch_sub(1, Ordering::AcqRel);
    }
}

/// GPU objects that can be released eagerly.
pub(crate) trait Release {
    const KIND: ResourceKind;

    fn release(&self);
}

impl Release for wgpu::Texture {
    const KIND: ResourceKind = ResourceKind::Texture;

    fn release(&self) {
        self.destroy();
    }
}

impl Release for wgpu::Buffer {
    const KIND: ResourceKind = ResourceKind::Buffer;

    fn release(&self) {
        self.destroy();
    }
}

// Pipelines have no explicit destroy; dropping the last handle frees them.
impl Release for wgpu::RenderPipeline {
    const KIND: ResourceKind = ResourceKind::Program;

    fn release(&self) {}
}

/// A GPU object counted by a [`ResourceTracker`] until dropped.
#[derive(Debug)]
pub(crate) struct Tracked<T: Release> {
    resource: T,
    tracker: ResourceTracker,
}

impl<T: Release> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.resource
    }
}

impl<T: Release> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.resource.release();
        self.tracker.untrack(T::KIND);
    }
}
