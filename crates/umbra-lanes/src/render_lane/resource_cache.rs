// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-view cache of named, size-keyed intermediate buffers.

use super::LodTable;
use ahash::AHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use umbra_core::math::Extent2D;
use umbra_core::renderer::{BufferDescriptor, BufferId, BufferKind, RenderBackend, ResourceError};

/// Key of the geometry buffer.
pub const GBUFFER: &str = "GBUFFER";
/// Key of the light accumulation buffer.
pub const LBUFFER: &str = "LBUFFER";
/// Key of the reflection buffer.
pub const RBUFFER: &str = "RBUFFER";
/// Key of the tonemapped output buffer.
pub const OBUFFER: &str = "OBUFFER";
/// Key of a light's layered shadow map.
pub const SHADOW_MAP: &str = "SHADOWMAP";
/// Key of a probe's cube map.
pub const CUBEMAP: &str = "CUBEMAP";
/// Key of the output of one probe face render.
pub const PROBE_FACE: &str = "PROBE_FACE";

/// Number of attachments of the geometry buffer: albedo/AO, normal, material,
/// emissive and depth.
pub const GBUFFER_ATTACHMENTS: u32 = 5;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier of a [`RenderView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

#[derive(Debug)]
struct CachedBuffer {
    id: BufferId,
    descriptor: BufferDescriptor,
    used: bool,
}

/// The buffers and LOD state owned by one camera or one probe face.
///
/// A buffer requested with the size it was created with is returned as-is;
/// any other size (or kind, or layer count) destroys it and creates a new one.
/// Buffers that nobody requested between two calls to
/// [`release_unused`](Self::release_unused) are evicted by the second call.
#[derive(Debug)]
pub struct RenderView {
    id: ViewId,
    buffers: AHashMap<String, CachedBuffer>,
    lods: LodTable,
}

impl RenderView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self {
            id: ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)),
            buffers: AHashMap::new(),
            lods: LodTable::default(),
        }
    }

    /// The identifier of this view.
    #[inline]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Returns the buffer cached under `key`, creating or recreating it if it
    /// does not match the request.
    pub fn get_or_create(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: &str,
        kind: BufferKind,
        size: Extent2D,
        layers: u32,
    ) -> Result<BufferId, ResourceError> {
        let descriptor = BufferDescriptor::new(key, kind, size).with_layers(layers);
        if let Some(cached) = self.buffers.get_mut(key) {
            if cached.descriptor == descriptor {
                cached.used = true;
                return Ok(cached.id);
            }
            log::info!(
                "Recreating '{key}' for view {:?}: {}x{} -> {}x{}",
                self.id,
                cached.descriptor.size.width,
                cached.descriptor.size.height,
                size.width,
                size.height
            );
            backend.destroy_buffer(cached.id);
            self.buffers.remove(key);
        } else {
            log::debug!(
                "Creating '{key}' for view {:?} ({}x{})",
                self.id,
                size.width,
                size.height
            );
        }

        let id = backend.create_buffer(&descriptor)?;
        self.buffers.insert(
            key.to_string(),
            CachedBuffer {
                id,
                descriptor,
                used: true,
            },
        );
        Ok(id)
    }

    /// The geometry buffer for a viewport of `size`.
    pub fn g_buffer(
        &mut self,
        backend: &mut dyn RenderBackend,
        size: Extent2D,
    ) -> Result<BufferId, ResourceError> {
        self.get_or_create(
            backend,
            GBUFFER,
            BufferKind::GBuffer {
                attachments: GBUFFER_ATTACHMENTS,
            },
            size,
            1,
        )
    }

    /// The light accumulation buffer for a viewport of `size`.
    pub fn light_buffer(
        &mut self,
        backend: &mut dyn RenderBackend,
        size: Extent2D,
    ) -> Result<BufferId, ResourceError> {
        self.get_or_create(backend, LBUFFER, BufferKind::HdrColor, size, 1)
    }

    /// The reflection buffer for a viewport of `size`.
    pub fn reflection_buffer(
        &mut self,
        backend: &mut dyn RenderBackend,
        size: Extent2D,
    ) -> Result<BufferId, ResourceError> {
        self.get_or_create(backend, RBUFFER, BufferKind::HdrColor, size, 1)
    }

    /// The tonemapped output buffer for a viewport of `size`.
    pub fn output_buffer(
        &mut self,
        backend: &mut dyn RenderBackend,
        size: Extent2D,
    ) -> Result<BufferId, ResourceError> {
        self.get_or_create(backend, OBUFFER, BufferKind::LdrColor, size, 1)
    }

    /// The buffer cached under `key`, without touching it.
    pub fn get(&self, key: &str) -> Option<BufferId> {
        self.buffers.get(key).map(|cached| cached.id)
    }

    /// Whether the buffer under `key` exists with the given size.
    pub fn is_valid(&self, key: &str, size: Extent2D) -> bool {
        self.buffers
            .get(key)
            .is_some_and(|cached| cached.descriptor.size == size)
    }

    /// Number of cached buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Destroys every buffer not requested since the previous call and
    /// returns how many were destroyed.
    pub fn release_unused(&mut self, backend: &mut dyn RenderBackend) -> usize {
        let before = self.buffers.len();
        self.buffers.retain(|key, cached| {
            if cached.used {
                cached.used = false;
                true
            } else {
                log::debug!("Releasing unused '{key}' of view {:?}", self.id);
                backend.destroy_buffer(cached.id);
                false
            }
        });
        before - self.buffers.len()
    }

    /// Destroys every buffer of the view.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        for (_, cached) in self.buffers.drain() {
            backend.destroy_buffer(cached.id);
        }
    }

    /// The LOD state of entities seen through this view.
    #[inline]
    pub fn lods(&self) -> &LodTable {
        &self.lods
    }

    /// Mutable access to the LOD state of entities seen through this view.
    #[inline]
    pub fn lods_mut(&mut self) -> &mut LodTable {
        &mut self.lods
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::renderer::RecordingBackend;

    #[test]
    fn test_same_size_returns_same_buffer() {
        let mut backend = RecordingBackend::new();
        let mut view = RenderView::new();
        let size = Extent2D::new(512, 512);
        let a = view.g_buffer(&mut backend, size).unwrap();
        let b = view.g_buffer(&mut backend, size).unwrap();
        assert_eq!(a, b);
        assert_eq!(backend.live_buffer_count(), 1);
        assert!(view.is_valid(GBUFFER, size));
    }

    #[test]
    fn test_resize_recreates_buffer() {
        let mut backend = RecordingBackend::new();
        let mut view = RenderView::new();
        let a = view.g_buffer(&mut backend, Extent2D::new(512, 512)).unwrap();
        let b = view.g_buffer(&mut backend, Extent2D::new(1024, 512)).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.live_buffer_count(), 1);
        assert!(backend.descriptor(a).is_none());
        assert!(!view.is_valid(GBUFFER, Extent2D::new(512, 512)));
    }

    #[test]
    fn test_release_unused_evicts_only_stale_buffers() {
        let mut backend = RecordingBackend::new();
        let mut view = RenderView::new();
        let size = Extent2D::new(64, 64);
        view.g_buffer(&mut backend, size).unwrap();
        view.light_buffer(&mut backend, size).unwrap();
        assert_eq!(view.release_unused(&mut backend), 0);

        view.g_buffer(&mut backend, size).unwrap();
        assert_eq!(view.release_unused(&mut backend), 1);
        assert!(view.get(GBUFFER).is_some());
        assert!(view.get(LBUFFER).is_none());
        assert_eq!(backend.live_buffer_count(), 1);
    }

    #[test]
    fn test_allocation_failure_propagates() {
        let mut backend = RecordingBackend::new().with_buffer_limit(0);
        let mut view = RenderView::new();
        let err = view.output_buffer(&mut backend, Extent2D::new(8, 8)).unwrap_err();
        assert!(matches!(err, ResourceError::OutOfMemory { .. }));
        assert_eq!(view.buffer_count(), 0);
    }

    #[test]
    fn test_view_ids_are_unique() {
        assert_ne!(RenderView::new().id(), RenderView::new().id());
    }
}
