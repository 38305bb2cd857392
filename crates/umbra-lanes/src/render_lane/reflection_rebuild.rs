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

//! Incremental regeneration of reflection probe cube maps.
//!
//! Each face of each probe is rendered by a nested pipeline invocation into
//! its own view and then copied into the probe's cube map. Environment probes
//! recapture every frame; realtime probes only recapture the faces that
//! changed entities are visible from.

use super::{
    gather, FrameContext, FrameStats, GenerationStamp, RenderView, ViewId, VisibilityFilter,
    VisibilityQuery, CUBEMAP, PROBE_FACE,
};
use ahash::AHashMap;
use umbra_core::ecs::entity::EntityId;
use umbra_core::math::{Aabb, Extent2D, Mat4};
use umbra_core::renderer::{
    BufferId, BufferKind, CaptureMethod, CubeFace, RenderBackend, RenderCamera, RenderError,
    StageFlags,
};
use umbra_data::Scene;

/// Near plane of probe face cameras.
const PROBE_NEAR_PLANE: f32 = 0.1;

/// What a nested pipeline invocation must render for one probe face.
#[derive(Debug, Clone)]
pub struct ProbeFaceRequest<'a> {
    /// The 90 degree face camera.
    pub camera: &'a RenderCamera,
    /// The stages to run. Never contains [`StageFlags::REFLECTIONS`].
    pub flags: StageFlags,
    /// The entities eligible for the face.
    pub visibility: &'a VisibilityQuery,
    /// The buffer tonemapping must write to.
    pub output: BufferId,
}

/// Renders the scene for one probe face, typically by running a reduced
/// compositor pipeline.
pub trait ProbeFaceRenderer {
    /// Renders `request` using the buffers and LOD state of `view`.
    fn render_probe_face(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        request: &ProbeFaceRequest<'_>,
        view: &mut RenderView,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError>;
}

#[derive(Debug, Default)]
struct ProbeFace {
    stamp: GenerationStamp,
    view: RenderView,
    generated: bool,
}

#[derive(Debug, Default)]
struct ProbeArtifact {
    faces: [ProbeFace; 6],
    cubemap_view: RenderView,
    cubemap: Option<BufferId>,
    generated_with: Option<Mat4>,
    rebuild_count: u64,
}

impl ProbeArtifact {
    fn handled_in(&self, frame: u64) -> bool {
        self.faces.iter().all(|face| face.stamp.is_current(frame))
    }
}

/// Owns every probe cube map and decides which faces to regenerate.
#[derive(Debug, Default)]
pub struct ReflectionRebuildCoordinator {
    probes: AHashMap<EntityId, ProbeArtifact>,
    released_views: Vec<ViewId>,
}

impl ReflectionRebuildCoordinator {
    /// Creates a coordinator with no cached cube maps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the probes relevant to `camera` up to date. Each face is
    /// considered at most once per frame.
    pub fn rebuild(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        renderer: &mut dyn ProbeFaceRenderer,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        self.release_stale(backend, ctx.scene);

        let frame = ctx.frame_index;
        let face_size = ctx.settings.cubemap_face_size;
        let casters = VisibilityQuery::new().with(VisibilityFilter::ReflectionCaster);
        let mut dirty: Option<Vec<(Aabb, Mat4)>> = None;

        for (entity, transform, probe) in ctx.scene.probes() {
            let artifact = self.probes.entry(entity).or_default();
            if artifact.handled_in(frame) {
                continue;
            }
            let world = *transform.matrix();
            if !camera.test_obb(&probe.local_bounds(), &world) {
                continue;
            }

            let cubemap = artifact.cubemap_view.get_or_create(
                backend,
                CUBEMAP,
                BufferKind::Cubemap,
                Extent2D::square(face_size),
                6,
            )?;
            let environment = probe.method == CaptureMethod::Environment;
            let invalidate_all = environment
                || artifact.cubemap != Some(cubemap)
                || artifact.generated_with != Some(world);

            let far = probe.max_range() * transform.scale().max_element();
            let position = transform.position();
            let mut flags = StageFlags::PROBE;
            if !environment {
                flags |= StageFlags::GEOMETRY | StageFlags::SHADOWS;
            }

            let mut rebuilt_any = false;
            for face in CubeFace::ALL {
                let state = &mut artifact.faces[face.layer() as usize];
                if state.stamp.is_current(frame) {
                    continue;
                }
                state.stamp.mark(frame);

                let face_camera =
                    RenderCamera::cube_face(face, position, PROBE_NEAR_PLANE, far, face_size);
                let needed = invalidate_all || !state.generated || {
                    let dirty = dirty.get_or_insert_with(|| dirty_casters(ctx.scene));
                    let frustum = face_camera.frustum();
                    dirty.iter().any(|(bounds, m)| frustum.test_obb(bounds, m))
                };
                if !needed {
                    continue;
                }

                let output = state.view.get_or_create(
                    backend,
                    PROBE_FACE,
                    BufferKind::LdrColor,
                    Extent2D::square(face_size),
                    1,
                )?;
                let request = ProbeFaceRequest {
                    camera: &face_camera,
                    flags,
                    visibility: &casters,
                    output,
                };
                renderer.render_probe_face(backend, ctx, &request, &mut state.view, stats)?;
                backend.blit(output, cubemap, face.layer())?;

                state.generated = true;
                rebuilt_any = true;
                stats.probe_face_rebuilds += 1;
            }

            artifact.cubemap = Some(cubemap);
            artifact.generated_with = Some(world);
            if rebuilt_any {
                artifact.rebuild_count += 1;
                log::debug!("Regenerated probe {entity:?} in frame {frame}");
            }
        }
        Ok(())
    }

    /// The cube map of a probe, once at least one face was generated.
    pub fn cubemap(&self, probe: EntityId) -> Option<BufferId> {
        self.probes
            .get(&probe)
            .filter(|artifact| artifact.faces.iter().any(|face| face.generated))
            .and_then(|artifact| artifact.cubemap)
    }

    /// Number of frames in which at least one face of `probe` was regenerated.
    pub fn rebuild_count(&self, probe: EntityId) -> u64 {
        self.probes
            .get(&probe)
            .map_or(0, |artifact| artifact.rebuild_count)
    }

    /// Drops the cube maps of probes that were removed from the scene.
    pub fn release_stale(&mut self, backend: &mut dyn RenderBackend, scene: &Scene) {
        let released = &mut self.released_views;
        self.probes.retain(|entity, artifact| {
            let alive = scene.probe(*entity).is_some();
            if !alive {
                release_artifact(backend, artifact, released);
            }
            alive
        });
    }

    /// Drops every cached cube map.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        for (_, mut artifact) in self.probes.drain() {
            release_artifact(backend, &mut artifact, &mut self.released_views);
        }
    }

    /// The face views of the probes released since the last call.
    ///
    /// Face renders may have fitted view-dependent artifacts, such as
    /// directional shadow maps, to these views; their owner must drop them.
    pub fn take_released_views(&mut self) -> Vec<ViewId> {
        std::mem::take(&mut self.released_views)
    }
}

fn release_artifact(
    backend: &mut dyn RenderBackend,
    artifact: &mut ProbeArtifact,
    released: &mut Vec<ViewId>,
) {
    artifact.cubemap_view.release_all(backend);
    for face in &mut artifact.faces {
        face.view.release_all(backend);
        released.push(face.view.id());
    }
}

fn dirty_casters(scene: &Scene) -> Vec<(Aabb, Mat4)> {
    let query = VisibilityQuery::new()
        .with(VisibilityFilter::Dirty)
        .with(VisibilityFilter::ReflectionCaster);
    gather(scene, None, &query)
        .into_iter()
        .filter_map(|entity| {
            let transform = scene.transform(entity)?;
            let bounds = scene.model(entity)?.local_bounds()?;
            Some((bounds, *transform.matrix()))
        })
        .collect()
}
