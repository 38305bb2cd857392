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

//! Blending of probe cube maps into the reflection buffer.

use super::submit;
use crate::render_lane::{
    FrameContext, FrameStats, ReflectionRebuildCoordinator, RenderView,
};
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::math::Vec3;
use umbra_core::renderer::{
    BlendMode, BufferId, DrawCommand, DrawUniforms, ProbeShape, QuadDraw, RenderBackend,
    RenderCamera, RenderError, RenderPass, SkipReason,
};

/// Draws one screen quad per visible probe, scissored to the probe's
/// projected influence.
#[derive(Debug, Default)]
pub struct ReflectionBlendLane;

impl Lane for ReflectionBlendLane {
    fn strategy_name(&self) -> &'static str {
        "ProbeBlend"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::ReflectionBlend
    }
}

impl ReflectionBlendLane {
    /// Clears and fills the reflection buffer of `view`, returning it.
    ///
    /// Probes outside the camera, probes whose cube map was never generated
    /// and probes covering no pixel are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: &mut RenderView,
        reflections: &ReflectionRebuildCoordinator,
        g_buffer: BufferId,
        stats: &mut FrameStats,
    ) -> Result<BufferId, RenderError> {
        let r_buffer = view.reflection_buffer(backend, camera.viewport)?;
        let mut pass = RenderPass::new("reflection_buffer_fill", r_buffer)
            .cleared()
            .with_blend(BlendMode::AlphaBlend)
            .with_inputs(vec![g_buffer])
            .with_view_projection(camera.view_projection());

        for (entity, transform, probe) in ctx.scene.probes() {
            if !camera.test_obb(&probe.local_bounds(), transform.matrix()) {
                continue;
            }
            let Some(cubemap) = reflections.cubemap(entity) else {
                log::trace!("Probe {entity:?} has no cube map yet");
                stats.record_skip(SkipReason::ResourceNotReady);
                continue;
            };
            let radius = probe.influence_radius(transform.scale());
            let rect = camera.projected_sphere_rect(transform.position(), radius);
            if rect.is_empty() {
                stats.record_skip(SkipReason::BelowScreenThreshold);
                continue;
            }
            let Some(program) = ctx.programs.reflection(probe.kind()) else {
                stats.record_skip(SkipReason::ResourceNotReady);
                continue;
            };

            let (extents, fade) = match probe.shape {
                ProbeShape::Box {
                    extents,
                    transition_distance,
                } => (extents, transition_distance),
                ProbeShape::Sphere { range } => (Vec3::splat(range), 0.0),
            };
            let position = transform.position();
            pass.push(DrawCommand::Quad(QuadDraw {
                program,
                scissor: Some(rect),
                textures: vec![cubemap],
                uniforms: DrawUniforms::new(
                    [position.x, position.y, position.z, probe.intensity],
                    [extents.x, extents.y, extents.z, fade],
                ),
            }));
        }

        submit(backend, pass, stats)?;
        Ok(r_buffer)
    }
}
