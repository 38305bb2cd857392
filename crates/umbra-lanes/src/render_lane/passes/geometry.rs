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

//! Geometry buffer fill with LOD cross-fades.

use super::submit;
use crate::render_lane::{update_lod, FrameContext, FrameStats, RenderView};
use umbra_core::ecs::entity::EntityId;
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::math::Mat4;
use umbra_core::renderer::{
    BufferId, DrawCommand, DrawUniforms, MeshDraw, RenderBackend, RenderCamera, RenderError,
    RenderPass, SkipReason,
};
use umbra_data::ModelComponent;

/// Draws the visible entities into the geometry buffer.
///
/// Each entity is drawn at its current LOD and, while a cross-fade is in
/// progress, a second time at its target LOD. The first uniform vector
/// carries `(weight, is_target, lod_index, 0)`.
#[derive(Debug, Default)]
pub struct GeometryLane;

impl Lane for GeometryLane {
    fn strategy_name(&self) -> &'static str {
        "DeferredGeometry"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Geometry
    }
}

impl GeometryLane {
    /// Clears and fills the geometry buffer of `view`, returning it.
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: &mut RenderView,
        visible: &[EntityId],
        stats: &mut FrameStats,
    ) -> Result<BufferId, RenderError> {
        let g_buffer = view.g_buffer(backend, camera.viewport)?;
        let mut pass = RenderPass::new("g_buffer_fill", g_buffer)
            .cleared()
            .with_view_projection(camera.view_projection());
        let transition_time = ctx.settings.lod_transition_time;

        for &entity in visible {
            let (Some(transform), Some(model)) =
                (ctx.scene.transform(entity), ctx.scene.model(entity))
            else {
                continue;
            };
            if model.base_mesh().is_none() {
                stats.record_skip(SkipReason::ResourceNotReady);
                continue;
            }
            if model.lod_limits().is_empty() {
                log::trace!("{entity:?} has no LOD ranges");
                stats.record_skip(SkipReason::DegenerateGeometry);
                continue;
            }

            let state = view.lods_mut().entry(entity);
            let keep = update_lod(
                state,
                model.lod_limits(),
                model.lod_count(),
                transition_time,
                ctx.dt,
                model.base_mesh(),
                transform.matrix(),
                camera,
            );
            if !keep {
                stats.record_skip(SkipReason::BelowScreenThreshold);
                continue;
            }

            let state = *state;
            let fade = state.fade(transition_time);
            self.push_lod(
                ctx,
                &mut pass,
                entity,
                model,
                transform.matrix(),
                (state.current_lod_index, fade.current_weight, false),
                stats,
            );
            if let Some(weight) = fade.target_weight {
                self.push_lod(
                    ctx,
                    &mut pass,
                    entity,
                    model,
                    transform.matrix(),
                    (state.target_lod_index, weight, true),
                    stats,
                );
            }
        }

        submit(backend, pass, stats)?;
        Ok(g_buffer)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_lod(
        &self,
        ctx: &FrameContext<'_>,
        pass: &mut RenderPass,
        entity: EntityId,
        model: &ModelComponent,
        world: &Mat4,
        (lod_index, weight, is_target): (usize, f32, bool),
        stats: &mut FrameStats,
    ) {
        let (Some(handle), Some(mesh)) = (model.lods().get(lod_index), model.lod_mesh(lod_index))
        else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return;
        };
        if mesh.is_degenerate() {
            stats.record_skip(SkipReason::DegenerateGeometry);
            return;
        }
        let alpha_test = model.primary_material().is_some_and(|m| m.alpha_test);
        let Some(program) = ctx.programs.geometry(alpha_test) else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return;
        };

        pass.push(DrawCommand::Mesh(MeshDraw {
            entity,
            mesh: handle.id(),
            lod_index: lod_index as u32,
            program,
            world: *world,
            uniforms: DrawUniforms::new(
                [weight, if is_target { 1.0 } else { 0.0 }, lod_index as f32, 0.0],
                [0.0; 4],
            ),
        }));
    }
}
