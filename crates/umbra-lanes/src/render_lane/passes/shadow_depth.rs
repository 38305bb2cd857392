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

//! Depth-only rendering of shadow casters.

use super::submit;
use crate::render_lane::{
    gather, FrameContext, FrameStats, ShadowCasterRenderer, VisibilityFilter, VisibilityQuery,
};
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::renderer::{
    BufferId, DrawCommand, DrawUniforms, Light, MeshDraw, RenderBackend, RenderCamera,
    RenderError, RenderPass, SkipReason,
};

/// Fills shadow map layers with the base LOD of every shadow caster in
/// view of each shadow camera.
#[derive(Debug, Default)]
pub struct ShadowDepthLane;

impl Lane for ShadowDepthLane {
    fn strategy_name(&self) -> &'static str {
        "ShadowDepth"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::ShadowRebuild
    }
}

impl ShadowCasterRenderer for ShadowDepthLane {
    fn render_shadow_casters(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        light: &Light,
        cameras: &[RenderCamera],
        target: BufferId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let program = ctx.programs.shadow_depth(light.shadow.depth);
        let casters = VisibilityQuery::new().with(VisibilityFilter::ShadowCaster);

        for (layer, camera) in cameras.iter().enumerate() {
            let mut pass = RenderPass::new("shadow_depth", target)
                .cleared()
                .with_layer(layer as u32)
                .with_view_projection(camera.view_projection());

            let Some(program) = program else {
                // The layer is still cleared so it reads as unoccluded.
                submit(backend, pass, stats)?;
                continue;
            };

            for entity in gather(ctx.scene, Some(&camera.frustum()), &casters) {
                let (Some(transform), Some(model)) =
                    (ctx.scene.transform(entity), ctx.scene.model(entity))
                else {
                    continue;
                };
                let (Some(handle), Some(mesh)) = (model.lods().first(), model.base_mesh()) else {
                    stats.record_skip(SkipReason::ResourceNotReady);
                    continue;
                };
                if mesh.is_degenerate() {
                    stats.record_skip(SkipReason::DegenerateGeometry);
                    continue;
                }
                pass.push(DrawCommand::Mesh(MeshDraw {
                    entity,
                    mesh: handle.id(),
                    lod_index: 0,
                    program,
                    world: *transform.matrix(),
                    uniforms: DrawUniforms::new(
                        [light.shadow.bias, light.shadow.normal_bias, 0.0, 0.0],
                        [light.shadow.near_plane, light.shadow.far_plane, 0.0, 0.0],
                    ),
                }));
            }
            submit(backend, pass, stats)?;
        }
        Ok(())
    }
}
