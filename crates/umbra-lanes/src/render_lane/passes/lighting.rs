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

//! Light accumulation.

use super::submit;
use crate::render_lane::{FrameContext, FrameStats, RenderView, ShadowRebuildCoordinator};
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::math::{degrees_to_radians, ScreenRect};
use umbra_core::renderer::{
    BlendMode, BufferId, DrawCommand, DrawUniforms, LightShape, QuadDraw, RenderBackend,
    RenderCamera, RenderError, RenderPass, SkipReason,
};

/// Inputs of the lighting stage produced by earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct LightingInputs {
    /// The filled geometry buffer.
    pub g_buffer: BufferId,
    /// The reflection buffer, when reflections were blended this frame.
    pub r_buffer: Option<BufferId>,
    /// Whether shadow maps are sampled.
    pub apply_shadows: bool,
}

/// Adds one scissored quad per visible light to the light buffer.
#[derive(Debug, Default)]
pub struct LightingLane;

impl Lane for LightingLane {
    fn strategy_name(&self) -> &'static str {
        "DeferredLighting"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Lighting
    }
}

impl LightingLane {
    /// Clears and fills the light buffer of `view`, returning it.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: &mut RenderView,
        shadows: &ShadowRebuildCoordinator,
        inputs: LightingInputs,
        stats: &mut FrameStats,
    ) -> Result<BufferId, RenderError> {
        let l_buffer = view.light_buffer(backend, camera.viewport)?;
        let mut pass_inputs = vec![inputs.g_buffer];
        pass_inputs.extend(inputs.r_buffer);
        let mut pass = RenderPass::new("light_buffer_fill", l_buffer)
            .cleared()
            .with_blend(BlendMode::Additive)
            .with_inputs(pass_inputs)
            .with_view_projection(camera.view_projection());

        for (entity, transform, light) in ctx.scene.lights() {
            let position = transform.position();
            let rect = match light.local_bounds() {
                Some(bounds) => {
                    if !camera.test_obb(&bounds, transform.matrix()) {
                        continue;
                    }
                    let radius = light.range().unwrap_or(0.0) * transform.scale().max_element();
                    camera.projected_sphere_rect(position, radius)
                }
                None => ScreenRect::full(camera.viewport),
            };
            if rect.is_empty() {
                stats.record_skip(SkipReason::BelowScreenThreshold);
                continue;
            }

            let shadow_map = if inputs.apply_shadows && light.casts_shadows {
                shadows.shadow_map(entity, light, view.id())
            } else {
                None
            };
            let shadow_variant = shadow_map.map(|_| (light.shadow.depth, light.shadow.filter));
            let Some(program) = ctx.programs.lighting(light.kind(), shadow_variant) else {
                log::trace!("No {} light program for {entity:?}", light.kind().name());
                stats.record_skip(SkipReason::ResourceNotReady);
                continue;
            };

            let direction = (-transform.matrix().z_axis.truncate()).normalize_or_zero();
            let (range, cone) = match light.shape {
                LightShape::Point { range, .. } => (range, 0.0),
                LightShape::Spot {
                    range, outer_angle, ..
                } => (range, degrees_to_radians(outer_angle * 0.5).cos()),
                LightShape::Directional { .. } => (0.0, 0.0),
            };
            let uniforms = DrawUniforms::new(
                [
                    light.color.x * light.intensity,
                    light.color.y * light.intensity,
                    light.color.z * light.intensity,
                    range,
                ],
                [direction.x, direction.y, direction.z, cone],
            );
            pass.push(DrawCommand::Quad(QuadDraw {
                program,
                scissor: Some(rect),
                textures: shadow_map.into_iter().collect(),
                uniforms,
            }));
        }

        submit(backend, pass, stats)?;
        Ok(l_buffer)
    }
}
