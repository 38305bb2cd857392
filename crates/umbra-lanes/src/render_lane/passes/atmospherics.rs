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

//! Sky and atmospheric scattering.

use super::submit;
use crate::render_lane::{FrameContext, FrameStats, RenderView};
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::math::{ScreenRect, Vec3};
use umbra_core::renderer::{
    BlendMode, BufferId, DrawCommand, DrawUniforms, LightKind, QuadDraw, RenderBackend,
    RenderCamera, RenderError, RenderPass, SkipReason,
};

/// Sun direction used when the skylight entity carries no directional light.
const DEFAULT_SUN_DIRECTION: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Composites the sky of the first skylight onto the light buffer where the
/// depth attachment holds no geometry.
#[derive(Debug, Default)]
pub struct AtmosphericsLane {
    warned_extra_skylights: bool,
}

impl Lane for AtmosphericsLane {
    fn strategy_name(&self) -> &'static str {
        "Atmospherics"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Atmospherics
    }
}

impl AtmosphericsLane {
    /// Returns the buffer holding the composited result, which is `input`
    /// itself when the scene has no skylight.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: &mut RenderView,
        input: BufferId,
        g_buffer: BufferId,
        stats: &mut FrameStats,
    ) -> Result<BufferId, RenderError> {
        let mut skylights = ctx.scene.skylights();
        let Some((entity, transform, skylight, light)) = skylights.next() else {
            return Ok(input);
        };
        if skylights.next().is_some() && !self.warned_extra_skylights {
            log::warn!("More than one skylight in the scene, only {entity:?} is used");
            self.warned_extra_skylights = true;
        }

        let Some(program) = ctx.programs.atmospherics(skylight.model) else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return Ok(input);
        };

        let sun = match light {
            Some(light) if light.kind() == LightKind::Directional => {
                (-transform.matrix().z_axis.truncate()).normalize_or_zero()
            }
            _ => DEFAULT_SUN_DIRECTION,
        };

        let l_buffer = view.light_buffer(backend, camera.viewport)?;
        let mut pass_inputs = vec![g_buffer];
        if input != l_buffer {
            pass_inputs.push(input);
        }
        let mut pass = RenderPass::new("atmospherics", l_buffer)
            .with_blend(BlendMode::AlphaBlend)
            .with_inputs(pass_inputs)
            .with_view_projection(camera.view_projection());
        pass.push(DrawCommand::Quad(QuadDraw {
            program,
            scissor: Some(ScreenRect::full(camera.viewport)),
            textures: vec![g_buffer],
            uniforms: DrawUniforms::new(
                [sun.x, sun.y, sun.z, skylight.turbidity],
                [camera.position.x, camera.position.y, camera.position.z, 0.0],
            ),
        }));
        submit(backend, pass, stats)?;
        Ok(l_buffer)
    }
}
