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

use super::submit;
use crate::render_lane::{FrameContext, FrameStats};
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::math::ScreenRect;
use umbra_core::renderer::{
    BlendMode, BufferId, DrawCommand, DrawUniforms, QuadDraw, RenderBackend, RenderCamera,
    RenderError, RenderPass, SkipReason,
};

/// Darkens the ambient term stored in the geometry buffer.
#[derive(Debug, Default)]
pub struct AmbientOcclusionLane;

impl Lane for AmbientOcclusionLane {
    fn strategy_name(&self) -> &'static str {
        "ScreenSpaceAmbientOcclusion"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::AmbientOcclusion
    }
}

impl AmbientOcclusionLane {
    /// Writes occlusion into the albedo/AO attachment of `g_buffer`.
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        g_buffer: BufferId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let Some(program) = ctx.programs.ambient_occlusion() else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return Ok(());
        };

        let mut pass = RenderPass::new("ambient_occlusion", g_buffer)
            .with_blend(BlendMode::AlphaBlend)
            .with_inputs(vec![g_buffer])
            .with_view_projection(camera.view_projection());
        pass.push(DrawCommand::Quad(QuadDraw {
            program,
            scissor: Some(ScreenRect::full(camera.viewport)),
            textures: vec![g_buffer],
            uniforms: DrawUniforms::new([camera.near, camera.far, 0.0, 0.0], [0.0; 4]),
        }));
        submit(backend, pass, stats)
    }
}
