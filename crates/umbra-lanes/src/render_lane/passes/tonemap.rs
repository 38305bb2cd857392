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
use umbra_core::renderer::{
    BufferId, DrawCommand, DrawUniforms, QuadDraw, RenderBackend, RenderError, RenderPass,
    SkipReason,
};

/// Maps the HDR result of the pipeline to the output buffer.
#[derive(Debug, Default)]
pub struct TonemapLane;

impl Lane for TonemapLane {
    fn strategy_name(&self) -> &'static str {
        "Tonemap"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Tonemap
    }
}

impl TonemapLane {
    /// Tonemaps `input` into `output`.
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        input: BufferId,
        output: BufferId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let Some(program) = ctx.programs.tonemapping() else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return Ok(());
        };

        let tonemapping = ctx.settings.tonemapping;
        let mut pass = RenderPass::new("tonemapping", output)
            .cleared()
            .with_inputs(vec![input]);
        pass.push(DrawCommand::Quad(QuadDraw {
            program,
            scissor: None,
            textures: vec![input],
            uniforms: DrawUniforms::new(
                [
                    tonemapping.exposure,
                    tonemapping.method.shader_index() as f32,
                    0.0,
                    0.0,
                ],
                [0.0; 4],
            ),
        }));
        submit(backend, pass, stats)
    }
}
