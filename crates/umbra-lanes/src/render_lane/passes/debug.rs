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

//! Bounds overlay tinted by LOD.

use super::submit;
use crate::render_lane::{FrameContext, FrameStats, RenderView};
use umbra_core::ecs::entity::EntityId;
use umbra_core::lane::{Lane, LaneKind};
use umbra_core::renderer::{
    BlendMode, BufferId, DrawCommand, DrawUniforms, QuadDraw, RenderBackend, RenderCamera,
    RenderError, RenderPass, SkipReason,
};

const LOD_TINTS: [[f32; 4]; 4] = [
    [0.1, 0.9, 0.1, 0.35],
    [0.9, 0.9, 0.1, 0.35],
    [0.9, 0.5, 0.1, 0.35],
    [0.9, 0.1, 0.1, 0.35],
];

/// Overlays the screen bounds of every visible entity onto the output.
#[derive(Debug, Default)]
pub struct DebugLane;

impl Lane for DebugLane {
    fn strategy_name(&self) -> &'static str {
        "DebugBounds"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Debug
    }
}

impl DebugLane {
    /// Draws one tinted quad per entity of `visible` into `output`.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: &RenderView,
        visible: &[EntityId],
        output: BufferId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let Some(program) = ctx.programs.debug_bounds() else {
            stats.record_skip(SkipReason::ResourceNotReady);
            return Ok(());
        };

        let mut pass = RenderPass::new("debug_overlay", output)
            .with_blend(BlendMode::AlphaBlend)
            .with_view_projection(camera.view_projection());
        for &entity in visible {
            let (Some(transform), Some(model)) =
                (ctx.scene.transform(entity), ctx.scene.model(entity))
            else {
                continue;
            };
            let Some(bounds) = model.world_bounds(transform.matrix()) else {
                continue;
            };
            let rect = camera.screen_rect(&bounds).clamped_to(camera.viewport);
            if rect.is_empty() {
                continue;
            }
            let lod = view
                .lods()
                .get(entity)
                .map_or(0, |state| state.current_lod_index);
            pass.push(DrawCommand::Quad(QuadDraw {
                program,
                scissor: Some(rect),
                textures: Vec::new(),
                uniforms: DrawUniforms::new(
                    LOD_TINTS[lod.min(LOD_TINTS.len() - 1)],
                    [lod as f32, 0.0, 0.0, 0.0],
                ),
            }));
        }
        submit(backend, pass, stats)
    }
}
