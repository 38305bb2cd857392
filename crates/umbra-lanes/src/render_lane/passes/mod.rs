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

//! One lane per compositor stage, plus the depth-only lane used to fill
//! shadow maps.

mod ambient_occlusion;
mod atmospherics;
mod debug;
mod geometry;
mod lighting;
mod reflection_blend;
mod shadow_depth;
mod tonemap;

pub use ambient_occlusion::AmbientOcclusionLane;
pub use atmospherics::AtmosphericsLane;
pub use debug::DebugLane;
pub use geometry::GeometryLane;
pub use lighting::{LightingInputs, LightingLane};
pub use reflection_blend::ReflectionBlendLane;
pub use shadow_depth::ShadowDepthLane;
pub use tonemap::TonemapLane;

use super::FrameStats;
use umbra_core::renderer::{RenderBackend, RenderError, RenderPass};

/// Counts and submits a pass.
pub(crate) fn submit(
    backend: &mut dyn RenderBackend,
    pass: RenderPass,
    stats: &mut FrameStats,
) -> Result<(), RenderError> {
    stats.record_pass(&pass);
    log::trace!("Submitting '{}' with {} draw(s)", pass.label, pass.draw_count());
    backend.submit(pass)
}
