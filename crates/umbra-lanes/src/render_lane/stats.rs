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

use umbra_core::renderer::{RenderPass, SkipReason};

/// Counters gathered while rendering a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Passes submitted to the backend.
    pub passes: u32,
    /// Draw commands submitted to the backend.
    pub draw_calls: u32,
    /// Shadow maps regenerated.
    pub shadow_rebuilds: u32,
    /// Probe cube map faces regenerated.
    pub probe_face_rebuilds: u32,
    /// Entities, lights or probes skipped because a dependency was not ready.
    pub skipped_not_ready: u32,
    /// Entities, lights or probes skipped because they cannot produce pixels.
    pub skipped_degenerate: u32,
    /// Entities skipped because they were too small on screen.
    pub skipped_small: u32,
}

impl FrameStats {
    /// Counts a skipped item.
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::ResourceNotReady => self.skipped_not_ready += 1,
            SkipReason::DegenerateGeometry => self.skipped_degenerate += 1,
            SkipReason::BelowScreenThreshold => self.skipped_small += 1,
        }
    }

    /// Counts a pass about to be submitted.
    pub fn record_pass(&mut self, pass: &RenderPass) {
        self.passes += 1;
        self.draw_calls += pass.draw_count() as u32;
    }

    /// The number of items skipped for `reason`.
    pub fn skipped(&self, reason: SkipReason) -> u32 {
        match reason {
            SkipReason::ResourceNotReady => self.skipped_not_ready,
            SkipReason::DegenerateGeometry => self.skipped_degenerate,
            SkipReason::BelowScreenThreshold => self.skipped_small,
        }
    }
}
