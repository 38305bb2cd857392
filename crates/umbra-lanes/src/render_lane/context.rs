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

use super::ProgramLibrary;
use umbra_core::renderer::PipelineSettings;
use umbra_data::Scene;

/// Read-only state shared by every lane during one pipeline invocation.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// The index of the frame being rendered, as returned by `begin_frame`.
    pub frame_index: u64,
    /// The scene being rendered.
    pub scene: &'a Scene,
    /// The compositor configuration.
    pub settings: &'a PipelineSettings,
    /// The programs resolved from the backend.
    pub programs: &'a ProgramLibrary,
    /// Seconds elapsed since the previous frame.
    pub dt: f32,
}
