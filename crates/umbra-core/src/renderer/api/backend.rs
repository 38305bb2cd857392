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

use super::{BufferDescriptor, BufferId, ProgramId, RenderPass};
use crate::renderer::error::{RenderError, ResourceError};

/// A GPU backend able to execute the passes produced by the frame pipeline.
///
/// All methods are called from the thread running the pipeline. A backend
/// may queue work internally; nothing here waits for the GPU.
pub trait RenderBackend {
    /// Allocates a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::OutOfMemory`] when the device is exhausted.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Releases a buffer. Unknown handles are ignored.
    fn destroy_buffer(&mut self, id: BufferId);

    /// Resolves a compiled program by name, or `None` if the backend has no
    /// such program.
    fn find_program(&mut self, name: &str) -> Option<ProgramId>;

    /// Queues a pass for execution.
    fn submit(&mut self, pass: RenderPass) -> Result<(), RenderError>;

    /// Copies `source` into one layer of `destination`.
    fn blit(&mut self, source: BufferId, destination: BufferId, layer: u32)
        -> Result<(), RenderError>;
}
