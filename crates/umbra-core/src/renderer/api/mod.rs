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

//! The contract between the frame pipeline and a GPU backend.
//!
//! The pipeline describes work as [`RenderPass`]es made of [`DrawCommand`]s
//! and hands them to a [`RenderBackend`]. How those become API calls, and
//! on which thread, is the backend's business.

mod backend;
mod buffer;
mod pass;
mod program;
mod recording;

pub use self::backend::RenderBackend;
pub use self::buffer::{BufferDescriptor, BufferId, BufferKind};
pub use self::pass::{BlendMode, DrawCommand, DrawUniforms, LoadOp, MeshDraw, QuadDraw, RenderPass};
pub use self::program::ProgramId;
pub use self::recording::{RecordedCommand, RecordingBackend};
