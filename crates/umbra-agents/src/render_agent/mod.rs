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

//! Acts as the **[A]gent** for the rendering subsystem.
//!
//! The [`DeferredCompositor`] sequences the lanes of one pipeline invocation
//! in a fixed order: probe and shadow rebuilds first, then geometry, ambient
//! occlusion, reflection blending, lighting, atmospherics, tonemapping and the
//! optional debug overlay. Probe faces are rendered by nesting a reduced
//! invocation inside the reflection rebuild.

mod compositor;

pub use compositor::*;
pub use umbra_core::renderer::StageFlags;
pub use umbra_lanes::FrameStats;
