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

//! Selection of the stages a pipeline invocation runs.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// The stages of the deferred pipeline a single invocation may run.
    ///
    /// Tonemapping is not selectable: every invocation writes its output.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StageFlags: u32 {
        /// Fill the geometry buffer. Without it the previous content is reused.
        const GEOMETRY = 1 << 1;
        /// Regenerate stale shadow maps and sample them while lighting.
        const SHADOWS = 1 << 2;
        /// Regenerate stale probe faces and blend probes into the reflection buffer.
        const REFLECTIONS = 1 << 3;
        /// Accumulate lights.
        const LIGHTING = 1 << 4;
        /// Composite the sky.
        const ATMOSPHERICS = 1 << 5;
        /// Screen-space ambient occlusion.
        const AMBIENT_OCCLUSION = 1 << 6;
        /// Overlay debug visualization.
        const DEBUG = 1 << 7;

        /// Everything except debug visualization.
        const FULL = Self::GEOMETRY.bits()
            | Self::SHADOWS.bits()
            | Self::REFLECTIONS.bits()
            | Self::LIGHTING.bits()
            | Self::ATMOSPHERICS.bits()
            | Self::AMBIENT_OCCLUSION.bits();
        /// The subset used to capture environment probe faces.
        const PROBE = Self::LIGHTING.bits() | Self::ATMOSPHERICS.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(StageFlags::FULL.contains(StageFlags::REFLECTIONS));
        assert!(!StageFlags::FULL.contains(StageFlags::DEBUG));
        assert!(!StageFlags::PROBE.contains(StageFlags::GEOMETRY));
        assert_eq!(
            StageFlags::PROBE | StageFlags::SHADOWS | StageFlags::GEOMETRY,
            StageFlags::FULL - StageFlags::REFLECTIONS - StageFlags::AMBIENT_OCCLUSION
        );
    }
}
