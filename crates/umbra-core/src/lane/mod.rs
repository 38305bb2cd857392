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

//! # Lane Abstraction
//!
//! A **Lane** is one processing strategy of the frame pipeline: a stage of the
//! deferred compositor (geometry fill, lighting accumulation, tonemapping...)
//! or one of the rebuild coordinators that keep cached artifacts current.
//!
//! The base trait only carries identity and classification. Each stage has
//! its own inputs, so execution methods live on the concrete lane types and
//! the compositor calls them in a fixed order.
//!
//! ```rust,ignore
//! use umbra_core::lane::{Lane, LaneKind};
//!
//! struct FxaaLane;
//!
//! impl Lane for FxaaLane {
//!     fn strategy_name(&self) -> &'static str { "Fxaa" }
//!     fn lane_kind(&self) -> LaneKind { LaneKind::Tonemap }
//! }
//! ```

use std::fmt;

/// Classification of lanes, in the order the compositor runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneKind {
    /// Regenerates reflection probe cubemap faces.
    ReflectionRebuild,
    /// Regenerates shadow maps.
    ShadowRebuild,
    /// Fills the geometry buffer.
    Geometry,
    /// Screen-space ambient occlusion.
    AmbientOcclusion,
    /// Blends probe cubemaps into the reflection buffer.
    ReflectionBlend,
    /// Accumulates light contributions into the light buffer.
    Lighting,
    /// Composites the sky and atmospheric scattering.
    Atmospherics,
    /// Maps HDR color to the output buffer.
    Tonemap,
    /// Overlays debug visualization onto the output.
    Debug,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::ReflectionRebuild => write!(f, "ReflectionRebuild"),
            LaneKind::ShadowRebuild => write!(f, "ShadowRebuild"),
            LaneKind::Geometry => write!(f, "Geometry"),
            LaneKind::AmbientOcclusion => write!(f, "AmbientOcclusion"),
            LaneKind::ReflectionBlend => write!(f, "ReflectionBlend"),
            LaneKind::Lighting => write!(f, "Lighting"),
            LaneKind::Atmospherics => write!(f, "Atmospherics"),
            LaneKind::Tonemap => write!(f, "Tonemap"),
            LaneKind::Debug => write!(f, "Debug"),
        }
    }
}

/// Common interface shared by every lane of the frame pipeline.
pub trait Lane: Send + Sync {
    /// Human-readable name of the strategy, used in logs and pass labels.
    fn strategy_name(&self) -> &'static str;

    /// The pipeline slot this lane fills.
    fn lane_kind(&self) -> LaneKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_kinds_order_like_the_frame() {
        assert!(LaneKind::ReflectionRebuild < LaneKind::ShadowRebuild);
        assert!(LaneKind::Geometry < LaneKind::AmbientOcclusion);
        assert!(LaneKind::ReflectionBlend < LaneKind::Lighting);
        assert!(LaneKind::Tonemap < LaneKind::Debug);
        assert_eq!(LaneKind::Lighting.to_string(), "Lighting");
    }
}
