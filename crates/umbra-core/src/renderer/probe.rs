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

//! Reflection probes: the volumes whose surroundings are captured into a cube
//! map and blended into the reflection buffer.

use crate::math::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// The category of a probe volume, used to index program tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    /// An oriented box with parallax correction.
    Box,
    /// A sphere.
    Sphere,
}

impl ProbeKind {
    /// Number of probe kinds.
    pub const COUNT: usize = 2;

    /// The table index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The influence volume of a probe, in probe space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProbeShape {
    /// A box of half-size `extents`, fading over `transition_distance` beyond it.
    Box {
        /// Half-size of the box.
        extents: Vec3,
        /// Width of the fade band outside the box.
        transition_distance: f32,
    },
    /// A sphere of radius `range`.
    Sphere {
        /// The radius of influence.
        range: f32,
    },
}

/// What a probe captures when it is regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureMethod {
    /// Renders reflection-casting geometry with its shadows, lighting and sky.
    /// Faces are regenerated only when something in view of them changed.
    Realtime,
    /// Captures lighting and sky only, every frame.
    Environment,
}

/// A reflection probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReflectionProbe {
    /// The influence volume.
    pub shape: ProbeShape,
    /// The capture method.
    pub method: CaptureMethod,
    /// Strength of the probe's contribution.
    pub intensity: f32,
}

impl ReflectionProbe {
    /// A realtime box probe.
    pub fn boxed(extents: Vec3) -> Self {
        Self {
            shape: ProbeShape::Box {
                extents,
                transition_distance: 1.0,
            },
            method: CaptureMethod::Realtime,
            intensity: 1.0,
        }
    }

    /// A realtime sphere probe.
    pub fn sphere(range: f32) -> Self {
        Self {
            shape: ProbeShape::Sphere { range },
            method: CaptureMethod::Realtime,
            intensity: 1.0,
        }
    }

    /// Returns the probe with another capture method.
    pub fn with_method(mut self, method: CaptureMethod) -> Self {
        self.method = method;
        self
    }

    /// The kind of the probe volume.
    pub fn kind(&self) -> ProbeKind {
        match self.shape {
            ProbeShape::Box { .. } => ProbeKind::Box,
            ProbeShape::Sphere { .. } => ProbeKind::Sphere,
        }
    }

    /// The probe-space box enclosing the influence volume.
    pub fn local_bounds(&self) -> Aabb {
        match self.shape {
            ProbeShape::Box { extents, .. } => Aabb::from_center_half_extents(Vec3::ZERO, extents),
            ProbeShape::Sphere { range } => Aabb::from_sphere(Vec3::ZERO, range),
        }
    }

    /// The largest distance from the center at which the probe still captures.
    pub fn max_range(&self) -> f32 {
        match self.shape {
            ProbeShape::Box { extents, .. } => extents.max_element(),
            ProbeShape::Sphere { range } => range,
        }
    }

    /// The world-space radius of the screen area a probe may affect, given
    /// the scale of its transform.
    pub fn influence_radius(&self, scale: Vec3) -> f32 {
        match self.shape {
            ProbeShape::Box {
                extents,
                transition_distance,
            } => (extents * scale + Vec3::splat(transition_distance)).length(),
            ProbeShape::Sphere { range } => range * scale.max_element(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_probe_bounds_and_range() {
        let probe = ReflectionProbe::boxed(Vec3::new(5.0, 2.0, 3.0));
        assert_eq!(probe.local_bounds().max, Vec3::new(5.0, 2.0, 3.0));
        assert_eq!(probe.max_range(), 5.0);
        assert_eq!(probe.kind(), ProbeKind::Box);
    }

    #[test]
    fn test_sphere_probe_influence_scales() {
        let probe = ReflectionProbe::sphere(4.0).with_method(CaptureMethod::Environment);
        assert_eq!(probe.influence_radius(Vec3::new(1.0, 2.0, 1.0)), 8.0);
        assert_eq!(probe.method, CaptureMethod::Environment);
    }
}
