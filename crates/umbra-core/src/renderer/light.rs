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

//! Defines light types for the rendering system.
//!
//! Lights are positioned by their entity's transform. Point and spot lights
//! have a bounded influence volume in light space; directional lights are
//! unbounded and their shadow cascades follow the viewing camera.

use crate::math::{degrees_to_radians, Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// The category of a light, used to index program tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// A cone-shaped light.
    Spot,
    /// An omnidirectional light.
    Point,
    /// An infinitely distant light, such as the sun.
    Directional,
}

impl LightKind {
    /// Number of light kinds.
    pub const COUNT: usize = 3;
    /// All light kinds in table order.
    pub const ALL: [LightKind; 3] = [LightKind::Spot, LightKind::Point, LightKind::Directional];

    /// The table index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The short name used in program names.
    pub fn name(self) -> &'static str {
        match self {
            LightKind::Spot => "spot",
            LightKind::Point => "point",
            LightKind::Directional => "directional",
        }
    }
}

/// How depth is stored in shadow maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowDepth {
    /// Reversed-z projected depth.
    InvZ,
    /// Linear distance to the light.
    Linear,
}

impl ShadowDepth {
    /// Number of depth modes.
    pub const COUNT: usize = 2;
    /// All depth modes in table order.
    pub const ALL: [ShadowDepth; 2] = [ShadowDepth::InvZ, ShadowDepth::Linear];

    /// The short name used in program names.
    pub fn name(self) -> &'static str {
        match self {
            ShadowDepth::InvZ => "invz",
            ShadowDepth::Linear => "linear",
        }
    }
}

/// How shadow maps are filtered when lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowFilter {
    /// A single depth comparison.
    Hard,
    /// Percentage-closer filtering.
    Pcf,
    /// Percentage-closer soft shadows.
    Pcss,
    /// Variance shadow maps.
    Vsm,
    /// Exponential shadow maps.
    Esm,
}

impl ShadowFilter {
    /// Number of filters.
    pub const COUNT: usize = 5;
    /// All filters in table order.
    pub const ALL: [ShadowFilter; 5] = [
        ShadowFilter::Hard,
        ShadowFilter::Pcf,
        ShadowFilter::Pcss,
        ShadowFilter::Vsm,
        ShadowFilter::Esm,
    ];

    /// The short name used in program names.
    pub fn name(self) -> &'static str {
        match self {
            ShadowFilter::Hard => "hard",
            ShadowFilter::Pcf => "pcf",
            ShadowFilter::Pcss => "pcss",
            ShadowFilter::Vsm => "vsm",
            ShadowFilter::Esm => "esm",
        }
    }
}

/// The resolution class of a shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowResolution {
    /// 512 texels.
    Low,
    /// 1024 texels.
    Medium,
    /// 2048 texels.
    High,
    /// 4096 texels.
    VeryHigh,
}

impl ShadowResolution {
    /// The side length of the shadow map in texels.
    pub fn size(self) -> u32 {
        match self {
            ShadowResolution::Low => 512,
            ShadowResolution::Medium => 1024,
            ShadowResolution::High => 2048,
            ShadowResolution::VeryHigh => 4096,
        }
    }
}

/// Shadow generation parameters shared by every light kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowParams {
    /// The depth storage mode.
    pub depth: ShadowDepth,
    /// The filtering technique.
    pub filter: ShadowFilter,
    /// The map resolution.
    pub resolution: ShadowResolution,
    /// The near plane of the shadow cameras.
    pub near_plane: f32,
    /// The far plane of directional cascades.
    pub far_plane: f32,
    /// Constant depth bias.
    pub bias: f32,
    /// Bias along the surface normal.
    pub normal_bias: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            depth: ShadowDepth::InvZ,
            filter: ShadowFilter::Pcf,
            resolution: ShadowResolution::Medium,
            near_plane: 0.2,
            far_plane: 550.0,
            bias: 0.00115,
            normal_bias: 0.015,
        }
    }
}

/// The shape-specific parameters of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightShape {
    /// A sun-like light shining down its local `-Z` axis.
    Directional {
        /// Blend between uniform (0) and logarithmic (1) cascade splits.
        split_distribution: f32,
        /// Number of shadow cascades, between 1 and 4.
        num_splits: u32,
        /// Snaps cascades to texel increments to avoid shimmering.
        stabilize: bool,
    },
    /// An omnidirectional light.
    Point {
        /// The radius of influence.
        range: f32,
        /// The attenuation exponent.
        exponent_falloff: f32,
    },
    /// A cone of light along the local `-Z` axis.
    Spot {
        /// The reach of the light.
        range: f32,
        /// The full outer cone angle in degrees.
        outer_angle: f32,
        /// The full inner (unattenuated) cone angle in degrees.
        inner_angle: f32,
    },
}

/// A light source.
///
/// # Examples
///
/// ```
/// use umbra_core::renderer::light::{Light, LightKind};
///
/// let lamp = Light::point(10.0);
/// assert_eq!(lamp.kind(), LightKind::Point);
/// assert!(lamp.local_bounds().is_some());
/// assert!(Light::directional().local_bounds().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// The shape parameters.
    pub shape: LightShape,
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Whether the light renders and samples a shadow map.
    pub casts_shadows: bool,
    /// Shadow generation parameters.
    pub shadow: ShadowParams,
}

impl Light {
    /// Creates a light of the given shape with default color and shadows.
    pub fn new(shape: LightShape) -> Self {
        Self {
            shape,
            color: Vec3::ONE,
            intensity: 1.0,
            casts_shadows: true,
            shadow: ShadowParams::default(),
        }
    }

    /// A directional light with four stabilized cascades.
    pub fn directional() -> Self {
        Self::new(LightShape::Directional {
            split_distribution: 0.8,
            num_splits: 4,
            stabilize: true,
        })
    }

    /// A point light with the given range.
    pub fn point(range: f32) -> Self {
        Self::new(LightShape::Point {
            range,
            exponent_falloff: 1.0,
        })
    }

    /// A spot light with the given range and a 60/30 degree cone.
    pub fn spot(range: f32) -> Self {
        Self::new(LightShape::Spot {
            range,
            outer_angle: 60.0,
            inner_angle: 30.0,
        })
    }

    /// The kind of the light.
    pub fn kind(&self) -> LightKind {
        match self.shape {
            LightShape::Directional { .. } => LightKind::Directional,
            LightShape::Point { .. } => LightKind::Point,
            LightShape::Spot { .. } => LightKind::Spot,
        }
    }

    /// The reach of the light, or `None` for directional lights.
    pub fn range(&self) -> Option<f32> {
        match self.shape {
            LightShape::Directional { .. } => None,
            LightShape::Point { range, .. } | LightShape::Spot { range, .. } => Some(range),
        }
    }

    /// The light-space box enclosing the light's influence, or `None` when
    /// the influence is unbounded.
    pub fn local_bounds(&self) -> Option<Aabb> {
        match self.shape {
            LightShape::Directional { .. } => None,
            LightShape::Point { range, .. } => Some(Aabb::from_sphere(Vec3::ZERO, range)),
            LightShape::Spot {
                range, outer_angle, ..
            } => {
                let radius = range * degrees_to_radians(outer_angle * 0.5).tan();
                Some(Aabb::from_min_max(
                    Vec3::new(-radius, -radius, -range),
                    Vec3::new(radius, radius, 0.0),
                ))
            }
        }
    }

    /// Whether the shadow map depends on the viewing camera.
    pub fn is_camera_dependent(&self) -> bool {
        self.kind() == LightKind::Directional
    }
}

/// The analytic sky model used by the atmospherics stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyModel {
    /// The engine's default single-scattering sky.
    Standard,
    /// The Perez all-weather sky model.
    Perez,
}

/// Parameters of the sky composited by the atmospherics stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skylight {
    /// The sky model.
    pub model: SkyModel,
    /// Atmospheric turbidity, between 1.9 and 10.
    pub turbidity: f32,
}

impl Skylight {
    /// Lowest supported turbidity.
    pub const MIN_TURBIDITY: f32 = 1.9;
    /// Highest supported turbidity.
    pub const MAX_TURBIDITY: f32 = 10.0;

    /// Creates a skylight, clamping turbidity into the supported range.
    pub fn new(model: SkyModel, turbidity: f32) -> Self {
        Self {
            model,
            turbidity: turbidity.clamp(Self::MIN_TURBIDITY, Self::MAX_TURBIDITY),
        }
    }
}

impl Default for Skylight {
    fn default() -> Self {
        Self::new(SkyModel::Standard, Self::MIN_TURBIDITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spot_bounds_follow_cone() {
        let bounds = Light::spot(10.0).local_bounds().unwrap();
        let radius = 10.0 * (30.0_f32.to_radians()).tan();
        assert_relative_eq!(bounds.max.x, radius, epsilon = 1e-5);
        assert_relative_eq!(bounds.min.z, -10.0);
        assert_relative_eq!(bounds.max.z, 0.0);
    }

    #[test]
    fn test_only_directional_is_camera_dependent() {
        assert!(Light::directional().is_camera_dependent());
        assert!(!Light::point(3.0).is_camera_dependent());
        assert_eq!(Light::directional().range(), None);
    }

    #[test]
    fn test_skylight_turbidity_is_clamped() {
        assert_eq!(Skylight::new(SkyModel::Perez, 50.0).turbidity, 10.0);
        assert_eq!(Skylight::new(SkyModel::Perez, 0.0).turbidity, 1.9);
    }
}
