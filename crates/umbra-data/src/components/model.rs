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

use serde::{Deserialize, Serialize};
use umbra_core::asset::AssetHandle;
use umbra_core::math::{Aabb, Mat4};
use umbra_core::renderer::{Material, Mesh};

/// An inclusive range of on-screen size, in percent of the viewport height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LodRange {
    /// The smallest size covered by the range.
    pub min: u32,
    /// The largest size covered by the range.
    pub max: u32,
}

impl LodRange {
    /// Creates a range. The bounds are reordered if needed.
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Whether `percent` lies inside the range, bounds included.
    #[inline]
    pub fn contains(&self, percent: u32) -> bool {
        self.min <= percent && percent <= self.max
    }
}

/// The screen-size ranges selecting each LOD of a model, one per LOD index.
///
/// Ranges may overlap: the LOD selector picks the last range containing the
/// measured size.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LodLimits(Vec<LodRange>);

impl LodLimits {
    /// Uses explicit ranges.
    pub fn from_ranges(ranges: Vec<LodRange>) -> Self {
        Self(ranges)
    }

    /// Builds the default table for `lod_count` levels.
    ///
    /// LOD 0 covers everything down to 10% of the viewport height, the
    /// remaining levels split the band below it evenly and the last one
    /// reaches 0.
    pub fn generate(lod_count: usize) -> Self {
        const UPPER: f32 = 100.0;
        const INITIAL: f32 = 0.1;

        let mut ranges = Vec::with_capacity(lod_count);
        if lod_count == 0 {
            return Self(ranges);
        }
        let step = INITIAL / lod_count as f32;
        let mut upper = UPPER as u32;
        for i in 0..lod_count {
            let lower = if i + 1 == lod_count {
                0
            } else {
                (UPPER * (INITIAL - i as f32 * step)) as u32
            };
            ranges.push(LodRange::new(lower, upper));
            upper = lower;
        }
        Self(ranges)
    }

    /// The ranges in LOD order.
    #[inline]
    pub fn ranges(&self) -> &[LodRange] {
        &self.0
    }

    /// Number of ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no ranges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A renderable model: a chain of LOD meshes with their materials and
/// render flags.
#[derive(Debug, Clone)]
pub struct ModelComponent {
    lods: Vec<AssetHandle<Mesh>>,
    materials: Vec<AssetHandle<Material>>,
    lod_limits: LodLimits,
    is_static: bool,
    casts_shadow: bool,
    casts_reflection: bool,
    touched: bool,
}

impl ModelComponent {
    /// Creates a dynamic model that casts shadows and reflections, with the
    /// default LOD limits for its LOD count.
    pub fn new(lods: Vec<AssetHandle<Mesh>>) -> Self {
        let lod_limits = LodLimits::generate(lods.len());
        Self {
            lods,
            materials: Vec::new(),
            lod_limits,
            is_static: false,
            casts_shadow: true,
            casts_reflection: true,
            touched: true,
        }
    }

    /// Sets the static flag.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Sets whether the model is drawn into shadow maps.
    pub fn with_shadow_casting(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Sets whether the model is drawn into reflection probes.
    pub fn with_reflection_casting(mut self, casts_reflection: bool) -> Self {
        self.casts_reflection = casts_reflection;
        self
    }

    /// Replaces the LOD limits.
    pub fn with_lod_limits(mut self, lod_limits: LodLimits) -> Self {
        self.lod_limits = lod_limits;
        self
    }

    /// Sets the per-submesh materials.
    pub fn with_materials(mut self, materials: Vec<AssetHandle<Material>>) -> Self {
        self.materials = materials;
        self
    }

    /// Replaces the LOD chain and regenerates the default limits.
    pub fn set_lods(&mut self, lods: Vec<AssetHandle<Mesh>>) {
        self.lod_limits = LodLimits::generate(lods.len());
        self.lods = lods;
        self.touched = true;
    }

    /// Replaces the LOD limits.
    pub fn set_lod_limits(&mut self, lod_limits: LodLimits) {
        self.lod_limits = lod_limits;
        self.touched = true;
    }

    /// The LOD mesh handles, most detailed first.
    #[inline]
    pub fn lods(&self) -> &[AssetHandle<Mesh>] {
        &self.lods
    }

    /// The number of LODs.
    #[inline]
    pub fn lod_count(&self) -> usize {
        self.lods.len()
    }

    /// The mesh at `index`, if it exists and has finished loading.
    pub fn lod_mesh(&self, index: usize) -> Option<&Mesh> {
        self.lods.get(index).and_then(AssetHandle::get)
    }

    /// The most detailed mesh, if it has finished loading.
    #[inline]
    pub fn base_mesh(&self) -> Option<&Mesh> {
        self.lod_mesh(0)
    }

    /// The first material, if it has finished loading.
    pub fn primary_material(&self) -> Option<&Material> {
        self.materials.first().and_then(AssetHandle::get)
    }

    /// The LOD selection ranges.
    #[inline]
    pub fn lod_limits(&self) -> &LodLimits {
        &self.lod_limits
    }

    /// Whether the model never moves.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the model is drawn into shadow maps.
    #[inline]
    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    /// Whether the model is drawn into reflection probes.
    #[inline]
    pub fn casts_reflection(&self) -> bool {
        self.casts_reflection
    }

    /// Local bounds of the base mesh, if loaded.
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.base_mesh().map(|mesh| mesh.bounds)
    }

    /// World bounds of the base mesh placed by `world`, if loaded.
    pub fn world_bounds(&self, world: &Mat4) -> Option<Aabb> {
        self.local_bounds().map(|bounds| bounds.transform(world))
    }

    /// Whether the model changed since the last [`clear_touched`](Self::clear_touched).
    #[inline]
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Clears the change marker.
    #[inline]
    pub fn clear_touched(&mut self) {
        self.touched = false;
    }
}
