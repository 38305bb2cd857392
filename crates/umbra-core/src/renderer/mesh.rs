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

//! Mesh and material assets as seen by the pipeline.
//!
//! Vertex data lives on the backend side, addressed by the asset id; the
//! pipeline only needs the bounds and the triangle counts.

use crate::asset::Asset;
use crate::math::Aabb;

/// A mesh asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Local-space bounds of all vertices.
    pub bounds: Aabb,
    /// Total number of triangles over all submeshes.
    pub triangle_count: u32,
    /// Number of submeshes, each drawn with its own material.
    pub submesh_count: u32,
}

impl Mesh {
    /// Creates a single-submesh mesh.
    pub fn new(bounds: Aabb, triangle_count: u32) -> Self {
        Self {
            bounds,
            triangle_count,
            submesh_count: 1,
        }
    }

    /// Returns `true` if the mesh has nothing to rasterize.
    pub fn is_degenerate(&self) -> bool {
        self.triangle_count == 0
    }
}

impl Asset for Mesh {}

/// A material asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    /// The name of the material.
    pub name: String,
    /// Whether the material is drawn with alpha-tested geometry programs.
    pub alpha_test: bool,
}

impl Asset for Material {}
