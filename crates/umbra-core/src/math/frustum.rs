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

//! View frustum representation and culling tests.

use super::{Aabb, Mat4, Vec3, Vec4};

/// A plane in Hessian normal form: `dot(normal, p) + distance = 0`.
///
/// Points with a positive signed distance lie on the inner side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The unit normal, pointing into the frustum.
    pub normal: Vec3,
    /// The signed distance term.
    pub distance: f32,
}

impl Plane {
    /// Builds a normalized plane from raw `(a, b, c, d)` coefficients.
    fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let length = normal.length();
        if length > 0.0 {
            Self {
                normal: normal / length,
                distance: v.w / length,
            }
        } else {
            Self {
                normal,
                distance: v.w,
            }
        }
    }

    /// Returns the signed distance from the plane to a point.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// The six clipping planes of a camera: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Planes with normals pointing inwards.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum planes from a combined view-projection matrix
    /// (Gribb-Hartmann), assuming the `[0, 1]` clip-space depth range used by
    /// `glam`'s `*_rh` projections.
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);
        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Conservative test of a world-space box against the frustum.
    pub fn test_aabb(&self, aabb: &Aabb) -> bool {
        self.test_obb(aabb, &Mat4::IDENTITY)
    }

    /// Conservative test of an oriented box, given as a local-space box and
    /// the matrix placing it in the world.
    ///
    /// Returns `false` only when the box lies entirely outside one plane.
    pub fn test_obb(&self, local: &Aabb, world: &Mat4) -> bool {
        let center = world.transform_point3(local.center());
        let half = local.half_extents();
        let axes = [
            world.x_axis.truncate() * half.x,
            world.y_axis.truncate() * half.y,
            world.z_axis.truncate() * half.z,
        ];
        self.planes.iter().all(|plane| {
            let radius = axes.iter().map(|axis| plane.normal.dot(*axis).abs()).sum::<f32>();
            plane.signed_distance(center) >= -radius
        })
    }

    /// Tests a sphere against the frustum.
    pub fn test_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}
