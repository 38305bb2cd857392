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

//! Provides geometric primitive shapes for spatial calculations.
//!
//! This module contains the bounding volumes used by visibility culling, the
//! rebuild coordinators' influence tests and LOD screen-size estimation.

use super::{Extent2D, Mat4, Vec3};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by its
/// minimum and maximum corner points. Meshes, lights and probes expose their
/// influence as a local-space `Aabb`; paired with a world matrix it describes an
/// oriented box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// Merging any valid `Aabb` with `INVALID` will result in that valid `Aabb`.
    pub const INVALID: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(min_pt: Vec3, max_pt: Vec3) -> Self {
        Self {
            min: min_pt.min(max_pt),
            max: min_pt.max(max_pt),
        }
    }

    /// Creates a new `Aabb` from a center point and its half-extents.
    ///
    /// The provided `half_extents` will be made non-negative.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates the smallest `Aabb` enclosing a sphere.
    #[inline]
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        Self::from_center_half_extents(center, Vec3::splat(radius))
    }

    /// Returns the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents of the box.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the full size of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Returns the radius of the sphere that encloses the box.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents().length()
    }

    /// Returns the eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Calculates the world-space `Aabb` of this box after applying `matrix`.
    ///
    /// Uses Arvo's method: each column of the linear part contributes its
    /// minimum and maximum projection independently, which is exact for the
    /// enclosing box and avoids transforming all eight corners.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let translation = matrix.w_axis.truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        let columns = [
            matrix.x_axis.truncate(),
            matrix.y_axis.truncate(),
            matrix.z_axis.truncate(),
        ];
        for (axis, column) in columns.iter().enumerate() {
            let e = *column * self.min[axis];
            let f = *column * self.max[axis];
            new_min += e.min(f);
            new_max += e.max(f);
        }

        Self {
            min: new_min,
            max: new_max,
        }
    }

    /// Checks if this `Aabb` intersects with another `Aabb`.
    ///
    /// Boxes that only touch at the boundary are considered intersecting.
    #[inline]
    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Checks if this `Aabb` intersects a sphere.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Checks if a point is contained within the bounds of this `Aabb`, inclusive.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Creates a new `Aabb` that encompasses both this box and another one.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }
}

/// A rectangle in viewport pixel coordinates, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ScreenRect {
    /// Creates a rectangle from two corners, in any order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
        let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Returns a rectangle covering a whole viewport.
    pub fn full(viewport: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: viewport.width as f32,
            height: viewport.height as f32,
        }
    }

    /// Returns the intersection of this rectangle with a viewport.
    pub fn clamped_to(&self, viewport: Extent2D) -> Self {
        let x0 = self.x.clamp(0.0, viewport.width as f32);
        let y0 = self.y.clamp(0.0, viewport.height as f32);
        let x1 = (self.x + self.width).clamp(0.0, viewport.width as f32);
        let y1 = (self.y + self.height).clamp(0.0, viewport.height as f32);
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Returns the area of the rectangle.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Quat;

    #[test]
    fn test_transform_translation_and_scale() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 1.0),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let t = aabb.transform(&m);
        assert_eq!(t.min, Vec3::new(8.0, -1.0, -1.0));
        assert_eq!(t.max, Vec3::new(12.0, 1.0, 1.0));
    }

    #[test]
    fn test_transform_rotation_grows_box() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let t = aabb.transform(&m);
        assert_relative_eq!(t.max.x, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(t.max.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_intersections() {
        let a = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_min_max(Vec3::splat(1.0), Vec3::splat(2.0));
        let c = Aabb::from_min_max(Vec3::splat(3.0), Vec3::splat(4.0));
        assert!(a.intersects_aabb(&b));
        assert!(!a.intersects_aabb(&c));
        assert!(a.intersects_sphere(Vec3::new(2.0, 0.5, 0.5), 1.0));
        assert!(!a.intersects_sphere(Vec3::new(3.0, 0.5, 0.5), 1.0));
    }

    #[test]
    fn test_merge_with_invalid() {
        let a = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert!(!Aabb::INVALID.is_valid());
        assert_eq!(Aabb::INVALID.merge(&a), a);
    }

    #[test]
    fn test_screen_rect_clamping() {
        let r = ScreenRect::from_corners((-10.0, 20.0), (50.0, 200.0));
        let c = r.clamped_to(Extent2D::new(40, 100));
        assert_eq!(c, ScreenRect { x: 0.0, y: 20.0, width: 40.0, height: 80.0 });
        assert!(ScreenRect::from_corners((5.0, 5.0), (5.0, 9.0)).is_empty());
    }
}
