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

//! Cameras as seen by the pipeline: matrices, a viewport and the derived
//! frustum, plus the projections used by culling and LOD selection.

use crate::math::{Aabb, Extent2D, Frustum, Mat4, ScreenRect, Vec3, Vec4};

/// The projection model of a [`RenderCamera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// A perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
    },
    /// An orthographic projection.
    Orthographic {
        /// Half of the view volume width.
        half_width: f32,
        /// Half of the view volume height.
        half_height: f32,
    },
}

/// One of the six faces of a cube map, in the conventional layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX,
    /// -X
    NegativeX,
    /// +Y
    PositiveY,
    /// -Y
    NegativeY,
    /// +Z
    PositiveZ,
    /// -Z
    NegativeZ,
}

impl CubeFace {
    /// All faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// The cube map layer of this face.
    pub fn layer(self) -> u32 {
        self as u32
    }

    /// The view direction and up vector of the face.
    pub fn basis(self) -> (Vec3, Vec3) {
        match self {
            CubeFace::PositiveX => (Vec3::X, Vec3::NEG_Y),
            CubeFace::NegativeX => (Vec3::NEG_X, Vec3::NEG_Y),
            CubeFace::PositiveY => (Vec3::Y, Vec3::Z),
            CubeFace::NegativeY => (Vec3::NEG_Y, Vec3::NEG_Z),
            CubeFace::PositiveZ => (Vec3::Z, Vec3::NEG_Y),
            CubeFace::NegativeZ => (Vec3::NEG_Z, Vec3::NEG_Y),
        }
    }
}

/// The view from which a frame, shadow map or probe face is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCamera {
    /// The world-to-view matrix.
    pub view: Mat4,
    /// The view-to-clip matrix.
    pub projection: Mat4,
    /// The projection model `projection` was built from.
    pub kind: Projection,
    /// The camera position in world space.
    pub position: Vec3,
    /// Distance to the near plane.
    pub near: f32,
    /// Distance to the far plane.
    pub far: f32,
    /// The size of the target in pixels.
    pub viewport: Extent2D,
}

impl RenderCamera {
    /// Creates a perspective camera placed by the `world` transform, looking
    /// down its local `-Z` axis.
    pub fn perspective(world: &Mat4, fov_y: f32, near: f32, far: f32, viewport: Extent2D) -> Self {
        Self {
            view: world.inverse(),
            projection: Mat4::perspective_rh(fov_y, viewport.aspect_ratio(), near, far),
            kind: Projection::Perspective { fov_y },
            position: world.w_axis.truncate(),
            near,
            far,
            viewport,
        }
    }

    /// Creates an orthographic camera placed by the `world` transform.
    pub fn orthographic(
        world: &Mat4,
        half_width: f32,
        half_height: f32,
        near: f32,
        far: f32,
        viewport: Extent2D,
    ) -> Self {
        Self {
            view: world.inverse(),
            projection: Mat4::orthographic_rh(
                -half_width,
                half_width,
                -half_height,
                half_height,
                near,
                far,
            ),
            kind: Projection::Orthographic {
                half_width,
                half_height,
            },
            position: world.w_axis.truncate(),
            near,
            far,
            viewport,
        }
    }

    /// Creates a perspective camera at `eye` looking at `target`.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        near: f32,
        far: f32,
        viewport: Extent2D,
    ) -> Self {
        let world = Mat4::look_at_rh(eye, target, up).inverse();
        Self::perspective(&world, fov_y, near, far, viewport)
    }

    /// Creates the 90 degree camera rendering one face of a cube map centered at `position`.
    pub fn cube_face(face: CubeFace, position: Vec3, near: f32, far: f32, size: u32) -> Self {
        let (forward, up) = face.basis();
        let world = Mat4::look_at_rh(position, position + forward, up).inverse();
        Self::perspective(
            &world,
            std::f32::consts::FRAC_PI_2,
            near,
            far,
            Extent2D::square(size),
        )
    }

    /// Returns `projection * view`.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Returns the view-space to world-space matrix.
    #[inline]
    pub fn world(&self) -> Mat4 {
        self.view.inverse()
    }

    /// Returns the camera's frustum in world space.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// Tests an oriented box (local bounds placed by `world`) against the frustum.
    pub fn test_obb(&self, local: &Aabb, world: &Mat4) -> bool {
        self.frustum().test_obb(local, world)
    }

    /// Projects a world-space point to viewport pixels, or `None` if it lies
    /// behind the camera.
    pub fn project_to_screen(&self, point: Vec3) -> Option<(f32, f32)> {
        let clip = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some((
            (ndc_x * 0.5 + 0.5) * self.viewport.width as f32,
            (0.5 - ndc_y * 0.5) * self.viewport.height as f32,
        ))
    }

    /// Returns the screen rectangle covered by a world-space box.
    ///
    /// Boxes crossing the camera plane are treated as covering the whole
    /// viewport. The result is not clamped.
    pub fn screen_rect(&self, bounds: &Aabb) -> ScreenRect {
        let mut min = (f32::INFINITY, f32::INFINITY);
        let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in bounds.corners() {
            let Some((x, y)) = self.project_to_screen(corner) else {
                return ScreenRect::full(self.viewport);
            };
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        ScreenRect::from_corners(min, max)
    }

    /// Returns the clamped screen rectangle covered by a world-space sphere.
    pub fn projected_sphere_rect(&self, center: Vec3, radius: f32) -> ScreenRect {
        if self.position.distance(center) <= radius {
            return ScreenRect::full(self.viewport);
        }
        self.screen_rect(&Aabb::from_sphere(center, radius))
            .clamped_to(self.viewport)
    }

    /// Returns the eight world-space corners of the slice of the view volume
    /// between view distances `near` and `far` (near quad first).
    pub fn slice_corners(&self, near: f32, far: f32) -> [Vec3; 8] {
        let world = self.world();
        let (near_half, far_half) = match self.kind {
            Projection::Perspective { fov_y } => {
                let tan = (fov_y * 0.5).tan();
                let aspect = self.viewport.aspect_ratio();
                (
                    (near * tan * aspect, near * tan),
                    (far * tan * aspect, far * tan),
                )
            }
            Projection::Orthographic {
                half_width,
                half_height,
            } => ((half_width, half_height), (half_width, half_height)),
        };
        let mut corners = [Vec3::ZERO; 8];
        let quads = [(near, near_half), (far, far_half)];
        for (q, (depth, (hw, hh))) in quads.into_iter().enumerate() {
            let local = [
                Vec3::new(-hw, -hh, -depth),
                Vec3::new(hw, -hh, -depth),
                Vec3::new(hw, hh, -depth),
                Vec3::new(-hw, hh, -depth),
            ];
            for (i, p) in local.into_iter().enumerate() {
                corners[q * 4 + i] = world.transform_point3(p);
            }
        }
        corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> RenderCamera {
        RenderCamera::look_at(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            0.1,
            100.0,
            Extent2D::new(800, 800),
        )
    }

    #[test]
    fn test_center_projects_to_viewport_center() {
        let (x, y) = camera().project_to_screen(Vec3::new(0.0, 0.0, -5.0)).unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(y, 400.0, epsilon = 1e-3);
    }

    #[test]
    fn test_screen_rect_height_of_box() {
        // With a 90 degree fov the half-height of the view at depth 10 is 10 units.
        let bounds = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 5.0, 0.0));
        let rect = camera().screen_rect(&bounds);
        assert_relative_eq!(rect.height, 400.0, epsilon = 1e-2);
    }

    #[test]
    fn test_box_around_camera_covers_viewport() {
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let rect = camera().screen_rect(&bounds);
        assert_eq!(rect, ScreenRect::full(Extent2D::new(800, 800)));
    }

    #[test]
    fn test_cube_faces_look_along_axes() {
        let cam = RenderCamera::cube_face(CubeFace::PositiveX, Vec3::new(1.0, 2.0, 3.0), 0.1, 5.0, 256);
        assert_eq!(cam.viewport, Extent2D::square(256));
        let frustum = cam.frustum();
        assert!(frustum.test_sphere(Vec3::new(4.0, 2.0, 3.0), 0.1));
        assert!(!frustum.test_sphere(Vec3::new(-2.0, 2.0, 3.0), 0.1));
        assert!(!frustum.test_sphere(Vec3::new(9.0, 2.0, 3.0), 0.1));
    }

    #[test]
    fn test_slice_corners_span_requested_depths() {
        let corners = camera().slice_corners(1.0, 10.0);
        assert_relative_eq!(corners[0].z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corners[7].z, -10.0, epsilon = 1e-5);
        assert_relative_eq!(corners[5].x, 10.0, epsilon = 1e-4);
    }
}
