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

//! Incremental regeneration of shadow maps.
//!
//! A shadow map is regenerated only when it was never generated, when its
//! light moved, when a directional light's viewing camera moved, or when a
//! shadow caster that changed this frame lies inside the light's influence.
//! Lights outside the viewing frustum are left alone.

use super::{
    gather, FrameContext, FrameStats, GenerationStamp, RenderView, ViewId, VisibilityFilter,
    VisibilityQuery, SHADOW_MAP,
};
use ahash::AHashMap;
use umbra_core::ecs::entity::EntityId;
use umbra_core::math::{degrees_to_radians, Aabb, Extent2D, Mat4, Vec3};
use umbra_core::renderer::{
    BufferId, BufferKind, CubeFace, Light, LightShape, RenderBackend, RenderCamera, RenderError,
};
use umbra_data::Scene;

/// Depth added on both sides of a cascade so casters outside the viewing
/// frustum still land in the map.
const CASCADE_Z_PADDING: f32 = 100.0;

/// Renders the depth of shadow casters into a layered shadow map.
pub trait ShadowCasterRenderer {
    /// Renders one layer of `target` per camera in `cameras`.
    fn render_shadow_casters(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        light: &Light,
        cameras: &[RenderCamera],
        target: BufferId,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError>;
}

/// Identifies one cached shadow map.
///
/// Directional lights fit their cascades to the viewing camera, so they
/// keep one map per view; other lights share a single map between views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowKey {
    /// The light entity.
    pub light: EntityId,
    /// The view the map was fitted to, for camera-dependent lights.
    pub view: Option<ViewId>,
}

impl ShadowKey {
    /// The key under which `light` seen from `view` is cached.
    pub fn new(entity: EntityId, light: &Light, view: ViewId) -> Self {
        Self {
            light: entity,
            view: light.is_camera_dependent().then_some(view),
        }
    }
}

#[derive(Debug, Default)]
struct ShadowArtifact {
    stamp: GenerationStamp,
    view: RenderView,
    map: Option<BufferId>,
    cameras: Vec<RenderCamera>,
    generated_with: Option<Mat4>,
    generated_for: Option<Mat4>,
    rebuild_count: u64,
}

/// Owns every shadow map and decides which ones to regenerate.
#[derive(Debug, Default)]
pub struct ShadowRebuildCoordinator {
    artifacts: AHashMap<ShadowKey, ShadowArtifact>,
}

impl ShadowRebuildCoordinator {
    /// Creates a coordinator with no cached maps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the shadow maps relevant to `camera` up to date.
    ///
    /// Invalidation looks at every dirty shadow caster in the scene,
    /// whatever the view renders, since a map is shared with the views
    /// considering it later in the frame. Each map is considered at most
    /// once per frame.
    pub fn rebuild(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        camera: &RenderCamera,
        view: ViewId,
        renderer: &mut dyn ShadowCasterRenderer,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        self.release_stale(backend, ctx.scene);

        let frame = ctx.frame_index;
        let mut dirty: Option<Vec<Aabb>> = None;

        for (entity, transform, light) in ctx.scene.lights() {
            if !light.casts_shadows {
                continue;
            }
            let key = ShadowKey::new(entity, light, view);
            if self
                .artifacts
                .get(&key)
                .is_some_and(|artifact| artifact.stamp.is_current(frame))
            {
                continue;
            }

            let influence = light.local_bounds();
            if let Some(bounds) = &influence {
                if !camera.test_obb(bounds, transform.matrix()) {
                    continue;
                }
            }
            let artifact = self.artifacts.entry(key).or_default();
            artifact.stamp.mark(frame);

            let world = *transform.matrix();
            let viewer = camera.view_projection();
            let moved = artifact.generated_with != Some(world);
            let camera_moved = light.is_camera_dependent() && artifact.generated_for != Some(viewer);
            let invalidated = artifact.map.is_none()
                || moved
                || camera_moved
                || {
                    let dirty = dirty.get_or_insert_with(|| dirty_caster_bounds(ctx.scene));
                    match influence.map(|b| b.transform(&world)) {
                        Some(world_influence) => dirty.iter().any(|b| b.intersects_aabb(&world_influence)),
                        None => !dirty.is_empty(),
                    }
                };
            if !invalidated {
                log::trace!("Shadow map of {entity:?} is current");
                continue;
            }

            let cameras = shadow_cameras(light, &world, camera);
            let size = Extent2D::square(light.shadow.resolution.size());
            let map = artifact.view.get_or_create(
                backend,
                SHADOW_MAP,
                BufferKind::ShadowMap,
                size,
                cameras.len() as u32,
            )?;
            renderer.render_shadow_casters(backend, ctx, light, &cameras, map, stats)?;

            log::debug!(
                "Regenerated shadow map of {entity:?} ({} layer(s)) in frame {frame}",
                cameras.len()
            );
            artifact.map = Some(map);
            artifact.cameras = cameras;
            artifact.generated_with = Some(world);
            artifact.generated_for = Some(viewer);
            artifact.rebuild_count += 1;
            stats.shadow_rebuilds += 1;
        }
        Ok(())
    }

    /// The shadow map of `light` as seen from `view`, if one was generated.
    pub fn shadow_map(&self, entity: EntityId, light: &Light, view: ViewId) -> Option<BufferId> {
        self.artifacts
            .get(&ShadowKey::new(entity, light, view))
            .and_then(|artifact| artifact.map)
    }

    /// The cameras the shadow map of `light` was last rendered with.
    pub fn shadow_cameras(&self, entity: EntityId, light: &Light, view: ViewId) -> &[RenderCamera] {
        self.artifacts
            .get(&ShadowKey::new(entity, light, view))
            .map(|artifact| artifact.cameras.as_slice())
            .unwrap_or(&[])
    }

    /// How many times the shadow map of `light` seen from `view` was regenerated.
    pub fn rebuild_count(&self, entity: EntityId, light: &Light, view: ViewId) -> u64 {
        self.artifacts
            .get(&ShadowKey::new(entity, light, view))
            .map_or(0, |artifact| artifact.rebuild_count)
    }

    /// Number of cached maps.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether no map is cached.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Drops the maps of lights that were removed or stopped casting shadows.
    pub fn release_stale(&mut self, backend: &mut dyn RenderBackend, scene: &Scene) {
        self.artifacts.retain(|key, artifact| {
            let alive = scene.light(key.light).is_some_and(|light| light.casts_shadows);
            if !alive {
                artifact.view.release_all(backend);
            }
            alive
        });
    }

    /// Drops the maps fitted to a view that no longer exists.
    pub fn forget_view(&mut self, backend: &mut dyn RenderBackend, view: ViewId) {
        self.artifacts.retain(|key, artifact| {
            let keep = key.view != Some(view);
            if !keep {
                artifact.view.release_all(backend);
            }
            keep
        });
    }

    /// Drops every cached map.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        for (_, mut artifact) in self.artifacts.drain() {
            artifact.view.release_all(backend);
        }
    }
}

fn dirty_caster_bounds(scene: &Scene) -> Vec<Aabb> {
    let query = VisibilityQuery::new()
        .with(VisibilityFilter::Dirty)
        .with(VisibilityFilter::ShadowCaster);
    gather(scene, None, &query)
        .into_iter()
        .filter_map(|entity| {
            let transform = scene.transform(entity)?;
            scene.model(entity)?.world_bounds(transform.matrix())
        })
        .collect()
}

/// The cameras a light's shadow map is rendered from, one per layer.
pub fn shadow_cameras(light: &Light, world: &Mat4, viewer: &RenderCamera) -> Vec<RenderCamera> {
    let size = light.shadow.resolution.size();
    let position = world.w_axis.truncate();
    match light.shape {
        LightShape::Spot {
            range, outer_angle, ..
        } => vec![RenderCamera::perspective(
            world,
            degrees_to_radians(outer_angle),
            light.shadow.near_plane,
            range,
            Extent2D::square(size),
        )],
        LightShape::Point { range, .. } => CubeFace::ALL
            .iter()
            .map(|face| RenderCamera::cube_face(*face, position, light.shadow.near_plane, range, size))
            .collect(),
        LightShape::Directional {
            split_distribution,
            num_splits,
            stabilize,
        } => {
            let direction = (-world.z_axis.truncate()).try_normalize().unwrap_or(Vec3::NEG_Y);
            let near = viewer.near.max(0.01);
            let far = viewer.far.min(light.shadow.far_plane).max(near);
            let splits = cascade_splits(near, far, num_splits.clamp(1, 4), split_distribution);
            let mut previous = near;
            splits
                .into_iter()
                .map(|split| {
                    let corners = viewer.slice_corners(previous, split);
                    previous = split;
                    fit_cascade(&corners, direction, stabilize, size)
                })
                .collect()
        }
    }
}

/// Far distances of `count` cascades between `near` and `far`, blending a
/// logarithmic and a uniform distribution by `lambda`.
pub fn cascade_splits(near: f32, far: f32, count: u32, lambda: f32) -> Vec<f32> {
    let lambda = lambda.clamp(0.0, 1.0);
    (1..=count)
        .map(|i| {
            let p = i as f32 / count as f32;
            let log = near * (far / near).powf(p);
            let uniform = near + (far - near) * p;
            lambda * log + (1.0 - lambda) * uniform
        })
        .collect()
}

fn fit_cascade(corners: &[Vec3; 8], direction: Vec3, stabilize: bool, size: u32) -> RenderCamera {
    let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let light_rotation = Mat4::look_at_rh(Vec3::ZERO, direction, up);

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for corner in corners {
        let p = light_rotation.transform_point3(*corner);
        min = min.min(p);
        max = max.max(p);
    }

    let mut mid = (min + max) * 0.5;
    let (half_width, half_height) = if stabilize {
        let center = corners.iter().copied().sum::<Vec3>() / 8.0;
        let radius = corners
            .iter()
            .map(|c| c.distance(center))
            .fold(0.0_f32, f32::max)
            .max(f32::EPSILON);
        let texel = 2.0 * radius / size as f32;
        let center_ls = light_rotation.transform_point3(center);
        mid.x = (center_ls.x / texel).floor() * texel;
        mid.y = (center_ls.y / texel).floor() * texel;
        // Snapping moves the center by up to one texel.
        (radius + texel, radius + texel)
    } else {
        ((max.x - min.x) * 0.5, (max.y - min.y) * 0.5)
    };

    let eye = Vec3::new(mid.x, mid.y, max.z + CASCADE_Z_PADDING);
    let world = light_rotation.inverse() * Mat4::from_translation(eye);
    let depth = (max.z - min.z) + 2.0 * CASCADE_Z_PADDING;
    RenderCamera::orthographic(
        &world,
        half_width,
        half_height,
        0.0,
        depth,
        Extent2D::square(size),
    )
}
