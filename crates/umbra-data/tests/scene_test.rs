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

use umbra_core::asset::AssetHandle;
use umbra_core::math::{Aabb, Mat4, Vec3};
use umbra_core::renderer::{Light, Mesh, ReflectionProbe, SkyModel, Skylight};
use umbra_data::{ModelComponent, Scene, Transform};

fn cube_model() -> ModelComponent {
    ModelComponent::new(vec![AssetHandle::new(Mesh::new(
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE),
        12,
    ))])
}

#[test]
fn test_iteration_follows_slot_order() {
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            let id = scene.spawn();
            scene.set_transform(id, Transform::from_translation(Vec3::X * i as f32));
            scene.set_model(id, cube_model());
            id
        })
        .collect();

    let seen: Vec<_> = scene.models().map(|(id, _, _)| id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn test_recycled_slot_rejects_stale_handle() {
    let mut scene = Scene::new();
    let first = scene.spawn();
    assert!(scene.despawn(first));
    assert!(!scene.despawn(first));

    let second = scene.spawn();
    assert_eq!(second.index, first.index);
    assert_ne!(second, first);
    assert!(!scene.set_light(first, Light::point(1.0)));
    assert!(scene.set_light(second, Light::point(1.0)));
    assert!(scene.light(first).is_none());
}

#[test]
fn test_facets_without_transform_are_not_iterated() {
    let mut scene = Scene::new();
    let probe = scene.spawn();
    scene.set_probe(probe, ReflectionProbe::sphere(5.0));
    assert_eq!(scene.probes().count(), 0);

    scene.set_transform(probe, Transform::identity());
    assert_eq!(scene.probes().count(), 1);
}

#[test]
fn test_clear_touched_resets_transforms_and_models() {
    let mut scene = Scene::new();
    let id = scene.spawn();
    scene.set_transform(id, Transform::identity());
    scene.set_model(id, cube_model());
    assert!(scene.transform(id).unwrap().is_touched());

    scene.clear_touched();
    assert!(!scene.transform(id).unwrap().is_touched());
    assert!(!scene.model(id).unwrap().is_touched());

    scene.move_to(id, Mat4::from_translation(Vec3::Z));
    assert!(scene.transform(id).unwrap().is_touched());
    assert!(!scene.model(id).unwrap().is_touched());
}

#[test]
fn test_skylight_reports_attached_light() {
    let mut scene = Scene::new();
    let sun = scene.spawn();
    scene.set_transform(sun, Transform::identity());
    scene.set_skylight(sun, Skylight::new(SkyModel::Perez, 3.0));
    scene.set_light(sun, Light::directional());

    let (id, _, sky, light) = scene.skylights().next().unwrap();
    assert_eq!(id, sun);
    assert_eq!(sky.model, SkyModel::Perez);
    assert!(light.is_some());
}
