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

//! The scene store read by the frame pipeline.

mod entity_store;

use self::entity_store::{EntityRecord, EntityStore};
use crate::components::{ModelComponent, Transform};
use umbra_core::ecs::entity::EntityId;
use umbra_core::math::Mat4;
use umbra_core::renderer::{Light, ReflectionProbe, Skylight};

/// A flat collection of entities and their render facets.
///
/// All iteration methods visit entities in slot order, which is stable
/// across frames as long as no entity is spawned or despawned. The pipeline
/// relies on this to produce deterministic visibility lists.
///
/// # Examples
///
/// ```
/// use umbra_core::math::Vec3;
/// use umbra_core::renderer::Light;
/// use umbra_data::{Scene, Transform};
///
/// let mut scene = Scene::new();
/// let lamp = scene.spawn();
/// scene.set_transform(lamp, Transform::from_translation(Vec3::Y));
/// scene.set_light(lamp, Light::point(5.0));
/// assert_eq!(scene.lights().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    store: EntityStore,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity with no facets.
    pub fn spawn(&mut self) -> EntityId {
        self.store.create_entity()
    }

    /// Destroys an entity. Returns `false` if the handle is stale.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let removed = self.store.remove_entity(id);
        if removed {
            log::trace!("Despawned entity {id:?}");
        }
        removed
    }

    /// Whether the handle refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.store.get(id).is_some()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.store.iter().count()
    }

    /// Whether the scene has no live entity.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attaches or replaces the transform. Returns `false` if the handle is stale.
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        self.with_record(id, |r| r.transform = Some(transform))
    }

    fn with_record(&mut self, id: EntityId, f: impl FnOnce(&mut EntityRecord)) -> bool {
        match self.store.get_mut(id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Moves an entity, marking its transform as touched.
    pub fn move_to(&mut self, id: EntityId, matrix: Mat4) -> bool {
        match self.store.get_mut(id) {
            Some(record) => {
                record
                    .transform
                    .get_or_insert_with(Transform::identity)
                    .set(matrix);
                true
            }
            None => false,
        }
    }

    /// Attaches or replaces the model.
    pub fn set_model(&mut self, id: EntityId, model: ModelComponent) -> bool {
        self.with_record(id, |r| r.model = Some(model))
    }

    /// Attaches or replaces the light.
    pub fn set_light(&mut self, id: EntityId, light: Light) -> bool {
        self.with_record(id, |r| r.light = Some(light))
    }

    /// Attaches or replaces the reflection probe.
    pub fn set_probe(&mut self, id: EntityId, probe: ReflectionProbe) -> bool {
        self.with_record(id, |r| r.probe = Some(probe))
    }

    /// Attaches or replaces the skylight.
    pub fn set_skylight(&mut self, id: EntityId, skylight: Skylight) -> bool {
        self.with_record(id, |r| r.skylight = Some(skylight))
    }

    /// The transform of an entity.
    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.store.get(id).and_then(|r| r.transform.as_ref())
    }

    /// The model of an entity.
    pub fn model(&self, id: EntityId) -> Option<&ModelComponent> {
        self.store.get(id).and_then(|r| r.model.as_ref())
    }

    /// Mutable access to the model of an entity.
    pub fn model_mut(&mut self, id: EntityId) -> Option<&mut ModelComponent> {
        self.store.get_mut(id).and_then(|r| r.model.as_mut())
    }

    /// The light of an entity.
    pub fn light(&self, id: EntityId) -> Option<&Light> {
        self.store.get(id).and_then(|r| r.light.as_ref())
    }

    /// The reflection probe of an entity.
    pub fn probe(&self, id: EntityId) -> Option<&ReflectionProbe> {
        self.store.get(id).and_then(|r| r.probe.as_ref())
    }

    /// Entities with both a transform and a model, in slot order.
    pub fn models(&self) -> impl Iterator<Item = (EntityId, &Transform, &ModelComponent)> {
        self.store
            .iter()
            .filter_map(|(id, r)| Some((id, r.transform.as_ref()?, r.model.as_ref()?)))
    }

    /// Entities with both a transform and a light, in slot order.
    pub fn lights(&self) -> impl Iterator<Item = (EntityId, &Transform, &Light)> {
        self.store
            .iter()
            .filter_map(|(id, r)| Some((id, r.transform.as_ref()?, r.light.as_ref()?)))
    }

    /// Entities with both a transform and a reflection probe, in slot order.
    pub fn probes(&self) -> impl Iterator<Item = (EntityId, &Transform, &ReflectionProbe)> {
        self.store
            .iter()
            .filter_map(|(id, r)| Some((id, r.transform.as_ref()?, r.probe.as_ref()?)))
    }

    /// Entities with both a transform and a skylight, in slot order, with the
    /// light sharing the entity if any. A directional light there is the sun.
    pub fn skylights(
        &self,
    ) -> impl Iterator<Item = (EntityId, &Transform, &Skylight, Option<&Light>)> {
        self.store.iter().filter_map(|(id, r)| {
            Some((
                id,
                r.transform.as_ref()?,
                r.skylight.as_ref()?,
                r.light.as_ref(),
            ))
        })
    }

    /// Clears the change markers of every transform and model.
    ///
    /// The frame driver calls this once all views of a frame have rendered.
    pub fn clear_touched(&mut self) {
        for record in self.store.iter_mut() {
            if let Some(transform) = record.transform.as_mut() {
                transform.clear_touched();
            }
            if let Some(model) = record.model.as_mut() {
                model.clear_touched();
            }
        }
    }
}
