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

//! Internal entity storage and ID management.

use umbra_core::ecs::entity::EntityId;
use umbra_core::renderer::{Light, ReflectionProbe, Skylight};

use crate::components::{ModelComponent, Transform};

/// The facets attached to one live entity.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityRecord {
    pub(crate) transform: Option<Transform>,
    pub(crate) model: Option<ModelComponent>,
    pub(crate) light: Option<Light>,
    pub(crate) probe: Option<ReflectionProbe>,
    pub(crate) skylight: Option<Skylight>,
}

/// Slot storage with index recycling.
///
/// Slots are never reordered, so iterating them yields entities in a stable
/// order from frame to frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityStore {
    /// Every slot ever created, with the current handle and the record if alive.
    pub(crate) entities: Vec<(EntityId, Option<EntityRecord>)>,
    /// Indices available for reuse.
    pub(crate) freed_entities: Vec<u32>,
}

impl EntityStore {
    /// Allocates a new or recycled `EntityId`.
    pub(crate) fn create_entity(&mut self) -> EntityId {
        if let Some(index) = self.freed_entities.pop() {
            let (id_slot, record) = &mut self.entities[index as usize];
            id_slot.generation += 1;
            *record = Some(EntityRecord::default());
            *id_slot
        } else {
            let new_id = EntityId::new(self.entities.len() as u32, 0);
            self.entities.push((new_id, Some(EntityRecord::default())));
            new_id
        }
    }

    /// Frees the slot of a live entity. Returns `false` for stale handles.
    pub(crate) fn remove_entity(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(id.index as usize) {
            Some((slot_id, record)) if *slot_id == id && record.is_some() => {
                *record = None;
                self.freed_entities.push(id.index);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities
            .get(id.index as usize)
            .and_then(|(slot_id, record)| {
                if *slot_id == id {
                    record.as_ref()
                } else {
                    None
                }
            })
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities
            .get_mut(id.index as usize)
            .and_then(|(slot_id, record)| {
                if *slot_id == id {
                    record.as_mut()
                } else {
                    None
                }
            })
    }

    /// Live entities in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.entities
            .iter()
            .filter_map(|(id, record)| record.as_ref().map(|r| (*id, r)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityRecord> {
        self.entities
            .iter_mut()
            .filter_map(|(_, record)| record.as_mut())
    }
}
