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

//! Candidate gathering for a view.
//!
//! A [`VisibilityQuery`] is a conjunction of [`VisibilityFilter`]s. Every
//! entity with a transform and a model whose base mesh has loaded is tested
//! against the filters and, optionally, a frustum.

use umbra_core::ecs::entity::EntityId;
use umbra_core::math::Frustum;
use umbra_data::{ModelComponent, Scene, Transform};

/// A single condition an entity must satisfy to be gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityFilter {
    /// The model is flagged static.
    Static,
    /// The model is drawn into shadow maps.
    ShadowCaster,
    /// The model is drawn into reflection probes.
    ReflectionCaster,
    /// The transform or the model changed since the scene last cleared its
    /// change markers.
    Dirty,
}

impl VisibilityFilter {
    /// Whether an entity passes this filter.
    pub fn accepts(&self, transform: &Transform, model: &ModelComponent) -> bool {
        match self {
            VisibilityFilter::Static => model.is_static(),
            VisibilityFilter::ShadowCaster => model.casts_shadow(),
            VisibilityFilter::ReflectionCaster => model.casts_reflection(),
            VisibilityFilter::Dirty => transform.is_touched() || model.is_touched(),
        }
    }
}

/// A conjunction of filters. The empty query accepts every renderable entity.
///
/// # Examples
///
/// ```
/// use umbra_lanes::{VisibilityFilter, VisibilityQuery};
///
/// let query = VisibilityQuery::new()
///     .with(VisibilityFilter::Dirty)
///     .with(VisibilityFilter::ShadowCaster)
///     .with(VisibilityFilter::Dirty);
/// assert_eq!(query.filters().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityQuery {
    filters: Vec<VisibilityFilter>,
}

impl VisibilityQuery {
    /// The query accepting every renderable entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter. Adding a filter twice has no effect.
    pub fn with(mut self, filter: VisibilityFilter) -> Self {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
        self
    }

    /// Combines two queries.
    pub fn and(mut self, other: &VisibilityQuery) -> Self {
        for filter in &other.filters {
            self = self.with(*filter);
        }
        self
    }

    /// Whether the query holds `filter`.
    pub fn contains(&self, filter: VisibilityFilter) -> bool {
        self.filters.contains(&filter)
    }

    /// The filters of the query.
    pub fn filters(&self) -> &[VisibilityFilter] {
        &self.filters
    }

    /// Whether an entity passes every filter.
    pub fn matches(&self, transform: &Transform, model: &ModelComponent) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.accepts(transform, model))
    }
}

/// The ordered result of a gather.
pub type VisibilitySet = Vec<EntityId>;

/// Collects the entities matching `query` whose oriented bounds intersect
/// `frustum`, in scene order.
///
/// Entities whose base mesh is not loaded yet are left out silently.
pub fn gather(scene: &Scene, frustum: Option<&Frustum>, query: &VisibilityQuery) -> VisibilitySet {
    scene
        .models()
        .filter(|(_, transform, model)| query.matches(transform, model))
        .filter_map(|(entity, transform, model)| {
            let bounds = model.local_bounds()?;
            match frustum {
                Some(frustum) if !frustum.test_obb(&bounds, transform.matrix()) => None,
                _ => Some(entity),
            }
        })
        .collect()
}
