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

//! Screen-size driven LOD selection with single-flight cross-fades.
//!
//! Each (entity, view) pair carries a [`LodState`]. Every frame the selector
//! measures how tall the entity's bounds are on screen, picks the LOD whose
//! range contains that size and, if the entity is not already fading between
//! two levels, starts a fade towards it. A new target is only latched once
//! the previous fade has completed.

use ahash::AHashMap;
use umbra_core::ecs::entity::EntityId;
use umbra_core::math::Mat4;
use umbra_core::renderer::{Mesh, RenderCamera};
use umbra_data::LodLimits;

/// Entities smaller than this share of the viewport height are not drawn.
pub const MIN_SCREEN_PERCENT: f32 = 1.0;

/// The LOD state of one entity as seen from one view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LodState {
    /// The LOD currently drawn at full weight once settled.
    pub current_lod_index: usize,
    /// The LOD being faded in. Equal to `current_lod_index` when settled.
    pub target_lod_index: usize,
    /// Seconds spent in the current fade.
    pub current_time: f32,
}

/// The weights with which the two LODs of a [`LodState`] are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodFade {
    /// Weight of the current LOD.
    pub current_weight: f32,
    /// Weight of the target LOD, present only while fading.
    pub target_weight: Option<f32>,
}

impl LodState {
    /// Whether no fade is in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current_lod_index == self.target_lod_index
    }

    /// The draw weights for a fade lasting `transition_time` seconds.
    pub fn fade(&self, transition_time: f32) -> LodFade {
        if transition_time <= 0.0 || self.current_time == 0.0 {
            return LodFade {
                current_weight: 1.0,
                target_weight: None,
            };
        }
        let t = (self.current_time / transition_time).clamp(0.0, 1.0);
        LodFade {
            current_weight: 1.0 - t,
            target_weight: Some(t),
        }
    }
}

/// LOD states of the entities seen through one view, keyed by entity.
///
/// Entries are created on first evaluation and live until the owner removes
/// them; despawned entities are not evicted on their own.
#[derive(Debug, Clone, Default)]
pub struct LodTable {
    states: AHashMap<EntityId, LodState>,
}

impl LodTable {
    /// The state of `entity`, created settled on LOD 0 if missing.
    pub fn entry(&mut self, entity: EntityId) -> &mut LodState {
        self.states.entry(entity).or_default()
    }

    /// The state of `entity`, if it was ever evaluated.
    pub fn get(&self, entity: EntityId) -> Option<&LodState> {
        self.states.get(&entity)
    }

    /// Forgets the state of `entity`.
    pub fn remove(&mut self, entity: EntityId) -> Option<LodState> {
        self.states.remove(&entity)
    }

    /// Keeps only the entities for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) {
        self.states.retain(|entity, _| keep(*entity));
    }

    /// Forgets every state.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no entity is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// The height of `world_bounds` on screen, in percent of the viewport
/// height, clamped to `[0, 100]`.
pub fn screen_percent(camera: &RenderCamera, world_bounds: &umbra_core::math::Aabb) -> f32 {
    if camera.viewport.height == 0 {
        return 0.0;
    }
    let rect = camera.screen_rect(world_bounds);
    (rect.height / camera.viewport.height as f32 * 100.0).clamp(0.0, 100.0)
}

/// The LOD index for an on-screen size: the last range containing the
/// truncated percentage, clamped to the available LODs.
pub fn select_lod_index(limits: &LodLimits, percent: f32, lod_count: usize) -> usize {
    let value = percent as u32;
    let selected = limits
        .ranges()
        .iter()
        .enumerate()
        .filter(|(_, range)| range.contains(value))
        .map(|(index, _)| index)
        .last()
        .unwrap_or(0);
    selected.min(lod_count.saturating_sub(1))
}

/// Advances a fade by `dt` towards `selected`.
///
/// A new target is only accepted when the state is settled; a fade snaps to
/// its target once it has lasted `transition_time`.
pub fn advance_lod(state: &mut LodState, selected: usize, transition_time: f32, dt: f32) {
    if state.is_settled() {
        state.target_lod_index = selected;
    }
    if !state.is_settled() {
        state.current_time += dt;
    }
    if state.current_time >= transition_time {
        state.current_lod_index = state.target_lod_index;
        state.current_time = 0.0;
    }
}

/// Updates the LOD state of an entity for this frame and returns whether the
/// entity should be drawn.
///
/// Returns `false` when the mesh is missing or not loaded, and when the
/// entity covers less than [`MIN_SCREEN_PERCENT`] of the viewport height (the
/// state is still updated in that case).
#[allow(clippy::too_many_arguments)]
pub fn update_lod(
    state: &mut LodState,
    limits: &LodLimits,
    lod_count: usize,
    transition_time: f32,
    dt: f32,
    mesh: Option<&Mesh>,
    world: &Mat4,
    camera: &RenderCamera,
) -> bool {
    let Some(mesh) = mesh else {
        return false;
    };
    if lod_count <= 1 {
        return true;
    }

    let percent = screen_percent(camera, &mesh.bounds.transform(world));
    let selected = select_lod_index(limits, percent, lod_count);
    advance_lod(state, selected, transition_time, dt);

    percent >= MIN_SCREEN_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use umbra_core::math::{Aabb, Extent2D, Vec3};
    use umbra_data::LodRange;

    fn limits() -> LodLimits {
        LodLimits::from_ranges(vec![
            LodRange::new(80, 100),
            LodRange::new(40, 80),
            LodRange::new(0, 40),
        ])
    }

    fn camera() -> RenderCamera {
        RenderCamera::look_at(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            0.1,
            1000.0,
            Extent2D::new(1000, 1000),
        )
    }

    #[test]
    fn test_select_last_matching_range() {
        assert_eq!(select_lod_index(&limits(), 55.0, 3), 1);
        assert_eq!(select_lod_index(&limits(), 5.0, 3), 2);
        assert_eq!(select_lod_index(&limits(), 100.0, 3), 0);
        // 80 lies in both the first and the second range.
        assert_eq!(select_lod_index(&limits(), 80.0, 3), 1);
    }

    #[test]
    fn test_selection_is_clamped_to_lod_count() {
        assert_eq!(select_lod_index(&limits(), 5.0, 2), 1);
        assert_eq!(select_lod_index(&LodLimits::default(), 50.0, 3), 0);
    }

    #[test]
    fn test_selection_always_in_range() {
        let tables = [
            limits(),
            LodLimits::generate(1),
            LodLimits::generate(4),
            LodLimits::from_ranges(vec![LodRange::new(0, 10), LodRange::new(0, 100)]),
        ];
        for table in &tables {
            for lod_count in 1..6 {
                for p in 0..=100 {
                    let index = select_lod_index(table, p as f32, lod_count);
                    assert!(index < lod_count);
                }
            }
        }
    }

    #[test]
    fn test_fade_timeline_snaps_exactly() {
        let mut state = LodState {
            current_lod_index: 0,
            target_lod_index: 0,
            current_time: 0.0,
        };
        let mut times = Vec::new();
        for _ in 0..4 {
            advance_lod(&mut state, 1, 1.0, 0.3);
            times.push(state.current_time);
        }
        assert_relative_eq!(times[0], 0.3, epsilon = 1e-6);
        assert_relative_eq!(times[1], 0.6, epsilon = 1e-6);
        assert_relative_eq!(times[2], 0.9, epsilon = 1e-6);
        assert_eq!(times[3], 0.0);
        assert_eq!(state.current_lod_index, 1);
        assert!(state.is_settled());
    }

    #[test]
    fn test_fade_time_is_monotonic_until_snap() {
        let mut state = LodState::default();
        let mut last = 0.0;
        for _ in 0..20 {
            advance_lod(&mut state, 2, 1.0, 0.07);
            if state.is_settled() {
                break;
            }
            assert!(state.current_time >= last);
            assert!(state.current_time <= 1.0);
            last = state.current_time;
        }
        assert_eq!(state.current_lod_index, 2);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn test_single_flight_ignores_new_target_mid_fade() {
        let mut state = LodState {
            current_lod_index: 2,
            target_lod_index: 2,
            current_time: 0.0,
        };
        advance_lod(&mut state, 0, 1.0, 0.1);
        assert_eq!(state.target_lod_index, 0);
        advance_lod(&mut state, 1, 1.0, 0.1);
        assert_eq!(state.target_lod_index, 0);
        assert_eq!(state.current_lod_index, 2);
    }

    #[test]
    fn test_zero_transition_switches_immediately() {
        let mut state = LodState::default();
        advance_lod(&mut state, 2, 0.0, 0.016);
        assert_eq!(state.current_lod_index, 2);
        assert_eq!(state.fade(0.0).target_weight, None);
    }

    #[test]
    fn test_fade_weights() {
        let state = LodState {
            current_lod_index: 0,
            target_lod_index: 1,
            current_time: 0.25,
        };
        let fade = state.fade(1.0);
        assert_relative_eq!(fade.current_weight, 0.75);
        assert_eq!(fade.target_weight, Some(0.25));
        assert_eq!(LodState::default().fade(1.0).target_weight, None);
    }

    #[test]
    fn test_update_rejects_missing_mesh_and_tiny_entities() {
        let cam = camera();
        let mut state = LodState::default();
        assert!(!update_lod(&mut state, &limits(), 3, 1.0, 0.1, None, &Mat4::IDENTITY, &cam));

        // Half-height 0.01 at depth 100 covers 0.01% of the viewport.
        let tiny = Mesh::new(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.01)), 12);
        let far = Mat4::from_translation(Vec3::new(0.0, 0.0, -100.0));
        assert!(!update_lod(&mut state, &limits(), 3, 1.0, 0.1, Some(&tiny), &far, &cam));
        assert_eq!(state.target_lod_index, 2);
    }

    #[test]
    fn test_update_single_lod_always_draws() {
        let cam = camera();
        let mut state = LodState::default();
        let tiny = Mesh::new(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.01)), 12);
        let far = Mat4::from_translation(Vec3::new(0.0, 0.0, -100.0));
        assert!(update_lod(&mut state, &limits(), 1, 1.0, 0.1, Some(&tiny), &far, &cam));
        assert_eq!(state, LodState::default());
    }

    #[test]
    fn test_update_picks_lod_from_screen_height() {
        let cam = camera();
        let mut state = LodState::default();
        // Half-height 5 at depth 10 covers 50% of the viewport height.
        let mesh = Mesh::new(
            Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(1.0, 5.0, 0.0)),
            12,
        );
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        assert!(update_lod(&mut state, &limits(), 3, 0.0, 0.1, Some(&mesh), &world, &cam));
        assert_eq!(state.current_lod_index, 1);
    }
}
