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
use umbra_core::math::{Aabb, Extent2D, Mat4, Vec3};
use umbra_core::renderer::{
    BufferId, CaptureMethod, Light, Mesh, PipelineSettings, RecordingBackend, ReflectionProbe,
    RenderBackend, RenderCamera, RenderError, StageFlags,
};
use umbra_core::EntityId;
use umbra_data::{ModelComponent, Scene, Transform};
use umbra_lanes::{
    FrameContext, FrameStats, ProbeFaceRenderer, ProbeFaceRequest, ProgramLibrary,
    ReflectionRebuildCoordinator, RenderView, ShadowCasterRenderer, ShadowRebuildCoordinator,
};

#[derive(Default)]
struct CountingShadows {
    calls: usize,
    layers: usize,
}

impl ShadowCasterRenderer for CountingShadows {
    fn render_shadow_casters(
        &mut self,
        _backend: &mut dyn RenderBackend,
        _ctx: &FrameContext<'_>,
        _light: &Light,
        cameras: &[RenderCamera],
        _target: BufferId,
        _stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        self.calls += 1;
        self.layers += cameras.len();
        Ok(())
    }
}

#[derive(Default)]
struct CountingFaces {
    faces: usize,
    flags: Vec<StageFlags>,
}

impl ProbeFaceRenderer for CountingFaces {
    fn render_probe_face(
        &mut self,
        _backend: &mut dyn RenderBackend,
        _ctx: &FrameContext<'_>,
        request: &ProbeFaceRequest<'_>,
        _view: &mut RenderView,
        _stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        self.faces += 1;
        self.flags.push(request.flags);
        Ok(())
    }
}

struct Fixture {
    scene: Scene,
    settings: PipelineSettings,
    programs: ProgramLibrary,
    backend: RecordingBackend,
    camera: RenderCamera,
    view: RenderView,
    stats: FrameStats,
}

impl Fixture {
    fn new() -> Self {
        Self {
            scene: Scene::new(),
            settings: PipelineSettings::default(),
            programs: ProgramLibrary::default(),
            backend: RecordingBackend::new(),
            camera: RenderCamera::look_at(
                Vec3::ZERO,
                Vec3::NEG_Z,
                Vec3::Y,
                std::f32::consts::FRAC_PI_2,
                0.1,
                100.0,
                Extent2D::new(640, 480),
            ),
            view: RenderView::new(),
            stats: FrameStats::default(),
        }
    }

    fn spawn_caster(&mut self, position: Vec3) -> EntityId {
        let mesh = AssetHandle::new(Mesh::new(
            Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
            12,
        ));
        let id = self.scene.spawn();
        self.scene
            .set_transform(id, Transform::from_translation(position));
        self.scene.set_model(id, ModelComponent::new(vec![mesh]));
        id
    }

    fn spawn_light(&mut self, position: Vec3, light: Light) -> EntityId {
        let id = self.scene.spawn();
        self.scene
            .set_transform(id, Transform::from_translation(position));
        self.scene.set_light(id, light);
        id
    }

    fn spawn_probe(&mut self, position: Vec3, probe: ReflectionProbe) -> EntityId {
        let id = self.scene.spawn();
        self.scene
            .set_transform(id, Transform::from_translation(position));
        self.scene.set_probe(id, probe);
        id
    }

    fn shadows(
        &mut self,
        frame: u64,
        coordinator: &mut ShadowRebuildCoordinator,
        renderer: &mut CountingShadows,
    ) {
        let ctx = FrameContext {
            frame_index: frame,
            scene: &self.scene,
            settings: &self.settings,
            programs: &self.programs,
            dt: 1.0 / 60.0,
        };
        coordinator
            .rebuild(
                &mut self.backend,
                &ctx,
                &self.camera,
                self.view.id(),
                renderer,
                &mut self.stats,
            )
            .unwrap();
    }

    fn reflections(
        &mut self,
        frame: u64,
        coordinator: &mut ReflectionRebuildCoordinator,
        renderer: &mut CountingFaces,
    ) {
        let ctx = FrameContext {
            frame_index: frame,
            scene: &self.scene,
            settings: &self.settings,
            programs: &self.programs,
            dt: 1.0 / 60.0,
        };
        coordinator
            .rebuild(&mut self.backend, &ctx, &self.camera, renderer, &mut self.stats)
            .unwrap();
    }
}

#[test]
fn test_shadow_map_rebuilt_once_per_frame() {
    let mut fx = Fixture::new();
    let light = fx.spawn_light(Vec3::new(0.0, 0.0, -5.0), Light::point(3.0));
    fx.spawn_caster(Vec3::new(0.0, 0.0, -6.0));

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);
    fx.shadows(1, &mut coordinator, &mut renderer);

    assert_eq!(renderer.calls, 1);
    assert_eq!(renderer.layers, 6);
    let point = *fx.scene.light(light).unwrap();
    assert_eq!(coordinator.rebuild_count(light, &point, fx.view.id()), 1);
    assert!(coordinator.shadow_map(light, &point, fx.view.id()).is_some());
    assert_eq!(fx.stats.shadow_rebuilds, 1);
}

#[test]
fn test_shadow_map_follows_dirty_casters_in_range() {
    let mut fx = Fixture::new();
    fx.spawn_light(Vec3::new(0.0, 0.0, -5.0), Light::point(3.0));
    let near = fx.spawn_caster(Vec3::new(0.0, 0.0, -6.0));
    let far = fx.spawn_caster(Vec3::new(50.0, 0.0, -5.0));

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);
    fx.scene.clear_touched();

    fx.shadows(2, &mut coordinator, &mut renderer);
    assert_eq!(renderer.calls, 1, "nothing changed");

    fx.scene
        .move_to(far, Mat4::from_translation(Vec3::new(60.0, 0.0, -5.0)));
    fx.shadows(3, &mut coordinator, &mut renderer);
    assert_eq!(renderer.calls, 1, "the moved caster is out of range");
    fx.scene.clear_touched();

    fx.scene
        .move_to(near, Mat4::from_translation(Vec3::new(0.5, 0.0, -6.0)));
    fx.shadows(4, &mut coordinator, &mut renderer);
    assert_eq!(renderer.calls, 2);
}

#[test]
fn test_moving_the_light_invalidates_its_map() {
    let mut fx = Fixture::new();
    let light = fx.spawn_light(Vec3::new(0.0, 0.0, -5.0), Light::spot(10.0));

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);
    fx.scene.clear_touched();
    fx.scene
        .move_to(light, Mat4::from_translation(Vec3::new(1.0, 0.0, -5.0)));
    fx.shadows(2, &mut coordinator, &mut renderer);

    assert_eq!(renderer.calls, 2);
    assert_eq!(renderer.layers, 2);
}

#[test]
fn test_lights_outside_the_camera_are_left_alone() {
    let mut fx = Fixture::new();
    let light = fx.spawn_light(Vec3::new(0.0, 0.0, 50.0), Light::point(3.0));

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);

    assert_eq!(renderer.calls, 0);
    let point = *fx.scene.light(light).unwrap();
    assert!(coordinator.shadow_map(light, &point, fx.view.id()).is_none());
}

#[test]
fn test_irrelevant_lights_cache_nothing() {
    let mut fx = Fixture::new();
    fx.spawn_light(Vec3::new(0.0, 0.0, 50.0), Light::point(3.0));
    let mut unshadowed = Light::point(3.0);
    unshadowed.casts_shadows = false;
    fx.spawn_light(Vec3::new(0.0, 0.0, -5.0), unshadowed);
    fx.spawn_caster(Vec3::new(0.0, 0.0, -6.0));

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);
    fx.shadows(2, &mut coordinator, &mut renderer);

    assert_eq!(renderer.calls, 0);
    assert!(coordinator.is_empty());
}

#[test]
fn test_directional_map_tracks_the_viewing_camera() {
    let mut fx = Fixture::new();
    let sun = fx.spawn_light(Vec3::new(0.0, 10.0, 0.0), Light::directional());

    let mut coordinator = ShadowRebuildCoordinator::new();
    let mut renderer = CountingShadows::default();
    fx.shadows(1, &mut coordinator, &mut renderer);
    assert_eq!(renderer.layers, 4);
    fx.scene.clear_touched();

    fx.shadows(2, &mut coordinator, &mut renderer);
    assert_eq!(renderer.calls, 1);

    fx.camera = RenderCamera::look_at(
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, -1.0),
        Vec3::Y,
        std::f32::consts::FRAC_PI_2,
        0.1,
        100.0,
        Extent2D::new(640, 480),
    );
    fx.shadows(3, &mut coordinator, &mut renderer);
    assert_eq!(renderer.calls, 2);

    let other_view = RenderView::new();
    let light = *fx.scene.light(sun).unwrap();
    assert!(coordinator.shadow_map(sun, &light, fx.view.id()).is_some());
    assert!(coordinator.shadow_map(sun, &light, other_view.id()).is_none());
}

#[test]
fn test_environment_probe_rebuilds_every_frame() {
    let mut fx = Fixture::new();
    let probe = fx.spawn_probe(
        Vec3::new(0.0, 0.0, -5.0),
        ReflectionProbe::sphere(4.0).with_method(CaptureMethod::Environment),
    );

    let mut coordinator = ReflectionRebuildCoordinator::new();
    let mut renderer = CountingFaces::default();
    for frame in 1..=3 {
        fx.reflections(frame, &mut coordinator, &mut renderer);
        fx.reflections(frame, &mut coordinator, &mut renderer);
        fx.scene.clear_touched();
    }

    assert_eq!(coordinator.rebuild_count(probe), 3);
    assert_eq!(renderer.faces, 18);
    assert!(renderer.flags.iter().all(|flags| *flags == StageFlags::PROBE));
    assert_eq!(fx.stats.probe_face_rebuilds, 18);
}

#[test]
fn test_realtime_probe_only_rebuilds_faces_seeing_changes() {
    let mut fx = Fixture::new();
    let probe = fx.spawn_probe(Vec3::new(0.0, 0.0, -5.0), ReflectionProbe::sphere(4.0));
    let caster = fx.spawn_caster(Vec3::new(0.0, 0.0, -7.0));

    let mut coordinator = ReflectionRebuildCoordinator::new();
    let mut renderer = CountingFaces::default();
    fx.reflections(1, &mut coordinator, &mut renderer);
    assert_eq!(renderer.faces, 6);
    assert!(renderer
        .flags
        .iter()
        .all(|flags| flags.contains(StageFlags::GEOMETRY | StageFlags::SHADOWS)
            && !flags.contains(StageFlags::REFLECTIONS)));
    assert!(coordinator.cubemap(probe).is_some());
    fx.scene.clear_touched();

    fx.reflections(2, &mut coordinator, &mut renderer);
    assert_eq!(renderer.faces, 6, "a static scene keeps its cube map");
    assert_eq!(coordinator.rebuild_count(probe), 1);

    fx.scene
        .move_to(caster, Mat4::from_translation(Vec3::new(0.0, 0.0, -7.2)));
    fx.reflections(3, &mut coordinator, &mut renderer);
    let rebuilt = renderer.faces - 6;
    assert!((1..6).contains(&rebuilt), "rebuilt {rebuilt} face(s)");
    assert_eq!(coordinator.rebuild_count(probe), 2);
}

#[test]
fn test_probe_outside_the_camera_has_no_cube_map() {
    let mut fx = Fixture::new();
    let probe = fx.spawn_probe(Vec3::new(0.0, 0.0, 40.0), ReflectionProbe::sphere(2.0));

    let mut coordinator = ReflectionRebuildCoordinator::new();
    let mut renderer = CountingFaces::default();
    fx.reflections(1, &mut coordinator, &mut renderer);

    assert_eq!(renderer.faces, 0);
    assert!(coordinator.cubemap(probe).is_none());
}

#[test]
fn test_despawned_probe_releases_its_buffers() {
    let mut fx = Fixture::new();
    let probe = fx.spawn_probe(Vec3::new(0.0, 0.0, -5.0), ReflectionProbe::sphere(4.0));

    let mut coordinator = ReflectionRebuildCoordinator::new();
    let mut renderer = CountingFaces::default();
    fx.reflections(1, &mut coordinator, &mut renderer);
    assert!(fx.backend.live_buffer_count() > 0);
    assert!(coordinator.take_released_views().is_empty());

    fx.scene.despawn(probe);
    fx.reflections(2, &mut coordinator, &mut renderer);
    assert_eq!(fx.backend.live_buffer_count(), 0);
    assert_eq!(coordinator.take_released_views().len(), 6);
    assert!(coordinator.take_released_views().is_empty());
}
