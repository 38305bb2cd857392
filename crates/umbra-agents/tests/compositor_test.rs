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

use umbra_agents::{DeferredCompositor, FrameStats, StageFlags};
use umbra_core::asset::AssetHandle;
use umbra_core::math::{Aabb, Extent2D, Mat4, Vec3};
use umbra_core::renderer::{
    BufferDescriptor, BufferKind, CaptureMethod, DrawCommand, Light, Mesh, PipelineSettings,
    RecordedCommand, RecordingBackend, ReflectionProbe, RenderBackend, RenderCamera,
    RenderError, RenderPass, ResourceError, SkipReason, Skylight,
};
use umbra_core::EntityId;
use umbra_data::{LodLimits, LodRange, ModelComponent, Scene, Transform};
use umbra_lanes::{RenderView, VisibilityQuery, GBUFFER, OBUFFER};

fn unit_mesh() -> AssetHandle<Mesh> {
    AssetHandle::new(Mesh::new(
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
        12,
    ))
}

fn camera() -> RenderCamera {
    RenderCamera::look_at(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        std::f32::consts::FRAC_PI_2,
        0.1,
        100.0,
        Extent2D::new(640, 480),
    )
}

fn spawn_at(scene: &mut Scene, position: Vec3) -> EntityId {
    let id = scene.spawn();
    scene.set_transform(id, Transform::from_translation(position));
    id
}

/// A model, a point light and a sun-lit sky, all in front of the camera.
fn lit_scene() -> Scene {
    let mut scene = Scene::new();
    let model = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -5.0));
    scene.set_model(model, ModelComponent::new(vec![unit_mesh()]));
    let lamp = spawn_at(&mut scene, Vec3::new(0.0, 1.0, -4.0));
    scene.set_light(lamp, Light::point(5.0));
    let sky = spawn_at(&mut scene, Vec3::new(0.0, 50.0, 0.0));
    scene.set_skylight(sky, Skylight::default());
    scene
}

fn run(
    compositor: &mut DeferredCompositor,
    backend: &mut RecordingBackend,
    scene: &Scene,
    view: &mut RenderView,
    flags: StageFlags,
) -> Result<umbra_core::renderer::BufferId, RenderError> {
    compositor.run_pipeline(
        backend,
        scene,
        &camera(),
        view,
        1.0 / 60.0,
        &VisibilityQuery::new(),
        flags,
    )
}

fn pass<'a>(backend: &'a RecordingBackend, label: &str) -> Vec<&'a RenderPass> {
    backend.passes().filter(|p| p.label == label).collect()
}

#[test]
fn test_stages_run_in_fixed_order() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(
        &mut compositor,
        &mut backend,
        &scene,
        &mut view,
        StageFlags::FULL | StageFlags::DEBUG,
    )
    .unwrap();

    let labels = backend.pass_labels();
    let first_stage = labels
        .iter()
        .position(|l| *l != "shadow_depth")
        .unwrap();
    assert!(first_stage > 0, "the point light needs a shadow map");
    assert_eq!(
        &labels[first_stage..],
        &[
            "g_buffer_fill",
            "ambient_occlusion",
            "reflection_buffer_fill",
            "light_buffer_fill",
            "atmospherics",
            "tonemapping",
            "debug_overlay",
        ]
    );
}

#[test]
fn test_probe_stage_subset() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::PROBE).unwrap();

    assert_eq!(
        backend.pass_labels(),
        vec!["light_buffer_fill", "atmospherics", "tonemapping"]
    );
}

#[test]
fn test_probe_faces_never_blend_reflections() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = lit_scene();
    let probe = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -6.0));
    scene.set_probe(probe, ReflectionProbe::sphere(3.0));
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();

    assert_eq!(pass(&backend, "reflection_buffer_fill").len(), 1);
    assert_eq!(pass(&backend, "tonemapping").len(), 7);
    let blitted: Vec<u32> = backend
        .log()
        .iter()
        .filter_map(|c| match c {
            RecordedCommand::Blit { layer, .. } => Some(*layer),
            _ => None,
        })
        .collect();
    assert_eq!(blitted, vec![0, 1, 2, 3, 4, 5]);

    let cubemap = compositor.probe_cubemap(probe).unwrap();
    let blend = pass(&backend, "reflection_buffer_fill")[0];
    assert_eq!(blend.draw_count(), 1);
    match &blend.commands[0] {
        DrawCommand::Quad(quad) => assert_eq!(quad.textures, vec![cubemap]),
        other => panic!("unexpected draw {other:?}"),
    }
    assert_eq!(compositor.stats().probe_face_rebuilds, 6);
}

#[test]
fn test_environment_probe_rebuilds_every_frame() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = lit_scene();
    let probe = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -6.0));
    scene.set_probe(
        probe,
        ReflectionProbe::boxed(Vec3::splat(2.0)).with_method(CaptureMethod::Environment),
    );
    let mut view = RenderView::new();

    for _ in 0..4 {
        compositor.begin_frame();
        run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
        scene.clear_touched();
    }
    assert_eq!(compositor.probe_rebuild_count(probe), 4);
}

#[test]
fn test_shared_shadow_map_is_rebuilt_once_per_frame() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut left = RenderView::new();
    let mut right = RenderView::new();

    compositor.begin_frame();
    let flags = StageFlags::GEOMETRY | StageFlags::SHADOWS | StageFlags::LIGHTING;
    run(&mut compositor, &mut backend, &scene, &mut left, flags).unwrap();
    run(&mut compositor, &mut backend, &scene, &mut right, flags).unwrap();

    assert_eq!(compositor.stats().shadow_rebuilds, 1);
    assert_eq!(pass(&backend, "shadow_depth").len(), 6);
    for lighting in pass(&backend, "light_buffer_fill") {
        match &lighting.commands[0] {
            DrawCommand::Quad(quad) => assert_eq!(quad.textures.len(), 1),
            other => panic!("unexpected draw {other:?}"),
        }
    }
}

#[test]
fn test_explicit_output_receives_tonemapping() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();
    let target = backend
        .create_buffer(&BufferDescriptor::new(
            "face",
            BufferKind::LdrColor,
            Extent2D::new(640, 480),
        ))
        .unwrap();

    compositor.begin_frame();
    compositor
        .run_pipeline_into(
            target,
            &mut backend,
            &scene,
            &camera(),
            &mut view,
            1.0 / 60.0,
            &VisibilityQuery::new(),
            StageFlags::FULL,
        )
        .unwrap();

    let tonemap = pass(&backend, "tonemapping");
    assert_eq!(tonemap.last().unwrap().target, target);
    assert!(view.get(OBUFFER).is_none());
}

#[test]
fn test_missing_light_program_skips_the_light() {
    let mut backend = RecordingBackend::new().with_missing_programs([
        "fs_deferred_point_light",
        "fs_deferred_point_light_invz_pcf",
    ]);
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();

    assert_eq!(pass(&backend, "light_buffer_fill")[0].draw_count(), 0);
    assert_eq!(compositor.stats().skipped(SkipReason::ResourceNotReady), 1);
    assert_eq!(pass(&backend, "tonemapping").len(), 1);
}

#[test]
fn test_unready_mesh_does_not_fail_the_frame() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = Scene::new();
    let handle = AssetHandle::<Mesh>::pending();
    let model = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -5.0));
    scene.set_model(model, ModelComponent::new(vec![handle.clone()]));
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    assert_eq!(pass(&backend, "g_buffer_fill")[0].draw_count(), 0);

    assert!(handle.fulfill(Mesh::new(Aabb::default(), 12)));
    backend.clear_log();
    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    assert_eq!(pass(&backend, "g_buffer_fill")[0].draw_count(), 1);
}

#[test]
fn test_degenerate_mesh_is_skipped() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = Scene::new();
    let model = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -5.0));
    let empty = AssetHandle::new(Mesh::new(Aabb::default(), 0));
    scene.set_model(model, ModelComponent::new(vec![empty]));
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::GEOMETRY).unwrap();

    assert_eq!(pass(&backend, "g_buffer_fill")[0].draw_count(), 0);
    assert_eq!(compositor.stats().skipped(SkipReason::DegenerateGeometry), 1);
}

#[test]
fn test_out_of_memory_is_propagated() {
    let mut backend = RecordingBackend::new().with_buffer_limit(1);
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = Scene::new();
    let mut view = RenderView::new();

    compositor.begin_frame();
    let err = run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL)
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Resource(ResourceError::OutOfMemory { .. })
    ));
}

#[test]
fn test_empty_viewport_is_rejected() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = Scene::new();
    let mut view = RenderView::new();
    let mut camera = camera();
    camera.viewport = Extent2D::new(0, 480);

    compositor.begin_frame();
    let result = compositor.run_pipeline(
        &mut backend,
        &scene,
        &camera,
        &mut view,
        0.0,
        &VisibilityQuery::new(),
        StageFlags::FULL,
    );
    assert!(matches!(result, Err(RenderError::EmptyViewport)));
    assert!(backend.log().is_empty());
}

#[test]
fn test_view_buffers_are_reused_between_frames() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();

    compositor.begin_frame();
    let first = run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    let g_buffer = view.get(GBUFFER).unwrap();
    let live = backend.live_buffer_count();

    compositor.begin_frame();
    let second = run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    assert_eq!(first, second);
    assert_eq!(view.get(GBUFFER), Some(g_buffer));
    assert_eq!(backend.live_buffer_count(), live);
}

#[test]
fn test_lod_cross_fade_draws_both_levels() {
    let settings = PipelineSettings {
        lod_transition_time: 0.5,
        ..PipelineSettings::default()
    };
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, settings);
    let mut scene = Scene::new();
    let model = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -20.0));
    scene.set_model(
        model,
        ModelComponent::new(vec![unit_mesh(), unit_mesh()]).with_lod_limits(
            LodLimits::from_ranges(vec![LodRange::new(50, 100), LodRange::new(0, 50)]),
        ),
    );
    let mut view = RenderView::new();

    let lods_drawn = |backend: &RecordingBackend| -> Vec<(u32, f32)> {
        pass(backend, "g_buffer_fill")[0]
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Mesh(draw) => Some((draw.lod_index, draw.uniforms.params[0][0])),
                _ => None,
            })
            .collect()
    };

    let mut frame = |backend: &mut RecordingBackend, compositor: &mut DeferredCompositor| {
        backend.clear_log();
        compositor.begin_frame();
        compositor
            .run_pipeline(
                backend,
                &scene,
                &camera(),
                &mut view,
                0.2,
                &VisibilityQuery::new(),
                StageFlags::GEOMETRY,
            )
            .unwrap();
    };

    frame(&mut backend, &mut compositor);
    let fading = lods_drawn(&backend);
    assert_eq!(fading.len(), 2);
    assert_eq!(fading[0].0, 0);
    assert_eq!(fading[1].0, 1);
    approx::assert_relative_eq!(fading[0].1 + fading[1].1, 1.0, epsilon = 1e-5);

    for _ in 0..3 {
        frame(&mut backend, &mut compositor);
    }
    assert_eq!(lods_drawn(&backend), vec![(1, 1.0)]);
}

#[test]
fn test_stats_reset_on_begin_frame() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let scene = lit_scene();
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    assert!(compositor.stats().passes > 0);
    assert!(compositor.stats().draw_calls > 0);

    assert_eq!(compositor.begin_frame(), 2);
    assert_eq!(compositor.stats(), FrameStats::default());
}

#[test]
fn test_moved_model_keeps_rendering() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = lit_scene();
    let mut view = RenderView::new();
    let model = scene.models().map(|(id, _, _)| id).next().unwrap();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    scene.clear_touched();
    scene.move_to(model, Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0)));
    backend.clear_log();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    assert_eq!(pass(&backend, "g_buffer_fill")[0].draw_count(), 0);
}

#[test]
fn test_probe_face_does_not_hide_moved_shadow_casters() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = Scene::new();
    let lamp = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -5.0));
    scene.set_light(lamp, Light::point(3.0));
    // Casts shadows only, inside the lamp's range.
    let crate_box = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -6.0));
    scene.set_model(
        crate_box,
        ModelComponent::new(vec![unit_mesh()]).with_reflection_casting(false),
    );
    // Seen by the probe's +Z face next to the lamp, out of its range.
    let mirror_ball = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -1.0));
    scene.set_model(mirror_ball, ModelComponent::new(vec![unit_mesh()]));
    let probe = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -8.0));
    scene.set_probe(probe, ReflectionProbe::sphere(10.0));
    let mut view = RenderView::new();

    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    scene.clear_touched();

    scene.move_to(crate_box, Mat4::from_translation(Vec3::new(0.0, 0.5, -6.0)));
    scene.move_to(mirror_ball, Mat4::from_translation(Vec3::new(0.2, 0.0, -1.0)));
    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();

    assert!(compositor.stats().probe_face_rebuilds > 0);
    assert_eq!(compositor.stats().shadow_rebuilds, 1);
}

#[test]
fn test_despawned_probe_drops_face_shadow_maps() {
    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
    let mut scene = lit_scene();
    let sun = spawn_at(&mut scene, Vec3::new(0.0, 20.0, 0.0));
    scene.set_light(sun, Light::directional());
    let mut view = RenderView::new();

    for _ in 0..2 {
        compositor.begin_frame();
        run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
        scene.clear_touched();
    }
    let baseline = backend.live_buffer_count();

    let probe = spawn_at(&mut scene, Vec3::new(0.0, 0.0, -6.0));
    scene.set_probe(probe, ReflectionProbe::sphere(3.0));
    compositor.begin_frame();
    run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
    scene.clear_touched();
    assert!(backend.live_buffer_count() > baseline + 6);

    scene.despawn(probe);
    for _ in 0..2 {
        compositor.begin_frame();
        run(&mut compositor, &mut backend, &scene, &mut view, StageFlags::FULL).unwrap();
        scene.clear_touched();
    }
    assert!(compositor.probe_cubemap(probe).is_none());
    assert_eq!(backend.live_buffer_count(), baseline);
}
