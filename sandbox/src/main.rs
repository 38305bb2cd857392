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

// Umbra Sandbox
// Renders a small scene for a few seconds against the recording backend.

use anyhow::{Context, Result};
use umbra_agents::{DeferredCompositor, StageFlags};
use umbra_core::asset::AssetHandle;
use umbra_core::math::{Aabb, Extent2D, Mat4, Quat, Vec3, FRAC_PI_2};
use umbra_core::renderer::{
    CaptureMethod, Light, Material, Mesh, PipelineSettings, RecordingBackend, ReflectionProbe,
    RenderCamera, SkyModel, Skylight,
};
use umbra_data::{ModelComponent, Scene, Transform};
use umbra_lanes::{RenderView, VisibilityQuery};

const FRAMES: u64 = 240;
const DT: f32 = 1.0 / 60.0;

fn cube(half: f32, triangles: u32) -> AssetHandle<Mesh> {
    AssetHandle::new(Mesh::new(
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(half)),
        triangles,
    ))
}

fn spawn(scene: &mut Scene, world: Mat4) -> umbra_core::EntityId {
    let id = scene.spawn();
    scene.set_transform(id, Transform::new(world));
    id
}

/// Builds the demo scene and returns it with the entity that orbits.
fn build_scene(settings: &PipelineSettings) -> (Scene, umbra_core::EntityId) {
    let mut scene = Scene::new();

    let floor = spawn(
        &mut scene,
        Mat4::from_scale_rotation_translation(
            Vec3::new(50.0, 0.1, 50.0),
            Quat::IDENTITY,
            Vec3::new(0.0, -1.0, 0.0),
        ),
    );
    scene.set_model(
        floor,
        ModelComponent::new(vec![cube(0.5, 2)])
            .with_static(true)
            .with_reflection_casting(false),
    );

    let foliage = AssetHandle::new(Material {
        name: "foliage".into(),
        alpha_test: true,
    });
    for x in -3..=3 {
        for z in 1..=6 {
            let id = spawn(
                &mut scene,
                Mat4::from_translation(Vec3::new(x as f32 * 3.0, 0.0, -(z as f32) * 4.0)),
            );
            let mut model = ModelComponent::new(vec![
                cube(0.5, 1200),
                cube(0.5, 300),
                cube(0.5, 48),
            ])
            .with_static(true);
            if (x + z) % 4 == 0 {
                model = model.with_materials(vec![foliage.clone()]);
            }
            scene.set_model(id, model);
        }
    }

    let orbiter = spawn(&mut scene, Mat4::from_translation(Vec3::new(0.0, 1.0, -8.0)));
    scene.set_model(
        orbiter,
        ModelComponent::new(vec![cube(0.75, 2000), cube(0.75, 200)]),
    );

    let sun = spawn(
        &mut scene,
        Mat4::from_rotation_x(-1.0) * Mat4::from_rotation_y(0.4),
    );
    scene.set_light(sun, Light::directional());
    scene.set_skylight(sun, Skylight::new(SkyModel::Perez, 3.0));

    for (i, position) in [Vec3::new(-4.0, 2.0, -6.0), Vec3::new(4.0, 2.0, -14.0)]
        .into_iter()
        .enumerate()
    {
        let lamp = spawn(&mut scene, Mat4::from_translation(position));
        let mut light = Light::point(8.0);
        light.shadow = settings.default_shadows;
        light.casts_shadows = i == 0;
        scene.set_light(lamp, light);
    }

    let spot = spawn(
        &mut scene,
        Mat4::from_translation(Vec3::new(0.0, 6.0, -10.0)) * Mat4::from_rotation_x(-1.2),
    );
    scene.set_light(spot, Light::spot(15.0));

    let hall = spawn(&mut scene, Mat4::from_translation(Vec3::new(0.0, 1.0, -10.0)));
    scene.set_probe(hall, ReflectionProbe::boxed(Vec3::new(10.0, 3.0, 12.0)));
    let sky = spawn(&mut scene, Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
    scene.set_probe(
        sky,
        ReflectionProbe::sphere(40.0).with_method(CaptureMethod::Environment),
    );

    (scene, orbiter)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => PipelineSettings::load(&path)
            .with_context(|| format!("loading pipeline settings from '{path}'"))?,
        None => PipelineSettings::default(),
    };

    let mut backend = RecordingBackend::new();
    let mut compositor = DeferredCompositor::new(&mut backend, settings.clone());
    let (mut scene, orbiter) = build_scene(&settings);

    let viewport = Extent2D::new(1280, 720);
    let mut main_view = RenderView::new();
    let mut map_view = RenderView::new();
    let map_camera = RenderCamera::orthographic(
        &(Mat4::from_translation(Vec3::new(0.0, 40.0, -10.0)) * Mat4::from_rotation_x(-FRAC_PI_2)),
        30.0,
        30.0,
        0.1,
        100.0,
        Extent2D::square(256),
    );
    let everything = VisibilityQuery::new();

    for frame in 0..FRAMES {
        let time = frame as f32 * DT;
        let eye = Vec3::new(time.sin() * 2.0, 2.0, 6.0 - time * 4.0);
        let camera = RenderCamera::look_at(
            eye,
            eye + Vec3::NEG_Z,
            Vec3::Y,
            60f32.to_radians(),
            0.1,
            200.0,
            viewport,
        );
        scene.move_to(
            orbiter,
            Mat4::from_translation(Vec3::new(time.cos() * 5.0, 1.0, -8.0 + time.sin() * 5.0)),
        );

        let index = compositor.begin_frame();
        let output = compositor
            .run_pipeline(
                &mut backend,
                &scene,
                &camera,
                &mut main_view,
                DT,
                &everything,
                settings.default_stages | StageFlags::DEBUG,
            )
            .context("rendering the main view")?;
        compositor
            .run_pipeline(
                &mut backend,
                &scene,
                &map_camera,
                &mut map_view,
                DT,
                &everything,
                StageFlags::GEOMETRY | StageFlags::LIGHTING,
            )
            .context("rendering the map view")?;
        scene.clear_touched();

        let stats = compositor.stats();
        log::debug!("Frame {index} -> {output:?}: {stats:?}");
        if index % 60 == 0 {
            let released =
                main_view.release_unused(&mut backend) + map_view.release_unused(&mut backend);
            log::info!(
                "Frame {index}: {} passes, {} draws, {} shadow maps, {} probe faces, \
                 {} skipped, {} buffers alive ({released} released)",
                stats.passes,
                stats.draw_calls,
                stats.shadow_rebuilds,
                stats.probe_face_rebuilds,
                stats.skipped_not_ready + stats.skipped_degenerate + stats.skipped_small,
                backend.live_buffer_count(),
            );
        }
        backend.clear_log();
    }

    compositor.forget_view(&mut backend, &mut map_view);
    compositor.forget_view(&mut backend, &mut main_view);
    compositor.release_all(&mut backend);
    log::info!(
        "Shut down with {} buffer(s) alive",
        backend.live_buffer_count()
    );
    Ok(())
}
