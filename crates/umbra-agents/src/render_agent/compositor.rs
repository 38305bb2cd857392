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

//! Defines the DeferredCompositor, the orchestrator of the frame pipeline.

use umbra_core::ecs::entity::EntityId;
use umbra_core::lane::Lane;
use umbra_core::renderer::{
    BufferId, PipelineSettings, RenderBackend, RenderCamera, RenderError, SettingsError,
    StageFlags,
};
use umbra_data::Scene;
use umbra_lanes::{
    gather, AmbientOcclusionLane, AtmosphericsLane, DebugLane, FrameContext, FrameStats,
    GeometryLane, LightingInputs, LightingLane, ProbeFaceRenderer, ProbeFaceRequest,
    ProgramLibrary, ReflectionBlendLane, ReflectionRebuildCoordinator, RenderView,
    ShadowDepthLane, ShadowRebuildCoordinator, TonemapLane, VisibilityQuery,
};

/// What one invocation of the stage sequence renders.
struct StageRequest<'a> {
    camera: &'a RenderCamera,
    visibility: &'a VisibilityQuery,
    flags: StageFlags,
    // Tonemapping target; the view's output buffer when absent.
    output: Option<BufferId>,
}

// Everything a pipeline invocation needs except the probe coordinator, so
// that the coordinator can hand the core back to itself to render faces.
#[derive(Debug, Default)]
struct CompositorCore {
    shadows: ShadowRebuildCoordinator,
    shadow_depth: ShadowDepthLane,
    geometry: GeometryLane,
    ambient_occlusion: AmbientOcclusionLane,
    reflection_blend: ReflectionBlendLane,
    lighting: LightingLane,
    atmospherics: AtmosphericsLane,
    tonemap: TonemapLane,
    debug: DebugLane,
}

fn enter(lane: &dyn Lane) {
    log::debug!("{} stage ({})", lane.lane_kind(), lane.strategy_name());
}

impl CompositorCore {
    fn run_stages(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        request: StageRequest<'_>,
        view: &mut RenderView,
        reflections: Option<&ReflectionRebuildCoordinator>,
        stats: &mut FrameStats,
    ) -> Result<BufferId, RenderError> {
        let StageRequest {
            camera,
            visibility,
            flags,
            output,
        } = request;

        let apply_shadows = flags.contains(StageFlags::SHADOWS);
        if apply_shadows {
            self.shadows.rebuild(
                backend,
                ctx,
                camera,
                view.id(),
                &mut self.shadow_depth,
                stats,
            )?;
        }

        let visible = if flags.contains(StageFlags::GEOMETRY) {
            gather(ctx.scene, Some(&camera.frustum()), visibility)
        } else {
            Vec::new()
        };
        let g_buffer = if flags.contains(StageFlags::GEOMETRY) {
            enter(&self.geometry);
            self.geometry
                .run(backend, ctx, camera, view, &visible, stats)?
        } else {
            view.g_buffer(backend, camera.viewport)?
        };

        if flags.contains(StageFlags::AMBIENT_OCCLUSION) {
            enter(&self.ambient_occlusion);
            self.ambient_occlusion
                .run(backend, ctx, camera, g_buffer, stats)?;
        }

        let r_buffer = match reflections {
            Some(reflections) if flags.contains(StageFlags::REFLECTIONS) => {
                enter(&self.reflection_blend);
                Some(self.reflection_blend.run(
                    backend,
                    ctx,
                    camera,
                    view,
                    reflections,
                    g_buffer,
                    stats,
                )?)
            }
            _ => None,
        };

        let mut target = g_buffer;
        if flags.contains(StageFlags::LIGHTING) {
            enter(&self.lighting);
            let inputs = LightingInputs {
                g_buffer,
                r_buffer,
                apply_shadows,
            };
            target = self
                .lighting
                .run(backend, ctx, camera, view, &self.shadows, inputs, stats)?;
        }

        if flags.contains(StageFlags::ATMOSPHERICS) {
            enter(&self.atmospherics);
            target = self
                .atmospherics
                .run(backend, ctx, camera, view, target, g_buffer, stats)?;
        }

        let output = match output {
            Some(output) => output,
            None => view.output_buffer(backend, camera.viewport)?,
        };
        enter(&self.tonemap);
        self.tonemap.run(backend, ctx, target, output, stats)?;

        if flags.contains(StageFlags::DEBUG) {
            enter(&self.debug);
            self.debug
                .run(backend, ctx, camera, view, &visible, output, stats)?;
        }

        Ok(output)
    }
}

impl ProbeFaceRenderer for CompositorCore {
    fn render_probe_face(
        &mut self,
        backend: &mut dyn RenderBackend,
        ctx: &FrameContext<'_>,
        request: &ProbeFaceRequest<'_>,
        view: &mut RenderView,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let stages = StageRequest {
            camera: request.camera,
            visibility: request.visibility,
            flags: request.flags - StageFlags::REFLECTIONS,
            output: Some(request.output),
        };
        self.run_stages(backend, ctx, stages, view, None, stats)
            .map(|_| ())
    }
}

/// Sequences the deferred pipeline for any number of views per frame.
///
/// The compositor owns the shadow maps and probe cube maps shared between
/// views; each view brings its own [`RenderView`] holding its buffers and LOD
/// state.
///
/// ```rust,ignore
/// let mut compositor = DeferredCompositor::new(&mut backend, PipelineSettings::default());
/// let mut view = RenderView::new();
/// loop {
///     compositor.begin_frame();
///     let frame = compositor.run_pipeline(
///         &mut backend, &scene, &camera, &mut view, dt,
///         &VisibilityQuery::new(), StageFlags::FULL,
///     )?;
///     scene.clear_touched();
/// }
/// ```
#[derive(Debug)]
pub struct DeferredCompositor {
    settings: PipelineSettings,
    programs: ProgramLibrary,
    frame_index: u64,
    reflections: ReflectionRebuildCoordinator,
    core: CompositorCore,
    stats: FrameStats,
}

impl DeferredCompositor {
    /// Creates a compositor and resolves its programs from `backend`.
    pub fn new(backend: &mut dyn RenderBackend, settings: PipelineSettings) -> Self {
        log::info!(
            "Creating deferred compositor (tonemapping {:?}, probe faces {}px)",
            settings.tonemapping.method,
            settings.cubemap_face_size
        );
        Self {
            programs: ProgramLibrary::load(backend),
            settings,
            frame_index: 0,
            reflections: ReflectionRebuildCoordinator::new(),
            core: CompositorCore::default(),
            stats: FrameStats::default(),
        }
    }

    /// Starts a new frame and returns its index.
    ///
    /// Every artifact is rebuilt at most once per frame index, whatever the
    /// number of views rendered in between.
    pub fn begin_frame(&mut self) -> u64 {
        self.frame_index += 1;
        self.stats = FrameStats::default();
        log::trace!("Begin frame {}", self.frame_index);
        self.frame_index
    }

    /// The index of the current frame.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Runs the stages selected by `flags` for `camera` and returns the
    /// buffer holding the tonemapped result (the view's output buffer).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyViewport`] for a zero-sized camera and
    /// propagates backend failures. Missing meshes, programs or cube maps
    /// never fail the frame; they are counted in [`stats`](Self::stats).
    #[allow(clippy::too_many_arguments)]
    pub fn run_pipeline(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: &Scene,
        camera: &RenderCamera,
        view: &mut RenderView,
        dt: f32,
        visibility: &VisibilityQuery,
        flags: StageFlags,
    ) -> Result<BufferId, RenderError> {
        self.execute(backend, scene, camera, view, dt, visibility, flags, None)
    }

    /// Like [`run_pipeline`](Self::run_pipeline), but tonemaps into `output`
    /// instead of the view's output buffer.
    #[allow(clippy::too_many_arguments)]
    pub fn run_pipeline_into(
        &mut self,
        output: BufferId,
        backend: &mut dyn RenderBackend,
        scene: &Scene,
        camera: &RenderCamera,
        view: &mut RenderView,
        dt: f32,
        visibility: &VisibilityQuery,
        flags: StageFlags,
    ) -> Result<(), RenderError> {
        self.execute(backend, scene, camera, view, dt, visibility, flags, Some(output))
            .map(|_| ())
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: &Scene,
        camera: &RenderCamera,
        view: &mut RenderView,
        dt: f32,
        visibility: &VisibilityQuery,
        flags: StageFlags,
        output: Option<BufferId>,
    ) -> Result<BufferId, RenderError> {
        if camera.viewport.is_empty() {
            return Err(RenderError::EmptyViewport);
        }
        log::debug!(
            "Frame {}: running {:?} for view {:?}",
            self.frame_index,
            flags,
            view.id()
        );

        let ctx = FrameContext {
            frame_index: self.frame_index,
            scene,
            settings: &self.settings,
            programs: &self.programs,
            dt,
        };

        let reflections = flags.contains(StageFlags::REFLECTIONS);
        if reflections {
            let rebuilt = self
                .reflections
                .rebuild(backend, &ctx, camera, &mut self.core, &mut self.stats);
            Self::forget_released_probe_views(&mut self.reflections, &mut self.core, backend);
            rebuilt?;
        }

        let request = StageRequest {
            camera,
            visibility,
            flags,
            output,
        };
        self.core.run_stages(
            backend,
            &ctx,
            request,
            view,
            reflections.then_some(&self.reflections),
            &mut self.stats,
        )
    }

    /// Counters accumulated since [`begin_frame`](Self::begin_frame).
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The active configuration.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Replaces the configuration after validating it.
    pub fn set_settings(&mut self, settings: PipelineSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// The programs resolved from the backend.
    pub fn programs(&self) -> &ProgramLibrary {
        &self.programs
    }

    /// Resolves the programs again, after the backend gained or lost some.
    pub fn reload_programs(&mut self, backend: &mut dyn RenderBackend) {
        self.programs = ProgramLibrary::load(backend);
    }

    /// The cube map of a reflection probe, once generated.
    pub fn probe_cubemap(&self, probe: EntityId) -> Option<BufferId> {
        self.reflections.cubemap(probe)
    }

    /// Number of frames in which faces of `probe` were regenerated.
    pub fn probe_rebuild_count(&self, probe: EntityId) -> u64 {
        self.reflections.rebuild_count(probe)
    }

    /// Drops the shadow maps fitted to `view` and releases its buffers.
    pub fn forget_view(&mut self, backend: &mut dyn RenderBackend, view: &mut RenderView) {
        self.core.shadows.forget_view(backend, view.id());
        view.release_all(backend);
    }

    /// Releases every shadow map and cube map.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        self.reflections.release_all(backend);
        self.reflections.take_released_views();
        self.core.shadows.release_all(backend);
    }

    fn forget_released_probe_views(
        reflections: &mut ReflectionRebuildCoordinator,
        core: &mut CompositorCore,
        backend: &mut dyn RenderBackend,
    ) {
        for view in reflections.take_released_views() {
            log::trace!("Forgetting probe face view {view:?}");
            core.shadows.forget_view(backend, view);
        }
    }
}
