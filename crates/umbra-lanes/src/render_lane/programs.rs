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

//! Enum-indexed tables of the programs used by each stage.

use umbra_core::renderer::{
    LightKind, ProbeKind, ProgramId, RenderBackend, ShadowDepth, ShadowFilter, SkyModel,
};

type LightTable = [[[Option<ProgramId>; ShadowFilter::COUNT]; ShadowDepth::COUNT]; LightKind::COUNT];

/// Every program the pipeline may draw with, resolved once from the backend.
///
/// Programs the backend does not provide stay empty; the lights, probes or
/// stages needing them are skipped while rendering.
#[derive(Debug, Clone, Default)]
pub struct ProgramLibrary {
    geometry: Option<ProgramId>,
    geometry_alpha: Option<ProgramId>,
    shadow_depth: [Option<ProgramId>; ShadowDepth::COUNT],
    lighting: LightTable,
    lighting_no_shadow: [Option<ProgramId>; LightKind::COUNT],
    reflection: [Option<ProgramId>; ProbeKind::COUNT],
    atmospherics: [Option<ProgramId>; 2],
    ambient_occlusion: Option<ProgramId>,
    tonemapping: Option<ProgramId>,
    debug_bounds: Option<ProgramId>,
}

fn resolve(backend: &mut dyn RenderBackend, name: &str, missing: &mut Vec<String>) -> Option<ProgramId> {
    let program = backend.find_program(name);
    if program.is_none() {
        missing.push(name.to_string());
    }
    program
}

impl ProgramLibrary {
    /// Resolves every program by name.
    pub fn load(backend: &mut dyn RenderBackend) -> Self {
        let mut missing = Vec::new();
        let mut library = Self {
            geometry: resolve(backend, "fs_gbuffer", &mut missing),
            geometry_alpha: resolve(backend, "fs_gbuffer_alpha", &mut missing),
            ..Self::default()
        };

        for depth in ShadowDepth::ALL {
            library.shadow_depth[depth as usize] =
                resolve(backend, &format!("fs_shadow_depth_{}", depth.name()), &mut missing);
        }
        for kind in LightKind::ALL {
            library.lighting_no_shadow[kind.index()] =
                resolve(backend, &format!("fs_deferred_{}_light", kind.name()), &mut missing);
            for depth in ShadowDepth::ALL {
                for filter in ShadowFilter::ALL {
                    let name = format!(
                        "fs_deferred_{}_light_{}_{}",
                        kind.name(),
                        depth.name(),
                        filter.name()
                    );
                    library.lighting[kind.index()][depth as usize][filter as usize] =
                        resolve(backend, &name, &mut missing);
                }
            }
        }
        library.reflection[ProbeKind::Box.index()] =
            resolve(backend, "fs_box_reflection_probe", &mut missing);
        library.reflection[ProbeKind::Sphere.index()] =
            resolve(backend, "fs_sphere_reflection_probe", &mut missing);
        library.atmospherics[SkyModel::Standard as usize] =
            resolve(backend, "fs_atmospherics", &mut missing);
        library.atmospherics[SkyModel::Perez as usize] =
            resolve(backend, "fs_atmospherics_perez", &mut missing);
        library.ambient_occlusion = resolve(backend, "fs_ambient_occlusion", &mut missing);
        library.tonemapping = resolve(backend, "fs_tonemapping", &mut missing);
        library.debug_bounds = resolve(backend, "fs_debug_bounds", &mut missing);

        for name in &missing {
            log::warn!("Program '{name}' is unavailable; draws needing it will be skipped");
        }
        library
    }

    /// The geometry fill program, alpha-tested or not.
    pub fn geometry(&self, alpha_test: bool) -> Option<ProgramId> {
        if alpha_test {
            self.geometry_alpha
        } else {
            self.geometry
        }
    }

    /// The depth-only program writing shadow maps.
    pub fn shadow_depth(&self, depth: ShadowDepth) -> Option<ProgramId> {
        self.shadow_depth[depth as usize]
    }

    /// The light accumulation program for a light kind, with or without
    /// shadow sampling.
    pub fn lighting(
        &self,
        kind: LightKind,
        shadow: Option<(ShadowDepth, ShadowFilter)>,
    ) -> Option<ProgramId> {
        match shadow {
            Some((depth, filter)) => self.lighting[kind.index()][depth as usize][filter as usize],
            None => self.lighting_no_shadow[kind.index()],
        }
    }

    /// The probe blending program for a probe kind.
    pub fn reflection(&self, kind: ProbeKind) -> Option<ProgramId> {
        self.reflection[kind.index()]
    }

    /// The sky program for a sky model.
    pub fn atmospherics(&self, model: SkyModel) -> Option<ProgramId> {
        self.atmospherics[model as usize]
    }

    /// The ambient occlusion program.
    pub fn ambient_occlusion(&self) -> Option<ProgramId> {
        self.ambient_occlusion
    }

    /// The tonemapping program.
    pub fn tonemapping(&self) -> Option<ProgramId> {
        self.tonemapping
    }

    /// The bounds overlay program.
    pub fn debug_bounds(&self) -> Option<ProgramId> {
        self.debug_bounds
    }
}
