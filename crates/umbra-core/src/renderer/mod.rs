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

//! Contracts of the deferred renderer: cameras, lights, probes, meshes, the
//! backend interface and the error types shared by every stage.

pub mod api;
pub mod camera;
pub mod error;
pub mod light;
pub mod mesh;
pub mod probe;
pub mod settings;
pub mod stages;

pub use self::api::*;
pub use self::camera::{CubeFace, Projection, RenderCamera};
pub use self::error::{RenderError, ResourceError, SkipReason};
pub use self::light::{
    Light, LightKind, LightShape, ShadowDepth, ShadowFilter, ShadowParams, ShadowResolution,
    SkyModel, Skylight,
};
pub use self::mesh::{Material, Mesh};
pub use self::probe::{CaptureMethod, ProbeKind, ProbeShape, ReflectionProbe};
pub use self::settings::{PipelineSettings, SettingsError, TonemapMethod, TonemapSettings};
pub use self::stages::StageFlags;
