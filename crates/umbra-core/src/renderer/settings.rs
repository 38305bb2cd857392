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

//! Tunable parameters of the frame pipeline, loadable from RON.

use super::light::ShadowParams;
use super::stages::StageFlags;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The operator applied by the tonemapping stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TonemapMethod {
    /// Clamp only.
    None,
    /// `1 - exp(-x)`.
    Exponential,
    /// Reinhard on each channel.
    Reinhard,
    /// Reinhard on luminance.
    ReinhardLum,
    /// Hable's filmic curve.
    Hable,
    /// Duiker's film response.
    Duiker,
    /// ACES fit on each channel.
    #[default]
    Aces,
    /// ACES fit on luminance.
    AcesLum,
    /// Hejl-Dawson filmic curve.
    Filmic,
}

impl TonemapMethod {
    /// The value passed to the tonemapping program.
    pub fn shader_index(self) -> u32 {
        self as u32
    }
}

/// Tonemapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TonemapSettings {
    /// The operator.
    pub method: TonemapMethod,
    /// Exposure multiplier applied before the operator.
    pub exposure: f32,
}

impl Default for TonemapSettings {
    fn default() -> Self {
        Self {
            method: TonemapMethod::Aces,
            exposure: 1.0,
        }
    }
}

/// Global configuration of the deferred compositor.
///
/// # Examples
///
/// ```
/// use umbra_core::renderer::settings::PipelineSettings;
///
/// let settings = PipelineSettings::from_ron_str("(lod_transition_time: 0.25)").unwrap();
/// assert_eq!(settings.lod_transition_time, 0.25);
/// assert_eq!(settings.cubemap_face_size, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Seconds a LOD cross-fade lasts. Zero switches instantly.
    pub lod_transition_time: f32,
    /// Side length of each reflection probe face.
    pub cubemap_face_size: u32,
    /// Shadow parameters applied to lights created without explicit ones.
    pub default_shadows: ShadowParams,
    /// Tonemapping parameters.
    pub tonemapping: TonemapSettings,
    /// Stages run when the frame driver does not pass explicit flags.
    pub default_stages: StageFlags,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            lod_transition_time: 0.5,
            cubemap_face_size: 256,
            default_shadows: ShadowParams::default(),
            tonemapping: TonemapSettings::default(),
            default_stages: StageFlags::FULL,
        }
    }
}

/// An error raised while loading [`PipelineSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// The path that failed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The content is not valid RON for [`PipelineSettings`].
    #[error("invalid pipeline settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A value is outside its valid range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl PipelineSettings {
    /// Parses settings from a RON string. Missing fields take their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_ron_str(&source)?;
        log::info!("Loaded pipeline settings from '{}'", path.display());
        Ok(settings)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.lod_transition_time.is_nan() || self.lod_transition_time < 0.0 {
            return Err(SettingsError::InvalidValue {
                field: "lod_transition_time",
                reason: format!("must be >= 0, got {}", self.lod_transition_time),
            });
        }
        if self.cubemap_face_size == 0 {
            return Err(SettingsError::InvalidValue {
                field: "cubemap_face_size",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.tonemapping.exposure.is_nan() || self.tonemapping.exposure <= 0.0 {
            return Err(SettingsError::InvalidValue {
                field: "tonemapping.exposure",
                reason: format!("must be > 0, got {}", self.tonemapping.exposure),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.cubemap_face_size, 256);
        assert_eq!(settings.tonemapping.method, TonemapMethod::Aces);
        assert_eq!(settings.tonemapping.exposure, 1.0);
        assert_eq!(settings.default_stages, StageFlags::FULL);
    }

    #[test]
    fn test_parse_nested_values() {
        let settings = PipelineSettings::from_ron_str(
            "(cubemap_face_size: 128, tonemapping: (method: Reinhard, exposure: 2.0))",
        )
        .unwrap();
        assert_eq!(settings.cubemap_face_size, 128);
        assert_eq!(settings.tonemapping.method, TonemapMethod::Reinhard);
        assert_eq!(settings.tonemapping.exposure, 2.0);
        assert_eq!(settings.lod_transition_time, 0.5);
    }

    #[test]
    fn test_rejects_negative_transition() {
        let err = PipelineSettings::from_ron_str("(lod_transition_time: -1.0)").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                field: "lod_transition_time",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(
            PipelineSettings::from_ron_str("(cubemap_face_size: \"big\")"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = PipelineSettings::load("/nonexistent/umbra.ron").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/umbra.ron"));
    }
}
