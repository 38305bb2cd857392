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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Only backend failures are errors. Missing upstream data (a mesh still
//! streaming, a program the backend cannot provide) is not an error: the
//! affected entity is skipped for the stage and the reason is reported as a
//! [`SkipReason`].

use super::api::BufferId;
use crate::math::Extent2D;
use std::fmt;

/// An error related to the allocation or lookup of GPU buffers.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The backend ran out of memory while allocating a buffer.
    OutOfMemory {
        /// The label of the buffer that failed to allocate.
        label: String,
        /// The requested size.
        size: Extent2D,
    },
    /// The buffer handle does not refer to a live buffer.
    InvalidBuffer(BufferId),
    /// A backend-specific failure.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::OutOfMemory { label, size } => {
                write!(
                    f,
                    "Out of memory allocating '{label}' ({}x{})",
                    size.width, size.height
                )
            }
            ResourceError::InvalidBuffer(id) => write!(f, "Invalid buffer handle: {id:?}"),
            ResourceError::Backend(msg) => write!(f, "Backend resource error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// The top-level error type for a frame of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A buffer could not be created or was used after destruction.
    Resource(ResourceError),
    /// The backend rejected a pass submission.
    SubmissionFailed {
        /// The label of the rejected pass.
        pass: &'static str,
        /// Details reported by the backend.
        details: String,
    },
    /// The viewport has a zero-sized dimension.
    EmptyViewport,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Resource(e) => write!(f, "Resource error: {e}"),
            RenderError::SubmissionFailed { pass, details } => {
                write!(f, "Submission of pass '{pass}' failed: {details}")
            }
            RenderError::EmptyViewport => write!(f, "Cannot render into an empty viewport"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

/// Why an entity, light or probe contributed nothing to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// An asset or program it depends on is not available yet.
    ResourceNotReady,
    /// Its geometry cannot produce pixels (no LOD ranges, no triangles,
    /// zero-area projection).
    DegenerateGeometry,
    /// It projects to less than one percent of the viewport height.
    BelowScreenThreshold,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ResourceNotReady => write!(f, "resource not ready"),
            SkipReason::DegenerateGeometry => write!(f, "degenerate geometry"),
            SkipReason::BelowScreenThreshold => write!(f, "below screen threshold"),
        }
    }
}
