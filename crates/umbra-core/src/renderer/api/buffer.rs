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

use crate::math::Extent2D;
use serde::{Deserialize, Serialize};

/// An opaque handle to a GPU buffer (render target or texture array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u64);

/// What a buffer is used for, which decides its formats on the backend side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// The multi-attachment geometry buffer.
    GBuffer {
        /// Number of color/depth attachments.
        attachments: u32,
    },
    /// A floating-point color target (light and reflection accumulation).
    HdrColor,
    /// The display-ready output after tonemapping.
    LdrColor,
    /// A standalone depth target.
    Depth,
    /// A layered depth target holding one slice per shadow camera.
    ShadowMap,
    /// A six-layer color target for a reflection probe.
    Cubemap,
}

/// Describes a buffer to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// A debug label, also used as the cache key by render views.
    pub label: String,
    /// The usage of the buffer.
    pub kind: BufferKind,
    /// The size of each layer.
    pub size: Extent2D,
    /// The number of array layers.
    pub layers: u32,
}

impl BufferDescriptor {
    /// Creates a single-layer descriptor.
    pub fn new(label: impl Into<String>, kind: BufferKind, size: Extent2D) -> Self {
        Self {
            label: label.into(),
            kind,
            size,
            layers: 1,
        }
    }

    /// Sets the layer count.
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers.max(1);
        self
    }
}
