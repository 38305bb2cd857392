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

use super::{BufferId, ProgramId};
use crate::asset::AssetUUID;
use crate::ecs::entity::EntityId;
use crate::math::{Mat4, ScreenRect};
use bytemuck::{Pod, Zeroable};

/// How the target is initialized before a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Clear every attachment first.
    Clear,
    /// Keep the existing content.
    Load,
}

/// How fragment output is combined with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite.
    Opaque,
    /// `dst + src`, used for light accumulation.
    Additive,
    /// `src * a + dst * (1 - a)`, used for probe blending and debug overlays.
    AlphaBlend,
}

/// Per-draw shader parameters, uploaded verbatim into a uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
pub struct DrawUniforms {
    /// Free-form parameter slots. Each pass documents its layout.
    pub params: [[f32; 4]; 2],
}

impl DrawUniforms {
    /// Creates uniforms from two parameter vectors.
    pub fn new(a: [f32; 4], b: [f32; 4]) -> Self {
        Self { params: [a, b] }
    }
}

/// A mesh draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    /// The entity the mesh belongs to.
    pub entity: EntityId,
    /// The mesh asset to draw.
    pub mesh: AssetUUID,
    /// The LOD index of `mesh` within the entity's model.
    pub lod_index: u32,
    /// The program to draw with.
    pub program: ProgramId,
    /// The world matrix.
    pub world: Mat4,
    /// Shader parameters.
    pub uniforms: DrawUniforms,
}

/// A screen-space quad draw, optionally scissored.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadDraw {
    /// The program to draw with.
    pub program: ProgramId,
    /// Restricts rasterization to a rectangle of the target.
    pub scissor: Option<ScreenRect>,
    /// Additional buffers sampled by this draw only (shadow maps, cubemaps).
    pub textures: Vec<BufferId>,
    /// Shader parameters.
    pub uniforms: DrawUniforms,
}

/// A single unit of GPU work.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Draws a mesh.
    Mesh(MeshDraw),
    /// Draws a screen-space quad.
    Quad(QuadDraw),
}

/// A sequence of draws into one target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    /// A stable label identifying the pass.
    pub label: &'static str,
    /// The buffer written by the pass.
    pub target: BufferId,
    /// Layer of `target` written by the pass.
    pub layer: u32,
    /// Buffers sampled by every draw of the pass.
    pub inputs: Vec<BufferId>,
    /// Target initialization.
    pub load: LoadOp,
    /// Output blending.
    pub blend: BlendMode,
    /// The view-projection matrix used by mesh draws.
    pub view_projection: Mat4,
    /// The recorded draws, in submission order.
    pub commands: Vec<DrawCommand>,
}

impl RenderPass {
    /// Starts an empty pass into layer 0 of `target`.
    pub fn new(label: &'static str, target: BufferId) -> Self {
        Self {
            label,
            target,
            layer: 0,
            inputs: Vec::new(),
            load: LoadOp::Load,
            blend: BlendMode::Opaque,
            view_projection: Mat4::IDENTITY,
            commands: Vec::new(),
        }
    }

    /// Clears the target before drawing.
    pub fn cleared(mut self) -> Self {
        self.load = LoadOp::Clear;
        self
    }

    /// Sets the blend mode.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the sampled inputs.
    pub fn with_inputs(mut self, inputs: Vec<BufferId>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Selects the target layer.
    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the view-projection matrix.
    pub fn with_view_projection(mut self, view_projection: Mat4) -> Self {
        self.view_projection = view_projection;
        self
    }

    /// Appends a draw.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Returns the number of draws.
    pub fn draw_count(&self) -> usize {
        self.commands.len()
    }
}
