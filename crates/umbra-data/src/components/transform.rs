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

use umbra_core::math::{Mat4, Vec3};

/// The world-space transform of an entity.
///
/// Writes go through [`set`](Self::set), which marks the transform as touched
/// until the scene clears its change markers at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    touched: bool,
}

impl Transform {
    /// Creates a transform from a matrix. New transforms start touched.
    pub fn new(matrix: Mat4) -> Self {
        Self {
            matrix,
            touched: true,
        }
    }

    /// Creates a translation-only transform.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat4::from_translation(translation))
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY)
    }

    /// The world matrix.
    #[inline]
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// The world-space position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// The scale along each local axis.
    pub fn scale(&self) -> Vec3 {
        Vec3::new(
            self.matrix.x_axis.truncate().length(),
            self.matrix.y_axis.truncate().length(),
            self.matrix.z_axis.truncate().length(),
        )
    }

    /// Replaces the world matrix and marks the transform as touched.
    pub fn set(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.touched = true;
    }

    /// Whether the transform was written since the last [`clear_touched`](Self::clear_touched).
    #[inline]
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Clears the change marker.
    #[inline]
    pub fn clear_touched(&mut self) {
        self.touched = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
