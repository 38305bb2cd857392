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

//! # Umbra Data
//!
//! The scene store the frame pipeline reads from: entity slots with
//! generation-checked handles, the component facets the renderer cares about
//! and the per-frame change markers that drive incremental rebuilds.

#![warn(missing_docs)]

pub mod components;
pub mod scene;

pub use components::{LodLimits, LodRange, ModelComponent, Transform};
pub use scene::Scene;
