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

//! Component facets attached to scene entities.
//!
//! Lights, probes and skylights are stored as the plain `umbra-core` types;
//! the facets defined here carry change tracking on top of their data.

mod model;
mod transform;

pub use self::model::{LodLimits, LodRange, ModelComponent};
pub use self::transform::Transform;
