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

//! Rendering lanes: everything the deferred compositor sequences.

mod context;
mod lod;
mod passes;
mod programs;
mod reflection_rebuild;
mod resource_cache;
mod shadow_rebuild;
mod stamp;
mod stats;
mod visibility;

pub use context::*;
pub use lod::*;
pub use passes::*;
pub use programs::*;
pub use reflection_rebuild::*;
pub use resource_cache::*;
pub use shadow_rebuild::*;
pub use stamp::*;
pub use stats::*;
pub use visibility::*;
