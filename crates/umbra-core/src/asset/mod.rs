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

//! Asset identity and non-blocking readiness handles.
//!
//! The pipeline never waits on asset I/O: a mesh that has not finished
//! streaming simply reports `is_ready() == false` and is skipped for the frame.

mod handle;
mod uuid;

pub use self::handle::AssetHandle;
pub use self::uuid::AssetUUID;

/// A marker trait for data that can be referenced through an [`AssetHandle`].
pub trait Asset: Send + Sync + 'static {}
