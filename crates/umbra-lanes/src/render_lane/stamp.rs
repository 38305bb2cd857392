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

/// Records the last frame in which a cached artifact was (re)considered.
///
/// Owned by the coordinator that owns the artifact. Comparing the stamp with
/// the current frame index guarantees a single rebuild attempt per frame no
/// matter how many cameras request the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationStamp {
    last_rebuilt_frame: Option<u64>,
}

impl GenerationStamp {
    /// Whether the artifact was already handled during `frame`.
    #[inline]
    pub fn is_current(&self, frame: u64) -> bool {
        self.last_rebuilt_frame == Some(frame)
    }

    /// Records `frame` as the last handled frame.
    #[inline]
    pub fn mark(&mut self, frame: u64) {
        self.last_rebuilt_frame = Some(frame);
    }

    /// The last handled frame, if any.
    #[inline]
    pub fn last_rebuilt_frame(&self) -> Option<u64> {
        self.last_rebuilt_frame
    }
}
