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

//! A headless backend that records everything it is asked to do.

use super::{BufferDescriptor, BufferId, ProgramId, RenderBackend, RenderPass};
use crate::renderer::error::{RenderError, ResourceError};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One operation observed by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// A buffer was created.
    CreateBuffer(BufferId, BufferDescriptor),
    /// A buffer was destroyed.
    DestroyBuffer(BufferId),
    /// A pass was submitted.
    Submit(RenderPass),
    /// A buffer was copied into a layer of another.
    Blit {
        /// The copied buffer.
        source: BufferId,
        /// The receiving buffer.
        destination: BufferId,
        /// The receiving layer.
        layer: u32,
    },
}

/// A [`RenderBackend`] that keeps a log of every call instead of talking to a GPU.
///
/// Every program name resolves unless it was marked missing, and allocation
/// can be capped to simulate device exhaustion.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_buffer: u64,
    live: BTreeMap<BufferId, BufferDescriptor>,
    programs: HashMap<String, ProgramId>,
    missing_programs: HashSet<String>,
    buffer_limit: Option<usize>,
    log: Vec<RecordedCommand>,
}

impl RecordingBackend {
    /// Creates a backend with no allocation limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `find_program` return `None` for the given names.
    pub fn with_missing_programs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_programs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Fails allocations once `limit` buffers are alive.
    pub fn with_buffer_limit(mut self, limit: usize) -> Self {
        self.buffer_limit = Some(limit);
        self
    }

    /// The recorded operations, oldest first.
    pub fn log(&self) -> &[RecordedCommand] {
        &self.log
    }

    /// Forgets the recorded operations but keeps the live buffers.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// The submitted passes, in submission order.
    pub fn passes(&self) -> impl Iterator<Item = &RenderPass> {
        self.log.iter().filter_map(|c| match c {
            RecordedCommand::Submit(pass) => Some(pass),
            _ => None,
        })
    }

    /// The labels of the submitted passes, in submission order.
    pub fn pass_labels(&self) -> Vec<&'static str> {
        self.passes().map(|p| p.label).collect()
    }

    /// The number of buffers currently alive.
    pub fn live_buffer_count(&self) -> usize {
        self.live.len()
    }

    /// Returns the descriptor of a live buffer.
    pub fn descriptor(&self, id: BufferId) -> Option<&BufferDescriptor> {
        self.live.get(&id)
    }

    /// Returns the program id assigned to `name`, if it was ever resolved.
    pub fn program_id(&self, name: &str) -> Option<ProgramId> {
        self.programs.get(name).copied()
    }

    fn check_live(&self, id: BufferId) -> Result<(), RenderError> {
        if self.live.contains_key(&id) {
            Ok(())
        } else {
            Err(ResourceError::InvalidBuffer(id).into())
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        if self
            .buffer_limit
            .is_some_and(|limit| self.live.len() >= limit)
        {
            return Err(ResourceError::OutOfMemory {
                label: descriptor.label.clone(),
                size: descriptor.size,
            });
        }
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.live.insert(id, descriptor.clone());
        self.log
            .push(RecordedCommand::CreateBuffer(id, descriptor.clone()));
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if self.live.remove(&id).is_some() {
            self.log.push(RecordedCommand::DestroyBuffer(id));
        }
    }

    fn find_program(&mut self, name: &str) -> Option<ProgramId> {
        if self.missing_programs.contains(name) {
            return None;
        }
        let next = ProgramId(self.programs.len() as u32 + 1);
        Some(*self.programs.entry(name.to_string()).or_insert(next))
    }

    fn submit(&mut self, pass: RenderPass) -> Result<(), RenderError> {
        self.check_live(pass.target)?;
        for input in &pass.inputs {
            self.check_live(*input)?;
        }
        self.log.push(RecordedCommand::Submit(pass));
        Ok(())
    }

    fn blit(
        &mut self,
        source: BufferId,
        destination: BufferId,
        layer: u32,
    ) -> Result<(), RenderError> {
        self.check_live(source)?;
        self.check_live(destination)?;
        self.log.push(RecordedCommand::Blit {
            source,
            destination,
            layer,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Extent2D;
    use crate::renderer::api::BufferKind;

    fn desc(label: &str) -> BufferDescriptor {
        BufferDescriptor::new(label, BufferKind::HdrColor, Extent2D::new(4, 4))
    }

    #[test]
    fn test_buffer_limit_reports_out_of_memory() {
        let mut backend = RecordingBackend::new().with_buffer_limit(1);
        assert!(backend.create_buffer(&desc("A")).is_ok());
        let err = backend.create_buffer(&desc("B")).unwrap_err();
        assert!(matches!(err, ResourceError::OutOfMemory { ref label, .. } if label == "B"));
    }

    #[test]
    fn test_programs_resolve_stably_unless_missing() {
        let mut backend = RecordingBackend::new().with_missing_programs(["fs_missing"]);
        let a = backend.find_program("fs_tonemapping");
        assert_eq!(a, backend.find_program("fs_tonemapping"));
        assert!(a.is_some());
        assert_eq!(backend.find_program("fs_missing"), None);
    }

    #[test]
    fn test_submit_to_destroyed_buffer_fails() {
        let mut backend = RecordingBackend::new();
        let id = backend.create_buffer(&desc("A")).unwrap();
        backend.destroy_buffer(id);
        let result = backend.submit(RenderPass::new("late", id));
        assert_eq!(
            result,
            Err(RenderError::Resource(ResourceError::InvalidBuffer(id)))
        );
        assert_eq!(backend.live_buffer_count(), 0);
    }
}
