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

use super::{Asset, AssetUUID};
use std::sync::{Arc, OnceLock};

/// A thread-safe, reference-counted handle to an asset that may still be loading.
///
/// Cloning a handle is cheap and every clone observes the same slot: once the
/// loader fulfills it, all holders see the asset. Polling with
/// [`is_ready`](Self::is_ready) never blocks.
#[derive(Debug)]
pub struct AssetHandle<T: Asset> {
    id: AssetUUID,
    slot: Arc<OnceLock<T>>,
}

impl<T: Asset> AssetHandle<T> {
    /// Creates a handle whose asset is already available.
    pub fn new(asset: T) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(asset);
        Self {
            id: AssetUUID::new(),
            slot: Arc::new(slot),
        }
    }

    /// Creates a handle for an asset that is still being loaded.
    pub fn pending() -> Self {
        Self {
            id: AssetUUID::new(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// Stores the loaded asset. Returns `false` if the handle was already fulfilled.
    pub fn fulfill(&self, asset: T) -> bool {
        self.slot.set(asset).is_ok()
    }

    /// Returns `true` once the asset data is available.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns the asset if it has finished loading.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// The stable identifier of the asset.
    #[inline]
    pub fn id(&self) -> AssetUUID {
        self.id
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slot: self.slot.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Blob(u32);
    impl Asset for Blob {}

    #[test]
    fn test_pending_handle_becomes_ready_for_all_clones() {
        let handle = AssetHandle::<Blob>::pending();
        let clone = handle.clone();
        assert!(!clone.is_ready());
        assert!(handle.fulfill(Blob(7)));
        assert!(clone.is_ready());
        assert_eq!(clone.get(), Some(&Blob(7)));
        assert_eq!(handle.id(), clone.id());
    }

    #[test]
    fn test_fulfill_twice_is_rejected() {
        let handle = AssetHandle::new(Blob(1));
        assert!(!handle.fulfill(Blob(2)));
        assert_eq!(handle.get(), Some(&Blob(1)));
    }
}
