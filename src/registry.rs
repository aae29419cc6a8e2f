use std::collections::BTreeMap;

use tracing::warn;

use crate::events::DisplayId;
use crate::tasks::gallery::{GalleryHandle, WeakGalleryHandle};

/// Maps a display surface to the gallery that owns it.
///
/// Entries are only added. They hold weak handles, so a lookup for a gallery whose task has
/// ended yields `None`.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<DisplayId, WeakGalleryHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle`. The first gallery registered for a display wins.
    pub fn register(&mut self, handle: &GalleryHandle) -> bool {
        if self.entries.contains_key(handle.id()) {
            warn!(display = %handle.id(), "display already has a gallery; keeping the first");
            return false;
        }
        self.entries.insert(handle.id().clone(), handle.downgrade());
        true
    }

    pub fn get_instance(&self, display: &DisplayId) -> Option<GalleryHandle> {
        self.entries.get(display)?.upgrade()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DisplayId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
