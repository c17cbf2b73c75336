//! Session-scoped file-handle registry.
//!
//! OS file handles picked by the user cannot be serialized, so persisted data
//! only ever stores an opaque [`HandleId`]. The live handle lives in this
//! registry, which is rebuilt empty on every process start — any id read back
//! from disk is a weak reference that may dangle and must go through
//! [`FileHandleRegistry::resolve`] before use. A miss is a normal outcome
//! (the UI prompts for re-selection), not an error.

use std::collections::HashMap;
use std::path::PathBuf;

pub type HandleId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct FileHandleRegistry {
    next_id: HandleId,
    handles: HashMap<HandleId, FileHandle>,
}

impl FileHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>) -> HandleId {
        let id = self.next_id;
        self.next_id += 1;
        self.handles.insert(id, FileHandle { path: path.into() });
        id
    }

    /// Look up a live handle. `None` means the id is dangling (typically a
    /// persisted id from a previous session) and the caller must ask the
    /// user to re-select the resource.
    pub fn resolve(&self, id: HandleId) -> Option<&FileHandle> {
        self.handles.get(&id)
    }

    pub fn release(&mut self, id: HandleId) -> Option<FileHandle> {
        self.handles.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
