//! Training lists and the directory-scan cache.
//!
//! Two positional lists share the same shape: `trainings` and the
//! legacy-separate `videos` list ([`VideoTrainingStore`]). Structural changes
//! rewrite every item's `position` to its array index; positions are dense
//! 0..n-1 at all times and must not be cached across mutations.
//!
//! The scan cache (`niouTrainingList` on the wire) is a materialized snapshot
//! of a filesystem scan. When any cached path points into one of the known
//! dead roots of earlier installs, the whole cache is invalidated — partial,
//! per-path repair is deliberately not attempted.

use tracing::info;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::handles::{FileHandleRegistry, HandleId};
use crate::model::{ScanGroup, Training, VideoMetadata};
use crate::profiles::UserStore;

/// Root prefixes from machines this library's data has lived on. A scan
/// cache mentioning any of them predates the current install and is garbage.
pub const STALE_ROOT_MARKERS: &[&str] = &[
    "C:\\wamp64\\www\\guitarapp",
    "C:\\Users\\tom\\guitar-videos",
    "/Volumes/OLD-SSD/GuitarVideos",
];

/// A persisted handle id that no longer resolves in this session. The UI is
/// expected to prompt for directory re-selection, not to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingHandle {
    pub training: String,
    pub handle_id: HandleId,
}

pub struct TrainingStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> TrainingStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn list(&self) -> &[Training] {
        self.users
            .current_data()
            .map(|d| d.trainings.as_slice())
            .unwrap_or(&[])
    }

    pub fn add(&mut self, name: impl Into<String>) -> Result<Uuid> {
        let name = name.into();
        self.users.mutate_current(|data| {
            let training = Training::new(name, data.trainings.len());
            let id = training.id;
            data.trainings.push(training);
            Training::reposition(&mut data.trainings);
            id
        })
    }

    /// Remove by stable id. Returns `false` when the id is unknown (already
    /// removed, or resolved against a stale view).
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        self.users.mutate_current(|data| {
            let before = data.trainings.len();
            data.trainings.retain(|t| t.id != id);
            Training::reposition(&mut data.trainings);
            data.trainings.len() < before
        })
    }

    pub fn rename(&mut self, id: Uuid, name: impl Into<String>) -> Result<bool> {
        let name = name.into();
        self.users.mutate_current(|data| {
            match data.trainings.iter_mut().find(|t| t.id == id) {
                Some(t) => {
                    t.name = name;
                    true
                }
                None => false,
            }
        })
    }

    /// Move a training to a new slot, clamped to the list end.
    pub fn move_to(&mut self, id: Uuid, index: usize) -> Result<bool> {
        self.users.mutate_current(|data| {
            let Some(from) = data.trainings.iter().position(|t| t.id == id) else {
                return false;
            };
            let training = data.trainings.remove(from);
            let to = index.min(data.trainings.len());
            data.trainings.insert(to, training);
            Training::reposition(&mut data.trainings);
            true
        })
    }

    pub fn add_video(&mut self, id: Uuid, path: impl Into<String>) -> Result<bool> {
        let path = path.into();
        self.users.mutate_current(|data| {
            match data.trainings.iter_mut().find(|t| t.id == id) {
                Some(t) => {
                    t.videos.push(path);
                    true
                }
                None => false,
            }
        })
    }

    pub fn add_audio_file(&mut self, id: Uuid, path: impl Into<String>) -> Result<bool> {
        let path = path.into();
        self.users.mutate_current(|data| {
            match data.trainings.iter_mut().find(|t| t.id == id) {
                Some(t) => {
                    t.audio_files.push(path);
                    true
                }
                None => false,
            }
        })
    }

    // --- scan cache ---

    pub fn scan_cache(&self) -> &[ScanGroup] {
        self.users
            .current_data()
            .map(|d| d.scan_cache.as_slice())
            .unwrap_or(&[])
    }

    pub fn video_metadata(&self) -> VideoMetadata {
        self.users
            .current_data()
            .map(|d| d.video_metadata.clone())
            .unwrap_or_default()
    }

    /// Replace the scan cache wholesale and recompute the derived metadata.
    /// Synchronous and not cancellable; overlapping scans are serialized by
    /// the `&mut` receiver.
    pub fn set_scan_results(&mut self, groups: Vec<ScanGroup>) -> Result<()> {
        self.users.mutate_current(|data| {
            data.video_metadata = VideoMetadata::compute(&groups);
            data.scan_cache = groups;
        })
    }

    /// Drop the cache and reset metadata if any cached path points into a
    /// known stale root. All-or-nothing: one bad path condemns the lot.
    /// Returns `true` when an invalidation happened.
    pub fn invalidate_if_stale(&mut self) -> Result<bool> {
        let stale = self.scan_cache().iter().any(|group| {
            group.trainings.iter().any(|t| {
                t.videos
                    .iter()
                    .any(|v| STALE_ROOT_MARKERS.iter().any(|m| v.path.starts_with(m)))
            })
        });
        if !stale {
            return Ok(false);
        }
        info!("scan cache references a stale root, discarding it");
        self.users.mutate_current(|data| {
            data.scan_cache.clear();
            data.video_metadata = VideoMetadata {
                last_updated: None,
                total_videos: 0,
                total_trainings: 0,
                average_duration: 0.0,
            };
        })?;
        Ok(true)
    }

    /// Check every persisted `file_handle_id` against the session registry.
    /// Entries that no longer resolve are reported for re-selection.
    pub fn dangling_handles(&self, registry: &FileHandleRegistry) -> Vec<DanglingHandle> {
        self.scan_cache()
            .iter()
            .flat_map(|g| g.trainings.iter())
            .filter_map(|t| {
                let id = t.file_handle_id?;
                if registry.resolve(id).is_none() {
                    Some(DanglingHandle {
                        training: t.name.clone(),
                        handle_id: id,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Facade over the legacy-separate `videos` training list. Identical
/// contract to [`TrainingStore`]; the lists were never merged.
pub struct VideoTrainingStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> VideoTrainingStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn list(&self) -> &[Training] {
        self.users
            .current_data()
            .map(|d| d.video_trainings.as_slice())
            .unwrap_or(&[])
    }

    pub fn add(&mut self, name: impl Into<String>) -> Result<Uuid> {
        let name = name.into();
        self.users.mutate_current(|data| {
            let training = Training::new(name, data.video_trainings.len());
            let id = training.id;
            data.video_trainings.push(training);
            Training::reposition(&mut data.video_trainings);
            id
        })
    }

    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        self.users.mutate_current(|data| {
            let before = data.video_trainings.len();
            data.video_trainings.retain(|t| t.id != id);
            Training::reposition(&mut data.video_trainings);
            data.video_trainings.len() < before
        })
    }

    pub fn add_video(&mut self, id: Uuid, path: impl Into<String>) -> Result<bool> {
        let path = path.into();
        self.users.mutate_current(|data| {
            match data.video_trainings.iter_mut().find(|t| t.id == id) {
                Some(t) => {
                    t.videos.push(path);
                    true
                }
                None => false,
            }
        })
    }
}
