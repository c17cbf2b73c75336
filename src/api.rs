//! # API Facade
//!
//! [`FretpadApi`] is the single entry point for every operation and the one
//! context object a client constructs at process start — there are no
//! module-level singletons. It owns the [`UserStore`], the session
//! [`FileHandleRegistry`], and hands out the per-domain facade stores as
//! short-lived borrows, so a client can never hold a view across a user
//! switch.
//!
//! Generic over [`StorageBackend`]:
//! - Production: `FretpadApi<FileBackend>`
//! - Testing: `FretpadApi<MemoryBackend>`

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::backup::{self, ImportReport};
use crate::error::Result;
use crate::facade::{
    MediaStore, NoteStore, SettingsStore, TabStore, TrainingStore, TuningStore, VideoTrainingStore,
};
use crate::handles::FileHandleRegistry;
use crate::kv::KvAdapter;
use crate::model::UserProfile;
use crate::profiles::{ExportDocument, ProfileUpdate, UserStore};

pub struct FretpadApi<B: StorageBackend> {
    users: UserStore<B>,
    handles: FileHandleRegistry,
}

impl<B: StorageBackend> FretpadApi<B> {
    /// Build the context and run the startup routine (load-or-seed plus
    /// migrations). The returned value is fully initialized: exactly one
    /// current user exists.
    pub fn open(backend: B) -> Result<Self> {
        let mut users = UserStore::new(KvAdapter::new(backend));
        users.initialize()?;
        let mut api = Self {
            users,
            handles: FileHandleRegistry::new(),
        };
        // Scan caches from a previous machine are discarded at startup, not
        // on first access.
        api.trainings().invalidate_if_stale()?;
        Ok(api)
    }

    // --- profiles ---

    pub fn users(&self) -> &[UserProfile] {
        self.users.users()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.users.current_user()
    }

    pub fn create_user(
        &mut self,
        name: impl Into<String>,
        email: Option<String>,
        avatar: Option<String>,
    ) -> Result<Uuid> {
        self.users.create_user(name, email, avatar)
    }

    pub fn delete_user(&mut self, id: Uuid) -> Result<()> {
        self.users.delete_user(id)
    }

    pub fn switch_user(&mut self, id: Uuid) -> Result<()> {
        self.users.switch_user(id)
    }

    pub fn update_user_profile(&mut self, id: Uuid, update: ProfileUpdate) -> Result<()> {
        self.users.update_user_profile(id, update)
    }

    // --- facade stores ---

    pub fn trainings(&mut self) -> TrainingStore<'_, B> {
        TrainingStore::new(&mut self.users)
    }

    pub fn video_trainings(&mut self) -> VideoTrainingStore<'_, B> {
        VideoTrainingStore::new(&mut self.users)
    }

    pub fn tuning(&mut self) -> TuningStore<'_, B> {
        TuningStore::new(&mut self.users)
    }

    pub fn notes(&mut self) -> NoteStore<'_, B> {
        NoteStore::new(&mut self.users)
    }

    pub fn settings(&mut self) -> SettingsStore<'_, B> {
        SettingsStore::new(&mut self.users)
    }

    pub fn media(&mut self) -> MediaStore<'_, B> {
        MediaStore::new(&mut self.users)
    }

    pub fn tabs(&mut self) -> TabStore<'_, B> {
        TabStore::new(&mut self.users)
    }

    // --- session handles ---

    pub fn handles(&self) -> &FileHandleRegistry {
        &self.handles
    }

    pub fn handles_mut(&mut self) -> &mut FileHandleRegistry {
        &mut self.handles
    }

    // --- export / import / backup ---

    pub fn export_user(&mut self, id: Uuid) -> Result<ExportDocument> {
        self.users.export_user(id)
    }

    pub fn export_user_to_file(&mut self, id: Uuid, dir: &Path) -> Result<PathBuf> {
        backup::export_user_to_file(&mut self.users, id, dir)
    }

    pub fn export_all_users_to_file(&mut self, dir: &Path) -> Result<PathBuf> {
        backup::export_all_users_to_file(&mut self.users, dir)
    }

    pub fn import_user_from_file(&mut self, path: &Path, overwrite: bool) -> Result<Uuid> {
        backup::import_user_from_file(&mut self.users, path, overwrite)
    }

    pub fn import_all_users_from_file(
        &mut self,
        path: &Path,
        overwrite: bool,
    ) -> Result<ImportReport> {
        backup::import_all_users_from_file(&mut self.users, path, overwrite)
    }

    pub fn create_backup(&mut self) -> chrono::DateTime<chrono::Utc> {
        backup::create_backup(&mut self.users)
    }

    pub fn restore_from_backup(&mut self) -> Result<chrono::DateTime<chrono::Utc>> {
        backup::restore_from_backup(&mut self.users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    #[test]
    fn open_initializes_exactly_one_profile() {
        let api = FretpadApi::open(MemoryBackend::new()).unwrap();
        assert_eq!(api.users().len(), 1);
        assert!(api.current_user().is_some());
    }

    #[test]
    fn facade_views_follow_the_current_user() {
        let mut api = FretpadApi::open(MemoryBackend::new()).unwrap();
        api.trainings().add("alternate picking").unwrap();
        let bob = api.create_user("Bob", None, None).unwrap();
        api.switch_user(bob).unwrap();
        assert!(api.trainings().list().is_empty());
        assert!(api.tuning().get().strings.len() == 6);
    }

    #[test]
    fn open_discards_stale_scan_caches() {
        use crate::facade::trainings::STALE_ROOT_MARKERS;
        use crate::model::{ScanGroup, ScannedTraining, ScannedVideo};

        let mut api = FretpadApi::open(MemoryBackend::new()).unwrap();
        api.trainings()
            .set_scan_results(vec![ScanGroup {
                training_type: "licks".to_string(),
                video_count: 1,
                trainings: vec![ScannedTraining {
                    name: "bends".to_string(),
                    file_handle_id: None,
                    show: true,
                    videos: vec![ScannedVideo {
                        path: format!("{}\\a.mp4", STALE_ROOT_MARKERS[0]),
                        duration_secs: None,
                    }],
                }],
            }])
            .unwrap();
        let backend = api.users.kv().backend().clone();

        let mut reopened = FretpadApi::open(backend).unwrap();
        assert!(reopened.trainings().scan_cache().is_empty());
    }

    #[test]
    fn handles_are_session_scoped() {
        let mut api = FretpadApi::open(MemoryBackend::new()).unwrap();
        let id = api.handles_mut().register("/videos");
        assert!(api.handles().resolve(id).is_some());
    }
}
