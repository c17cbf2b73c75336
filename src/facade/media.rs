//! Attached media files: audio, video and pictures.

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::model::FileRecord;
use crate::profiles::UserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Picture,
}

pub struct MediaStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> MediaStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn list(&self, kind: MediaKind) -> &[FileRecord] {
        let Some(data) = self.users.current_data() else {
            return &[];
        };
        match kind {
            MediaKind::Audio => &data.audio_files,
            MediaKind::Video => &data.video_files,
            MediaKind::Picture => &data.pictures,
        }
    }

    pub fn add(&mut self, kind: MediaKind, record: FileRecord) -> Result<()> {
        self.users.mutate_current(|data| {
            let list = match kind {
                MediaKind::Audio => &mut data.audio_files,
                MediaKind::Video => &mut data.video_files,
                MediaKind::Picture => &mut data.pictures,
            };
            list.push(record);
        })
    }

    /// Remove by file name. Returns `false` when no record matches.
    pub fn remove(&mut self, kind: MediaKind, name: &str) -> Result<bool> {
        self.users.mutate_current(|data| {
            let list = match kind {
                MediaKind::Audio => &mut data.audio_files,
                MediaKind::Video => &mut data.video_files,
                MediaKind::Picture => &mut data.pictures,
            };
            let before = list.len();
            list.retain(|f| f.name != name);
            list.len() < before
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::fixtures::BackendFixture;
    use crate::backend::memory::MemoryBackend;
    use crate::kv::KvAdapter;

    fn store() -> UserStore<MemoryBackend> {
        let mut s = UserStore::new(KvAdapter::new(BackendFixture::new().backend));
        s.initialize().unwrap();
        s
    }

    fn record(name: &str) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            size: 1024,
            mime_type: Some("audio/wav".to_string()),
            ..FileRecord::default()
        }
    }

    #[test]
    fn lists_are_independent_per_kind() {
        let mut users = store();
        let mut media = MediaStore::new(&mut users);
        media.add(MediaKind::Audio, record("riff.wav")).unwrap();
        media.add(MediaKind::Picture, record("stage.jpg")).unwrap();
        assert_eq!(media.list(MediaKind::Audio).len(), 1);
        assert_eq!(media.list(MediaKind::Picture).len(), 1);
        assert!(media.list(MediaKind::Video).is_empty());
    }

    #[test]
    fn remove_reports_whether_something_matched() {
        let mut users = store();
        let mut media = MediaStore::new(&mut users);
        media.add(MediaKind::Audio, record("riff.wav")).unwrap();
        assert!(media.remove(MediaKind::Audio, "riff.wav").unwrap());
        assert!(!media.remove(MediaKind::Audio, "riff.wav").unwrap());
    }
}
