//! Tab playlists.
//!
//! Playlists are positional like trainings; tab entries inside a playlist
//! keep insertion order and stable ids. Tab entries may carry a
//! `file_handle_id`, which is session-scoped and must be revalidated against
//! the live registry before use.

use chrono::Utc;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::handles::{FileHandleRegistry, HandleId};
use crate::model::{Playlist, TabEntry};
use crate::profiles::UserStore;

/// Fields for a new tab entry; id and timestamp are assigned on insert.
#[derive(Debug, Clone, Default)]
pub struct NewTab {
    pub name: String,
    pub path: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub file_handle_id: Option<HandleId>,
}

pub struct TabStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> TabStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn playlists(&self) -> &[Playlist] {
        self.users
            .current_data()
            .map(|d| d.tabs.playlists.as_slice())
            .unwrap_or(&[])
    }

    pub fn create_playlist(&mut self, name: impl Into<String>) -> Result<Uuid> {
        let name = name.into();
        self.users.mutate_current(|data| {
            let playlist = Playlist::new(name, data.tabs.playlists.len());
            let id = playlist.id;
            data.tabs.playlists.push(playlist);
            Playlist::reposition(&mut data.tabs.playlists);
            id
        })
    }

    pub fn delete_playlist(&mut self, id: Uuid) -> Result<bool> {
        self.users.mutate_current(|data| {
            let before = data.tabs.playlists.len();
            data.tabs.playlists.retain(|p| p.id != id);
            Playlist::reposition(&mut data.tabs.playlists);
            data.tabs.playlists.len() < before
        })
    }

    pub fn rename_playlist(&mut self, id: Uuid, name: impl Into<String>) -> Result<bool> {
        let name = name.into();
        self.users.mutate_current(|data| {
            match data.tabs.playlists.iter_mut().find(|p| p.id == id) {
                Some(p) => {
                    p.name = name;
                    p.last_modified = Utc::now();
                    true
                }
                None => false,
            }
        })
    }

    /// Append a tab to a playlist. `None` when the playlist is unknown.
    pub fn add_tab(&mut self, playlist_id: Uuid, tab: NewTab) -> Result<Option<Uuid>> {
        self.users.mutate_current(|data| {
            let playlist = data.tabs.playlists.iter_mut().find(|p| p.id == playlist_id)?;
            let entry = TabEntry {
                id: Uuid::new_v4(),
                name: tab.name,
                path: tab.path,
                artist: tab.artist,
                album: tab.album,
                file_handle_id: tab.file_handle_id,
                added_at: Utc::now(),
            };
            let id = entry.id;
            playlist.tabs.push(entry);
            playlist.last_modified = Utc::now();
            Some(id)
        })
    }

    pub fn remove_tab(&mut self, playlist_id: Uuid, tab_id: Uuid) -> Result<bool> {
        self.users.mutate_current(|data| {
            let Some(playlist) = data.tabs.playlists.iter_mut().find(|p| p.id == playlist_id)
            else {
                return false;
            };
            let before = playlist.tabs.len();
            playlist.tabs.retain(|t| t.id != tab_id);
            if playlist.tabs.len() < before {
                playlist.last_modified = Utc::now();
                true
            } else {
                false
            }
        })
    }

    /// Tabs whose persisted handle id no longer resolves this session.
    pub fn dangling_tabs(&self, registry: &FileHandleRegistry) -> Vec<Uuid> {
        self.playlists()
            .iter()
            .flat_map(|p| p.tabs.iter())
            .filter(|t| {
                t.file_handle_id
                    .is_some_and(|id| registry.resolve(id).is_none())
            })
            .map(|t| t.id)
            .collect()
    }
}
