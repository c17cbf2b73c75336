//! Note selection, scale choice and per-note colors.

use crate::backend::StorageBackend;
use crate::error::{FretpadError, Result};
use crate::model::{NoteColor, SelectedNote, CHROMATIC_NOTES};
use crate::profiles::UserStore;

pub struct NoteStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> NoteStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn selected(&self) -> Vec<SelectedNote> {
        self.users
            .current_data()
            .map(|d| d.notes.selected.clone())
            .unwrap_or_default()
    }

    pub fn scale(&self) -> Option<String> {
        self.users.current_data().and_then(|d| d.notes.scale.clone())
    }

    pub fn colors(&self) -> Vec<NoteColor> {
        self.users
            .current_data()
            .map(|d| d.colors.clone())
            .unwrap_or_default()
    }

    fn check_note(note: &str) -> Result<()> {
        if CHROMATIC_NOTES.contains(&note) {
            Ok(())
        } else {
            Err(FretpadError::UnknownNote(note.to_string()))
        }
    }

    /// Flip one note's selection, returning its new state.
    pub fn toggle_note(&mut self, note: &str) -> Result<bool> {
        Self::check_note(note)?;
        self.users.mutate_current(|data| {
            match data.notes.selected.iter_mut().find(|n| n.note == note) {
                Some(n) => {
                    n.enabled = !n.enabled;
                    n.enabled
                }
                None => {
                    // Profiles migrated from partial legacy data may miss an
                    // entry; toggling creates it enabled.
                    data.notes.selected.push(SelectedNote {
                        note: note.to_string(),
                        enabled: true,
                    });
                    true
                }
            }
        })
    }

    pub fn set_note_enabled(&mut self, note: &str, enabled: bool) -> Result<()> {
        Self::check_note(note)?;
        self.users.mutate_current(|data| {
            match data.notes.selected.iter_mut().find(|n| n.note == note) {
                Some(n) => n.enabled = enabled,
                None => data.notes.selected.push(SelectedNote {
                    note: note.to_string(),
                    enabled,
                }),
            }
        })
    }

    pub fn set_scale(&mut self, scale: Option<String>) -> Result<()> {
        self.users.mutate_current(|data| {
            data.notes.scale = scale;
        })
    }

    /// Recolor one pitch class. The colors list keeps exactly one entry per
    /// chromatic note; unknown notes are rejected rather than appended.
    pub fn set_note_color(&mut self, note: &str, color: impl Into<String>) -> Result<()> {
        Self::check_note(note)?;
        let color = color.into();
        self.users.mutate_current(|data| {
            if let Some(entry) = data.colors.iter_mut().find(|c| c.note == note) {
                entry.color = color;
            }
        })
    }
}
