//! Display toggle facade.

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::model::DisplaySettings;
use crate::profiles::UserStore;

/// The toggleable UI panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Fretboard,
    Tuner,
    Scales,
    Chords,
    Game,
    Metronome,
}

pub struct SettingsStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> SettingsStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn get(&self) -> DisplaySettings {
        self.users
            .current_data()
            .map(|d| d.settings.clone())
            .unwrap_or_default()
    }

    pub fn is_shown(&self, panel: Panel) -> bool {
        let s = self.get();
        match panel {
            Panel::Fretboard => s.fretboard,
            Panel::Tuner => s.tuner,
            Panel::Scales => s.scales,
            Panel::Chords => s.chords,
            Panel::Game => s.game,
            Panel::Metronome => s.metronome,
        }
    }

    pub fn set_shown(&mut self, panel: Panel, shown: bool) -> Result<()> {
        self.users.mutate_current(|data| {
            let s = &mut data.settings;
            match panel {
                Panel::Fretboard => s.fretboard = shown,
                Panel::Tuner => s.tuner = shown,
                Panel::Scales => s.scales = shown,
                Panel::Chords => s.chords = shown,
                Panel::Game => s.game = shown,
                Panel::Metronome => s.metronome = shown,
            }
        })
    }

    pub fn toggle(&mut self, panel: Panel) -> Result<bool> {
        let next = !self.is_shown(panel);
        self.set_shown(panel, next)?;
        Ok(next)
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

    #[test]
    fn defaults_show_only_the_fretboard() {
        let mut users = store();
        let settings = SettingsStore::new(&mut users);
        assert!(settings.is_shown(Panel::Fretboard));
        assert!(!settings.is_shown(Panel::Tuner));
        assert!(!settings.is_shown(Panel::Game));
    }

    #[test]
    fn toggles_are_per_user() {
        let mut users = store();
        SettingsStore::new(&mut users)
            .set_shown(Panel::Tuner, true)
            .unwrap();
        let other = users.create_user("Other", None, None).unwrap();
        users.switch_user(other).unwrap();
        assert!(!SettingsStore::new(&mut users).is_shown(Panel::Tuner));
    }

    #[test]
    fn toggle_returns_the_new_state() {
        let mut users = store();
        let mut settings = SettingsStore::new(&mut users);
        assert!(settings.toggle(Panel::Metronome).unwrap());
        assert!(!settings.toggle(Panel::Metronome).unwrap());
    }
}
