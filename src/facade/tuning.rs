//! Instrument tuning facade.
//!
//! Maintains the invariant that the per-string list always matches the
//! string count, with dense 0..n-1 string indexes. Growing appends strings
//! tuned to E; shrinking drops from the high end.

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::model::{StringTuning, Tuning};
use crate::profiles::UserStore;

const NEW_STRING_NOTE: &str = "E";

pub struct TuningStore<'a, B: StorageBackend> {
    users: &'a mut UserStore<B>,
}

impl<'a, B: StorageBackend> TuningStore<'a, B> {
    pub(crate) fn new(users: &'a mut UserStore<B>) -> Self {
        Self { users }
    }

    pub fn get(&self) -> Tuning {
        self.users
            .current_data()
            .map(|d| d.tuning.clone())
            .unwrap_or_default()
    }

    pub fn set_string_count(&mut self, count: usize) -> Result<()> {
        self.users.mutate_current(|data| {
            let tuning = &mut data.tuning;
            tuning.string_count = count;
            tuning.strings.truncate(count);
            while tuning.strings.len() < count {
                tuning.strings.push(StringTuning {
                    string_index: tuning.strings.len(),
                    note: NEW_STRING_NOTE.to_string(),
                });
            }
            for (i, s) in tuning.strings.iter_mut().enumerate() {
                s.string_index = i;
            }
        })
    }

    /// Retune one string. `false` when the index is out of range.
    pub fn set_string_note(&mut self, index: usize, note: impl Into<String>) -> Result<bool> {
        let note = note.into();
        self.users.mutate_current(|data| {
            match data.tuning.strings.get_mut(index) {
                Some(s) => {
                    s.note = note;
                    true
                }
                None => false,
            }
        })
    }

    pub fn set_diapason(&mut self, diapason: u32) -> Result<()> {
        self.users.mutate_current(|data| {
            data.tuning.diapason = diapason;
        })
    }

    pub fn set_fret_count(&mut self, frets: u32) -> Result<()> {
        self.users.mutate_current(|data| {
            data.tuning.fret_count = frets;
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

    #[test]
    fn string_count_invariant_holds_for_any_count() {
        let mut users = store();
        let mut tuning = TuningStore::new(&mut users);
        for n in [0usize, 1, 4, 6, 7, 8, 12, 6, 0, 3] {
            tuning.set_string_count(n).unwrap();
            let t = tuning.get();
            assert_eq!(t.string_count, n);
            assert_eq!(t.strings.len(), n);
            for (i, s) in t.strings.iter().enumerate() {
                assert_eq!(s.string_index, i, "dense index after resize to {n}");
            }
        }
    }

    #[test]
    fn growing_keeps_existing_notes_and_appends_e() {
        let mut users = store();
        let mut tuning = TuningStore::new(&mut users);
        tuning.set_string_note(0, "D").unwrap();
        tuning.set_string_count(7).unwrap();
        let t = tuning.get();
        assert_eq!(t.strings[0].note, "D");
        assert_eq!(t.strings[6].note, "E");
    }

    #[test]
    fn retuning_out_of_range_reports_false() {
        let mut users = store();
        let mut tuning = TuningStore::new(&mut users);
        assert!(!tuning.set_string_note(99, "C").unwrap());
    }

    #[test]
    fn diapason_and_frets_round_trip() {
        let mut users = store();
        let mut tuning = TuningStore::new(&mut users);
        tuning.set_diapason(432).unwrap();
        tuning.set_fret_count(22).unwrap();
        let t = tuning.get();
        assert_eq!(t.diapason, 432);
        assert_eq!(t.fret_count, 22);
    }
}
