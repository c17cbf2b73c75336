//! Decoders for the pre-consolidation flat key space.
//!
//! The earliest app versions persisted every setting as its own unprefixed
//! key (`diap`, `nbCordes`, `ESelected`, `colordict`, ...). These decoders
//! exist only as a migration source: when no consolidated users document is
//! present, [`decode_legacy_profile`] assembles whatever flat keys survive
//! into a [`UserData`] tree for the seeded first profile. Nothing in the
//! crate writes these keys.
//!
//! Conventions the historical data forces on us:
//! - Key names drifted over time; [`FLAG_ALIASES`] maps each canonical name
//!   to the misspellings that shipped.
//! - The literal string `"null"` was written for absent values and must read
//!   as absent, exactly like a missing key.
//! - Booleans are the strings `"true"`/`"false"`, decoded by strict
//!   comparison: anything that is not `"true"` is `false`.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::backend::StorageBackend;
use crate::kv::KvAdapter;
use crate::model::{
    DisplaySettings, NoteColor, NoteSelection, SelectedNote, StringTuning, Tuning, UserData,
    CHROMATIC_NOTES,
};

/// Canonical flag name -> key names it was historically stored under
/// (canonical first).
static FLAG_ALIASES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        ("mancheDisplay", vec!["mancheDisplay"]),
        ("tunerDisplay", vec!["tunerDisplay", "tunderDisplay"]),
        ("scaleDisplay", vec!["scaleDisplay", "scalesDisplay"]),
        ("chordsDisplay", vec!["chordsDisplay"]),
        ("gameDisplay", vec!["gameDisplay"]),
        ("metronomeDisplay", vec!["metronomeDisplay"]),
    ])
});

/// Read a raw legacy value. Missing key and the literal `"null"` both mean
/// absent.
fn read_string<B: StorageBackend>(kv: &KvAdapter<B>, key: &str) -> Option<String> {
    match kv.get(key, false) {
        Some(v) if v == "null" => None,
        other => other,
    }
}

/// Strict boolean decode over the alias chain for a canonical flag name.
pub fn read_flag<B: StorageBackend>(kv: &KvAdapter<B>, canonical: &str) -> Option<bool> {
    let names = FLAG_ALIASES.get(canonical)?;
    for name in names {
        if let Some(raw) = read_string(kv, name) {
            return Some(raw == "true");
        }
    }
    None
}

pub fn decode_display_settings<B: StorageBackend>(kv: &KvAdapter<B>) -> DisplaySettings {
    let mut settings = DisplaySettings::default();
    if let Some(v) = read_flag(kv, "mancheDisplay") {
        settings.fretboard = v;
    }
    if let Some(v) = read_flag(kv, "tunerDisplay") {
        settings.tuner = v;
    }
    if let Some(v) = read_flag(kv, "scaleDisplay") {
        settings.scales = v;
    }
    if let Some(v) = read_flag(kv, "chordsDisplay") {
        settings.chords = v;
    }
    if let Some(v) = read_flag(kv, "gameDisplay") {
        settings.game = v;
    }
    if let Some(v) = read_flag(kv, "metronomeDisplay") {
        settings.metronome = v;
    }
    settings
}

/// `diap`, `nbCordes` and one `<n>tuning` key per string.
pub fn decode_tuning<B: StorageBackend>(kv: &KvAdapter<B>) -> Tuning {
    let mut tuning = Tuning::default();
    if let Some(d) = read_string(kv, "diap").and_then(|v| v.parse().ok()) {
        tuning.diapason = d;
    }
    if let Some(n) = read_string(kv, "nbCordes").and_then(|v| v.parse::<usize>().ok()) {
        tuning.string_count = n;
        tuning.strings = (0..n)
            .map(|i| StringTuning {
                string_index: i,
                note: read_string(kv, &format!("{}tuning", i))
                    .unwrap_or_else(|| "E".to_string()),
            })
            .collect();
    }
    tuning
}

/// One `<NOTE>Selected` key per chromatic note, plus `gammeSelected`.
pub fn decode_note_selection<B: StorageBackend>(kv: &KvAdapter<B>) -> NoteSelection {
    let selected = CHROMATIC_NOTES
        .iter()
        .map(|note| SelectedNote {
            note: (*note).to_string(),
            enabled: read_string(kv, &format!("{}Selected", note))
                .map(|raw| raw == "true")
                .unwrap_or(false),
        })
        .collect();
    NoteSelection {
        selected,
        scale: read_string(kv, "gammeSelected"),
    }
}

/// `colordict` (JSON object note -> color), falling back to the older
/// `oldnotescolor` key. Unknown notes are dropped; notes missing from the
/// stored map keep their default color, so the 12-entry invariant holds.
pub fn decode_note_colors<B: StorageBackend>(kv: &KvAdapter<B>) -> Vec<NoteColor> {
    let mut colors = UserData::default().colors;
    let stored = kv
        .get_value("colordict", false)
        .or_else(|| kv.get_value("oldnotescolor", false));
    if let Some(Value::Object(map)) = stored {
        for entry in &mut colors {
            if let Some(Value::String(color)) = map.get(&entry.note) {
                entry.color = color.clone();
            }
        }
    }
    colors
}

/// True when any known legacy flat key is present.
pub fn has_legacy_keys<B: StorageBackend>(kv: &KvAdapter<B>) -> bool {
    let simple = ["diap", "nbCordes", "colordict", "oldnotescolor", "gammeSelected"];
    if simple.iter().any(|k| kv.has(k, false)) {
        return true;
    }
    if CHROMATIC_NOTES
        .iter()
        .any(|n| kv.has(&format!("{}Selected", n), false))
    {
        return true;
    }
    FLAG_ALIASES
        .values()
        .flatten()
        .any(|name| kv.has(name, false))
}

/// Assemble a full [`UserData`] tree from the surviving flat keys, or `None`
/// when no legacy key exists at all.
pub fn decode_legacy_profile<B: StorageBackend>(kv: &KvAdapter<B>) -> Option<UserData> {
    if !has_legacy_keys(kv) {
        return None;
    }
    Some(UserData {
        settings: decode_display_settings(kv),
        tuning: decode_tuning(kv),
        notes: decode_note_selection(kv),
        colors: decode_note_colors(kv),
        ..UserData::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::fixtures::BackendFixture;
    use crate::backend::memory::MemoryBackend;

    fn kv_from(fixture: BackendFixture) -> KvAdapter<MemoryBackend> {
        KvAdapter::new(fixture.backend)
    }

    #[test]
    fn aliased_flag_names_are_reconciled() {
        // The tuner toggle only ever shipped under its misspelled key.
        let kv = kv_from(BackendFixture::new().with_raw("tunderDisplay", "true"));
        assert_eq!(read_flag(&kv, "tunerDisplay"), Some(true));
    }

    #[test]
    fn canonical_name_wins_over_alias() {
        let kv = kv_from(
            BackendFixture::new()
                .with_raw("scaleDisplay", "false")
                .with_raw("scalesDisplay", "true"),
        );
        assert_eq!(read_flag(&kv, "scaleDisplay"), Some(false));
    }

    #[test]
    fn null_literal_reads_as_absent() {
        let kv = kv_from(BackendFixture::new().with_raw("tunerDisplay", "null"));
        assert_eq!(read_flag(&kv, "tunerDisplay"), None);

        let kv = kv_from(BackendFixture::new().with_raw("gammeSelected", "null"));
        assert_eq!(decode_note_selection(&kv).scale, None);
    }

    #[test]
    fn boolean_decode_is_strict() {
        for raw in ["True", "1", "yes", "false", ""] {
            let kv = kv_from(BackendFixture::new().with_raw("gameDisplay", raw));
            assert_eq!(read_flag(&kv, "gameDisplay"), Some(false), "raw={raw:?}");
        }
        let kv = kv_from(BackendFixture::new().with_raw("gameDisplay", "true"));
        assert_eq!(read_flag(&kv, "gameDisplay"), Some(true));
    }

    #[test]
    fn tuning_decodes_per_string_keys() {
        let kv = kv_from(BackendFixture::new().with_legacy_flat_keys());
        let tuning = decode_tuning(&kv);
        assert_eq!(tuning.diapason, 432);
        assert_eq!(tuning.string_count, 7);
        assert_eq!(tuning.strings.len(), 7);
        assert_eq!(tuning.strings[0].note, "B");
        for (i, s) in tuning.strings.iter().enumerate() {
            assert_eq!(s.string_index, i);
        }
    }

    #[test]
    fn colors_keep_defaults_for_missing_notes() {
        let kv = kv_from(BackendFixture::new().with_raw("colordict", r##"{"A":"#123456"}"##));
        let colors = decode_note_colors(&kv);
        assert_eq!(colors.len(), 12);
        assert_eq!(
            colors.iter().find(|c| c.note == "A").unwrap().color,
            "#123456"
        );
        assert!(colors.iter().all(|c| !c.color.is_empty()));
    }

    #[test]
    fn full_profile_from_flat_keys() {
        let kv = kv_from(BackendFixture::new().with_legacy_flat_keys());
        let data = decode_legacy_profile(&kv).unwrap();
        assert!(data.settings.tuner);
        assert!(data.settings.scales);
        assert!(data.notes.selected.iter().any(|n| n.note == "E" && n.enabled));
        // GSelected was stored as "null": absent, so disabled.
        assert!(data.notes.selected.iter().any(|n| n.note == "G" && !n.enabled));
    }

    #[test]
    fn empty_store_yields_no_profile() {
        let kv = kv_from(BackendFixture::new());
        assert!(decode_legacy_profile(&kv).is_none());
    }
}
