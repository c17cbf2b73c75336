//! Core data types: a [`UserProfile`] and the per-domain [`UserData`] tree it
//! owns.
//!
//! Every domain substructure is seeded by `UserData::default()`, so a freshly
//! constructed profile always carries the full tree — accessors never have to
//! lazily repair missing branches. Documents written by older versions of the
//! app are brought up to this shape by the migration chain (see
//! [`crate::migrate`]) before typed deserialization.
//!
//! Field renames keep the on-disk spelling of the original application,
//! including its historical typos (`noteSlectedList`, `nbfrettes`): the
//! persisted format is shared with data written years ago and is not ours to
//! clean up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handles::HandleId;

/// The 12 pitch classes, in the order the original app enumerates them.
pub const CHROMATIC_NOTES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Standard 6-string tuning, low string first.
pub const STANDARD_TUNING: [&str; 6] = ["E", "A", "D", "G", "B", "E"];

const DEFAULT_NOTE_COLORS: [(&str, &str); 12] = [
    ("A", "#e6194b"),
    ("A#", "#f58231"),
    ("B", "#ffe119"),
    ("C", "#bfef45"),
    ("C#", "#3cb44b"),
    ("D", "#42d4f4"),
    ("D#", "#4363d8"),
    ("E", "#911eb4"),
    ("F", "#f032e6"),
    ("F#", "#a9a9a9"),
    ("G", "#9a6324"),
    ("G#", "#800000"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub data: UserData,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            avatar: None,
            created_at: now,
            last_active: now,
            data: UserData::default(),
        }
    }
}

/// One user's complete, isolated data tree. No substructure is ever shared
/// between two profiles; import paths deep-copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub trainings: Vec<Training>,
    /// Legacy-separate list with the same shape as `trainings`. The original
    /// app grew it independently and merging the two was never attempted.
    #[serde(default, rename = "videos")]
    pub video_trainings: Vec<Training>,
    /// Materialized cache of a directory scan ("niou" = "new" in the original
    /// app's franglais). Invalidated wholesale, never repaired per path.
    #[serde(default, rename = "niouTrainingList")]
    pub scan_cache: Vec<ScanGroup>,
    #[serde(default)]
    pub video_metadata: VideoMetadata,
    #[serde(default)]
    pub settings: DisplaySettings,
    #[serde(default)]
    pub notes: NoteSelection,
    #[serde(default = "default_note_colors")]
    pub colors: Vec<NoteColor>,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub audio_files: Vec<FileRecord>,
    #[serde(default)]
    pub video_files: Vec<FileRecord>,
    #[serde(default)]
    pub pictures: Vec<FileRecord>,
    #[serde(default)]
    pub tabs: TabLibrary,
}

// Default is hand-written: the derive would leave `colors` empty, and the
// 12-entry invariant must hold from construction, not only after a
// deserialization round trip.
impl Default for UserData {
    fn default() -> Self {
        Self {
            trainings: Vec::new(),
            video_trainings: Vec::new(),
            scan_cache: Vec::new(),
            video_metadata: VideoMetadata::default(),
            settings: DisplaySettings::default(),
            notes: NoteSelection::default(),
            colors: default_note_colors(),
            tuning: Tuning::default(),
            audio_files: Vec::new(),
            video_files: Vec::new(),
            pictures: Vec::new(),
            tabs: TabLibrary::default(),
        }
    }
}

/// A practice training: an ordered, named group of video and audio refs.
///
/// `id` is assigned at creation and never recomputed; `position` is the dense
/// 0..n-1 ordering index, rewritten after every structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: Uuid,
    pub position: usize,
    pub name: String,
    #[serde(default, rename = "list")]
    pub videos: Vec<String>,
    #[serde(default)]
    pub audio_files: Vec<String>,
}

impl Training {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            name: name.into(),
            videos: Vec::new(),
            audio_files: Vec::new(),
        }
    }

    /// Rewrite `position` to the array index for every item.
    pub fn reposition(list: &mut [Training]) {
        for (i, t) in list.iter_mut().enumerate() {
            t.position = i;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanGroup {
    pub training_type: String,
    #[serde(default)]
    pub trainings: Vec<ScannedTraining>,
    #[serde(default)]
    pub video_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedTraining {
    pub name: String,
    #[serde(default)]
    pub videos: Vec<ScannedVideo>,
    /// Weak reference into the session handle registry; dangles after every
    /// restart and must be resolved before use.
    #[serde(default)]
    pub file_handle_id: Option<HandleId>,
    #[serde(default = "default_true")]
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedVideo {
    pub path: String,
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// Denormalized aggregate over `scan_cache`. Recomputed on every cache
/// replacement, never a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_videos: usize,
    #[serde(default)]
    pub total_trainings: usize,
    #[serde(default)]
    pub average_duration: f64,
}

impl VideoMetadata {
    pub fn compute(cache: &[ScanGroup]) -> Self {
        let mut total_videos = 0;
        let mut total_trainings = 0;
        let mut duration_sum = 0.0;
        let mut duration_count = 0usize;
        for group in cache {
            total_trainings += group.trainings.len();
            for training in &group.trainings {
                total_videos += training.videos.len();
                for video in &training.videos {
                    if let Some(d) = video.duration_secs {
                        duration_sum += d;
                        duration_count += 1;
                    }
                }
            }
        }
        let average_duration = if duration_count > 0 {
            duration_sum / duration_count as f64
        } else {
            0.0
        };
        Self {
            last_updated: Some(Utc::now()),
            total_videos,
            total_trainings,
            average_duration,
        }
    }
}

/// Boolean display toggles. Serialized under the historical key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(rename = "mancheDisplay", default = "default_true")]
    pub fretboard: bool,
    #[serde(rename = "tunerDisplay", default)]
    pub tuner: bool,
    #[serde(rename = "scaleDisplay", default)]
    pub scales: bool,
    #[serde(rename = "chordsDisplay", default)]
    pub chords: bool,
    #[serde(rename = "gameDisplay", default)]
    pub game: bool,
    #[serde(rename = "metronomeDisplay", default)]
    pub metronome: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            fretboard: true,
            tuner: false,
            scales: false,
            chords: false,
            game: false,
            metronome: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedNote {
    pub note: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSelection {
    // "Slected" is the spelling every persisted document carries.
    #[serde(rename = "noteSlectedList", alias = "noteSelectedList", default)]
    pub selected: Vec<SelectedNote>,
    #[serde(rename = "gammeSelected", default)]
    pub scale: Option<String>,
}

impl Default for NoteSelection {
    fn default() -> Self {
        Self {
            selected: CHROMATIC_NOTES
                .iter()
                .map(|n| SelectedNote {
                    note: (*n).to_string(),
                    enabled: false,
                })
                .collect(),
            scale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteColor {
    pub note: String,
    pub color: String,
}

fn default_note_colors() -> Vec<NoteColor> {
    DEFAULT_NOTE_COLORS
        .iter()
        .map(|(note, color)| NoteColor {
            note: (*note).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

/// Instrument geometry and per-string tuning.
///
/// Invariant: `strings.len() == string_count` and `string_index` values are
/// dense 0..n-1. [`crate::facade::TuningStore`] maintains this on every
/// string-count change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    #[serde(rename = "nbfrettes")]
    pub fret_count: u32,
    pub diapason: u32,
    #[serde(rename = "nbStrings")]
    pub string_count: usize,
    #[serde(rename = "tuningList")]
    pub strings: Vec<StringTuning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringTuning {
    #[serde(rename = "cordeId")]
    pub string_index: usize,
    #[serde(rename = "tuning")]
    pub note: String,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fret_count: 24,
            diapason: 440,
            string_count: STANDARD_TUNING.len(),
            strings: STANDARD_TUNING
                .iter()
                .enumerate()
                .map(|(i, n)| StringTuning {
                    string_index: i,
                    note: (*n).to_string(),
                })
                .collect(),
        }
    }
}

/// A user-attached media file. Either a plain path on disk or an inlined
/// data URL captured through the picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub data_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabLibrary {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub position: usize,
    pub name: String,
    #[serde(default)]
    pub tabs: Vec<TabEntry>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            position,
            name: name.into(),
            tabs: Vec::new(),
            created_at: now,
            last_modified: now,
        }
    }

    pub fn reposition(list: &mut [Playlist]) {
        for (i, p) in list.iter_mut().enumerate() {
            p.position = i;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabEntry {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub file_handle_id: Option<HandleId>,
    pub added_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}
