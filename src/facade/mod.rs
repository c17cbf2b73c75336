//! Per-domain facade stores.
//!
//! Each store is a narrow, domain-shaped view borrowed from the
//! [`UserStore`](crate::profiles::UserStore): it holds no copy of the data,
//! reads through the current-user pointer on every access, and routes every
//! mutation through [`UserStore::mutate_current`], which persists the whole
//! collection immediately. No facade buffers or batches writes.
//!
//! Because the views are computed on demand, switching users requires no
//! refresh anywhere: the next read simply sees the other profile's tree.

pub mod media;
pub mod notes;
pub mod settings;
pub mod tabs;
pub mod trainings;
pub mod tuning;

pub use media::MediaStore;
pub use notes::NoteStore;
pub use settings::SettingsStore;
pub use tabs::TabStore;
pub use trainings::{DanglingHandle, TrainingStore, VideoTrainingStore};
pub use tuning::TuningStore;
