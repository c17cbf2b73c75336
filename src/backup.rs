//! File-level export/import and the single-slot backup.
//!
//! Exports write the versioned envelope of [`crate::profiles`] to disk under
//! a sanitized, dated filename. Single-user import validates strictly and is
//! all-or-nothing; bulk import is deliberately best-effort per entry — one
//! bad record is logged and skipped so the rest of the batch still lands.
//! The two disagree on purpose; see DESIGN.md.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::{FretpadError, Result};
use crate::model::UserProfile;
use crate::profiles::UserStore;

pub const BACKUP_KEY: &str = "backup";

/// Outcome of a bulk import: which names landed, which failed and why.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Uuid>,
    pub failed: Vec<(String, String)>,
}

/// Single-slot snapshot of the whole collection. Writing replaces the
/// previous slot; there is no history.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupDocument {
    timestamp: DateTime<Utc>,
    current_user_id: Option<Uuid>,
    users: Vec<UserProfile>,
}

/// Collapse every run of non-alphanumerics to one underscore, lowercased.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(FretpadError::Serialization)?;
    fs::write(path, content).map_err(FretpadError::Io)?;
    Ok(())
}

/// Export one user to `<dir>/guitarapp_user_<name>_<date>.json`.
pub fn export_user_to_file<B: StorageBackend>(
    store: &mut UserStore<B>,
    id: Uuid,
    dir: &Path,
) -> Result<PathBuf> {
    let doc = store.export_user(id)?;
    let name = doc
        .user
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_default();
    let filename = format!(
        "guitarapp_user_{}_{}.json",
        sanitize_filename(&name),
        doc.export_date.format("%Y-%m-%d")
    );
    let path = dir.join(filename);
    write_json(&path, &serde_json::to_value(&doc)?)?;
    Ok(path)
}

/// Export the whole collection to `<dir>/guitarapp_all_users_<date>.json`.
pub fn export_all_users_to_file<B: StorageBackend>(
    store: &mut UserStore<B>,
    dir: &Path,
) -> Result<PathBuf> {
    let doc = store.export_all_users();
    let filename = format!(
        "guitarapp_all_users_{}.json",
        doc.export_date.format("%Y-%m-%d")
    );
    let path = dir.join(filename);
    write_json(&path, &serde_json::to_value(&doc)?)?;
    Ok(path)
}

pub fn import_user_from_file<B: StorageBackend>(
    store: &mut UserStore<B>,
    path: &Path,
    overwrite_existing: bool,
) -> Result<Uuid> {
    let content = fs::read_to_string(path).map_err(FretpadError::Io)?;
    let doc: Value = serde_json::from_str(&content)
        .map_err(|e| FretpadError::InvalidFormat(format!("not valid JSON: {}", e)))?;
    store.import_user(&doc, overwrite_existing)
}

/// Bulk import. The envelope shape is validated strictly (`version` and a
/// non-empty `users` array with `name`/`data` checked per entry), then each
/// entry is imported independently.
pub fn import_all_users_from_file<B: StorageBackend>(
    store: &mut UserStore<B>,
    path: &Path,
    overwrite_existing: bool,
) -> Result<ImportReport> {
    let content = fs::read_to_string(path).map_err(FretpadError::Io)?;
    let doc: Value = serde_json::from_str(&content)
        .map_err(|e| FretpadError::InvalidFormat(format!("not valid JSON: {}", e)))?;

    if doc.get("version").and_then(Value::as_str).is_none() {
        return Err(FretpadError::InvalidFormat(
            "missing version field".to_string(),
        ));
    }
    let users = doc
        .get("users")
        .and_then(Value::as_array)
        .ok_or_else(|| FretpadError::InvalidFormat("missing users array".to_string()))?;
    if users.is_empty() {
        return Err(FretpadError::InvalidFormat("users array is empty".to_string()));
    }

    let mut report = ImportReport::default();
    for entry in users {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        match store.import_user_entry(entry, overwrite_existing) {
            Ok(id) => report.imported.push(id),
            Err(e) => {
                warn!(user = %name, error = %e, "skipping entry during bulk import");
                report.failed.push((name, e.to_string()));
            }
        }
    }
    store.save();
    Ok(report)
}

/// Snapshot the live collection into the backup slot.
pub fn create_backup<B: StorageBackend>(store: &mut UserStore<B>) -> DateTime<Utc> {
    let doc = BackupDocument {
        timestamp: Utc::now(),
        current_user_id: store.current_user_id(),
        users: store.users().to_vec(),
    };
    let timestamp = doc.timestamp;
    store.kv_mut().set_json(BACKUP_KEY, &doc);
    timestamp
}

/// Replace the live collection with the backup slot's contents.
pub fn restore_from_backup<B: StorageBackend>(store: &mut UserStore<B>) -> Result<DateTime<Utc>> {
    let doc: BackupDocument = store
        .kv()
        .get_json(BACKUP_KEY)
        .ok_or_else(|| FretpadError::Store("no backup present".to_string()))?;
    store.replace_collection(doc.users, doc.current_user_id);
    Ok(doc.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::fixtures::BackendFixture;
    use crate::backend::memory::MemoryBackend;
    use crate::kv::KvAdapter;
    use serde_json::json;

    fn store() -> UserStore<MemoryBackend> {
        let mut s = UserStore::new(KvAdapter::new(BackendFixture::new().backend));
        s.initialize().unwrap();
        s
    }

    #[test]
    fn sanitize_collapses_runs_and_lowercases() {
        assert_eq!(sanitize_filename("Alice"), "alice");
        assert_eq!(sanitize_filename("Jean-Luc  Picard!"), "jean_luc_picard_");
        assert_eq!(sanitize_filename("éléonore"), "éléonore");
        assert_eq!(sanitize_filename("a///b"), "a_b");
    }

    #[test]
    fn export_filename_carries_name_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store();
        let id = store.create_user("Jean-Luc Picard", None, None).unwrap();
        let path = export_user_to_file(&mut store, id, dir.path()).unwrap();
        let filename = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(filename.starts_with("guitarapp_user_jean_luc_picard_"));
        assert!(filename.ends_with(".json"));
        assert!(path.exists());
    }

    #[test]
    fn file_round_trip_single_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store();
        let id = store.create_user("Alice", None, None).unwrap();
        store.switch_user(id).unwrap();
        store
            .mutate_current(|d| d.tuning.diapason = 415)
            .unwrap();
        let path = export_user_to_file(&mut store, id, dir.path()).unwrap();

        let count = store.users().len();
        let imported = import_user_from_file(&mut store, &path, false).unwrap();
        assert_eq!(store.users().len(), count + 1);
        assert_eq!(store.user(imported).unwrap().data.tuning.diapason, 415);
    }

    #[test]
    fn bulk_import_is_best_effort_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.json");
        let doc = json!({
            "version": "1.0.0",
            "exportDate": "2026-01-01T00:00:00Z",
            "users": [
                {"name": "Good", "data": {}},
                {"name": "NoData"},
                {"name": "AlsoGood", "data": {}}
            ]
        });
        fs::write(&path, doc.to_string()).unwrap();

        let mut store = store();
        let report = import_all_users_from_file(&mut store, &path, false).unwrap();
        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "NoData");
        assert!(store.users().iter().any(|u| u.name == "Good"));
        assert!(store.users().iter().any(|u| u.name == "AlsoGood"));
    }

    #[test]
    fn bulk_import_rejects_empty_users_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.json");
        fs::write(
            &path,
            json!({"version": "1.0.0", "users": []}).to_string(),
        )
        .unwrap();
        let mut store = store();
        assert!(matches!(
            import_all_users_from_file(&mut store, &path, false),
            Err(FretpadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn backup_restore_replaces_wholesale() {
        let mut store = store();
        let alice = store.create_user("Alice", None, None).unwrap();
        create_backup(&mut store);

        // Diverge after the snapshot.
        store.create_user("Bob", None, None).unwrap();
        store.delete_user(alice).unwrap();
        assert!(store.users().iter().all(|u| u.name != "Alice"));

        restore_from_backup(&mut store).unwrap();
        assert!(store.users().iter().any(|u| u.name == "Alice"));
        assert!(store.users().iter().all(|u| u.name != "Bob"));
    }

    #[test]
    fn restore_without_backup_fails() {
        let mut store = store();
        assert!(restore_from_backup(&mut store).is_err());
    }
}
