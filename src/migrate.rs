//! Schema migrations for the consolidated users document.
//!
//! Migrations are forward-only and run on the raw `serde_json::Value` before
//! typed deserialization. Each step is pure and idempotent. Never edit or
//! delete a migration after it ships; append a new one.
//!
//! Version detection for documents written before the tag existed:
//! - a bare array of profiles is the oldest format (v0),
//! - an envelope without `schemaVersion` is v1,
//! - anything else carries its version in `schemaVersion`.

use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

pub const SCHEMA_VERSION: u64 = 3;

/// All migrations in order. `MIGRATIONS[n]` upgrades a vN document to vN+1.
const MIGRATIONS: &[fn(Value) -> Value] = &[wrap_bare_array, backfill_profiles, canonical_flag_keys];

pub fn detect_version(doc: &Value) -> u64 {
    if doc.is_array() {
        return 0;
    }
    doc.get("schemaVersion").and_then(Value::as_u64).unwrap_or(1)
}

/// Upgrade a document of any historical shape to the current schema.
/// Documents tagged newer than this build are passed through untouched
/// rather than down-labeled.
pub fn migrate(mut doc: Value) -> Value {
    let mut version = detect_version(&doc);
    if version > SCHEMA_VERSION {
        warn!(
            found = version,
            supported = SCHEMA_VERSION,
            "users document is from a newer version, leaving it as-is"
        );
        return doc;
    }
    while (version as usize) < MIGRATIONS.len() {
        debug!(from = version, to = version + 1, "migrating users document");
        doc = MIGRATIONS[version as usize](doc);
        version += 1;
    }
    if let Value::Object(map) = &mut doc {
        map.insert("schemaVersion".to_string(), json!(SCHEMA_VERSION));
    }
    doc
}

/// v0 -> v1: the oldest format was a bare array of profiles, current user
/// implied to be the first.
fn wrap_bare_array(doc: Value) -> Value {
    match doc {
        Value::Array(users) => {
            let current = users
                .first()
                .and_then(|u| u.get("id"))
                .cloned()
                .unwrap_or(Value::Null);
            json!({
                "users": users,
                "currentUserId": current,
                "lastModified": Value::Null,
            })
        }
        other => other,
    }
}

/// v1 -> v2: backfill `pictures` on profiles saved before the field existed,
/// and replace non-UUID legacy ids (the first versions used `"default"`)
/// with generated ones, rewriting `currentUserId` to match.
fn backfill_profiles(mut doc: Value) -> Value {
    let mut id_map: HashMap<String, String> = HashMap::new();

    if let Some(users) = doc.get_mut("users").and_then(Value::as_array_mut) {
        for user in users.iter_mut() {
            let Some(obj) = user.as_object_mut() else {
                continue;
            };
            let old_id = obj.get("id").and_then(Value::as_str).map(str::to_string);
            let needs_new_id = match old_id.as_deref() {
                Some(id) => Uuid::parse_str(id).is_err(),
                None => true,
            };
            if needs_new_id {
                let fresh = Uuid::new_v4().to_string();
                if let Some(old) = old_id {
                    id_map.insert(old, fresh.clone());
                }
                obj.insert("id".to_string(), json!(fresh));
            }

            let data = obj
                .entry("data".to_string())
                .or_insert_with(|| json!({}));
            if let Some(data) = data.as_object_mut() {
                data.entry("pictures".to_string())
                    .or_insert_with(|| json!([]));
            }
        }
    }

    if let Some(current) = doc
        .get("currentUserId")
        .and_then(Value::as_str)
        .and_then(|id| id_map.get(id))
        .cloned()
    {
        doc["currentUserId"] = json!(current);
    }
    doc
}

/// v2 -> v3: settings maps written through the drifted key names are folded
/// onto the canonical spelling. The canonical key wins when both exist.
fn canonical_flag_keys(mut doc: Value) -> Value {
    const RENAMES: &[(&str, &str)] = &[
        ("tunderDisplay", "tunerDisplay"),
        ("scalesDisplay", "scaleDisplay"),
    ];

    if let Some(users) = doc.get_mut("users").and_then(Value::as_array_mut) {
        for user in users.iter_mut() {
            let Some(settings) = user
                .get_mut("data")
                .and_then(|d| d.get_mut("settings"))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };
            for (old, canonical) in RENAMES {
                if let Some(v) = settings.remove(*old) {
                    settings.entry(canonical.to_string()).or_insert(v);
                }
            }
        }
    }
    doc
}
