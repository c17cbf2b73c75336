use super::StorageBackend;
use crate::error::Result;
use std::collections::BTreeMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use serde_json::json;

    /// Builder seeding a [`MemoryBackend`] with documents in the shapes the
    /// app has persisted over its history.
    pub struct BackendFixture {
        pub backend: MemoryBackend,
    }

    impl Default for BackendFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BackendFixture {
        pub fn new() -> Self {
            Self {
                backend: MemoryBackend::new(),
            }
        }

        /// The oldest consolidated format: a bare array of profiles.
        pub fn with_bare_array_doc(mut self, names: &[&str]) -> Self {
            let users: Vec<_> = names
                .iter()
                .map(|n| {
                    json!({
                        "id": n.to_lowercase(),
                        "name": n,
                        "createdAt": "2021-03-01T10:00:00Z",
                        "lastActive": "2021-03-01T10:00:00Z",
                        "data": {}
                    })
                })
                .collect();
            self.backend
                .set("guitarapp_users", &serde_json::to_string(&users).unwrap())
                .unwrap();
            self
        }

        /// A v1 envelope without `schemaVersion` and without `pictures`.
        pub fn with_v1_envelope(mut self, names: &[&str]) -> Self {
            let users: Vec<_> = names
                .iter()
                .map(|n| {
                    json!({
                        "id": n.to_lowercase(),
                        "name": n,
                        "createdAt": "2022-07-01T10:00:00Z",
                        "lastActive": "2022-07-01T10:00:00Z",
                        "data": { "trainings": [] }
                    })
                })
                .collect();
            let doc = json!({
                "users": users,
                "currentUserId": names.first().map(|n| n.to_lowercase()),
                "lastModified": "2022-07-01T10:00:00Z"
            });
            self.backend
                .set("guitarapp_users", &doc.to_string())
                .unwrap();
            self
        }

        /// Pre-consolidation flat keys, as the very first app versions wrote
        /// them (no prefix, one key per setting).
        pub fn with_legacy_flat_keys(mut self) -> Self {
            let b = &mut self.backend;
            b.set("diap", "432").unwrap();
            b.set("nbCordes", "7").unwrap();
            for (i, note) in ["B", "E", "A", "D", "G", "B", "E"].iter().enumerate() {
                b.set(&format!("{}tuning", i), note).unwrap();
            }
            b.set("ESelected", "true").unwrap();
            b.set("ASelected", "false").unwrap();
            b.set("GSelected", "null").unwrap();
            b.set("tunderDisplay", "true").unwrap();
            b.set("scalesDisplay", "true").unwrap();
            b.set("mancheDisplay", "true").unwrap();
            self
        }

        pub fn with_corrupt_users_doc(mut self) -> Self {
            self.backend
                .set("guitarapp_users", "{definitely not json")
                .unwrap();
            self
        }

        pub fn with_raw(mut self, key: &str, value: &str) -> Self {
            self.backend.set(key, value).unwrap();
            self
        }
    }
}
