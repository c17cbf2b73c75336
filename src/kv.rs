//! Prefix-scoped key-value adapter over a [`StorageBackend`].
//!
//! This is the one layer with swallow-and-degrade semantics: no method here
//! returns an error. Storage failures (quota, disabled store, corrupt value)
//! are logged and absorbed — reads fall back to the caller's default, writes
//! become no-ops. Everything above this layer can treat persistence as
//! infallible; everything below it reports honestly.
//!
//! Values: strings pass through untouched via [`KvAdapter::get`]/[`KvAdapter::set`];
//! structured values go through the `_json` variants. [`KvAdapter::get_value`]
//! decodes JSON and falls back to treating the raw bytes as a plain string
//! when decoding fails, which is how years-old hand-written values stay
//! readable.

use crate::backend::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_PREFIX: &str = "guitarapp_";

pub struct KvAdapter<B: StorageBackend> {
    backend: B,
    prefix: String,
}

impl<B: StorageBackend> KvAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_prefix(backend, DEFAULT_PREFIX)
    }

    pub fn with_prefix(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn full_key(&self, key: &str, use_prefix: bool) -> String {
        if use_prefix {
            format!("{}{}", self.prefix, key)
        } else {
            key.to_string()
        }
    }

    /// Store a raw string value. Prefixed by default; legacy flat keys are
    /// written with `use_prefix = false`.
    pub fn set(&mut self, key: &str, value: &str, use_prefix: bool) {
        let full = self.full_key(key, use_prefix);
        if let Err(e) = self.backend.set(&full, value) {
            warn!(key = %full, error = %e, "storage write failed, dropping value");
        }
    }

    pub fn get(&self, key: &str, use_prefix: bool) -> Option<String> {
        let full = self.full_key(key, use_prefix);
        match self.backend.get(&full) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %full, error = %e, "storage read failed, treating as absent");
                None
            }
        }
    }

    pub fn get_or(&self, key: &str, default: &str, use_prefix: bool) -> String {
        self.get(key, use_prefix)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn remove(&mut self, key: &str, use_prefix: bool) {
        let full = self.full_key(key, use_prefix);
        if let Err(e) = self.backend.remove(&full) {
            warn!(key = %full, error = %e, "storage remove failed");
        }
    }

    pub fn has(&self, key: &str, use_prefix: bool) -> bool {
        self.get(key, use_prefix).is_some()
    }

    /// Serialize a structured value as JSON under a prefixed key.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(s) => self.set(key, &s, true),
            Err(e) => warn!(key, error = %e, "serialization failed, dropping value"),
        }
    }

    /// Read a structured value from a prefixed key. Absent key, failed read
    /// and failed decode all collapse to `None` (decode failures are logged).
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key, true)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "stored value is not valid JSON, treating as absent");
                None
            }
        }
    }

    /// Read a value as JSON, falling back to the raw string when it does not
    /// parse. Used when scanning the legacy flat key space, where values are
    /// a mix of JSON and bare strings.
    pub fn get_value(&self, key: &str, use_prefix: bool) -> Option<Value> {
        let raw = self.get(key, use_prefix)?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Remove every key under this adapter's prefix. Unprefixed (legacy)
    /// keys are left alone.
    pub fn clear_all_with_prefix(&mut self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "storage key listing failed, clear skipped");
                return;
            }
        };
        for key in keys {
            if key.starts_with(&self.prefix) {
                if let Err(e) = self.backend.remove(&key) {
                    warn!(key = %key, error = %e, "storage remove failed during clear");
                }
            }
        }
    }

    /// All keys in the underlying store, prefixed or not. The migration path
    /// uses this to discover legacy flat keys.
    pub fn all_keys(&self) -> Vec<String> {
        match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "storage key listing failed");
                Vec::new()
            }
        }
    }
}
