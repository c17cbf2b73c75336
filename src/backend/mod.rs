//! # Storage backends
//!
//! The persistence substrate is a flat, string-keyed, string-valued map —
//! the same contract the original app got from `localStorage`. The
//! [`StorageBackend`] trait keeps the rest of the crate decoupled from where
//! that map lives:
//!
//! - [`fs::FileBackend`]: production backend, the whole map in one JSON file,
//!   rewritten on every `set` so a completed write is durable on return.
//! - [`memory::MemoryBackend`]: in-memory map for tests, plus fixtures for
//!   seeding legacy documents.
//!
//! Backends are fallible; the policy of *never* surfacing storage failures to
//! callers lives one layer up, in [`crate::kv::KvAdapter`].

use crate::error::Result;

pub mod fs;
pub mod memory;

pub trait StorageBackend {
    /// Store a value. Must be durable when this returns.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Fetch a value, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently present.
    fn keys(&self) -> Result<Vec<String>>;
}
