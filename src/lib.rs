//! # Fretpad Architecture
//!
//! Fretpad is the **persistence core of a guitar-practice app**: multi-user
//! profiles, per-domain settings, schema migration, import/export and the
//! facade over the native VST3 host. It is a library that happens to have a
//! CLI client, not the other way round.
//!
//! ## The Layer Stack
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - FretpadApi<B>: the one context object, built at startup  │
//! │  - Hands out short-lived facade-store borrows               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain Layer (profiles, facade/, backup, migrate, legacy)  │
//! │  - UserStore owns the collection and the current pointer    │
//! │  - Facade stores are views; every mutation persists at once │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (kv.rs over backend/)                        │
//! │  - StorageBackend trait: flat string map                    │
//! │  - FileBackend (production), MemoryBackend (testing)        │
//! │  - KvAdapter: prefix scoping + swallow-and-degrade policy   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Storage Failures Stop at the Adapter
//!
//! Everything above [`kv::KvAdapter`] treats persistence as infallible: a
//! quota error or corrupt value degrades to defaults and a `tracing` warning,
//! never to a user-facing error. The errors that *do* surface
//! ([`error::FretpadError`]) are rule violations: deleting the last profile,
//! switching to an unknown id, importing a malformed document.
//!
//! ## One Write Path
//!
//! All domain mutations funnel through
//! [`profiles::UserStore::mutate_current`]: mutate the current profile's
//! tree in place, then persist the whole collection. There is no buffering,
//! no batching, and — because every mutator takes `&mut` — no interleaving.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade — entry point for all operations
//! - [`profiles`]: The multi-user profile store and export/import
//! - [`facade`]: Per-domain views (trainings, tuning, notes, settings,
//!   media, tabs)
//! - [`backup`]: File export/import and the single-slot backup
//! - [`migrate`]: Forward-only schema migrations for the users document
//! - [`legacy`]: Decoders for the pre-consolidation flat key space
//! - [`model`]: Core data types ([`model::UserProfile`], [`model::UserData`])
//! - [`handles`]: Session-scoped file-handle registry
//! - [`bridge`]: Envelope facade over the native VST3 host
//! - [`kv`], [`backend`]: Storage adapter and backends
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the
//!   lib API)

pub mod api;
pub mod backend;
pub mod backup;
pub mod bridge;
pub mod error;
pub mod facade;
pub mod handles;
pub mod kv;
pub mod legacy;
pub mod migrate;
pub mod model;
pub mod profiles;
