//! Storage layer
//!
//! A key-value string store holds the journal. The backend is swappable
//! behind [`KeyValueStore`]; the entry collection itself is one JSON value
//! under a fixed key.
//!
//! ## Layout
//!
//! - `entries`: JSON array of entries (newest first)
//! - `entries.schema`: schema version of `entries`
//! - `entries.backup-<secs>`: collections set aside by a reset

pub mod error;
pub mod kv;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use kv::{FileKv, KeyValueStore, MemoryKv};
pub use schema::{ENTRIES_KEY, SCHEMA_KEY, SCHEMA_VERSION};
