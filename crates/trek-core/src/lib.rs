//! trek core library
//!
//! This crate provides the core functionality for trek, a local travel
//! journal: entries with a title, description, optional photo reference,
//! optional location snapshot and a timestamp.
//!
//! # Architecture
//!
//! - **Key-value store**: string keys and values, swappable backend
//! - **Entry store**: the whole collection as one JSON array under `entries`
//! - **Journal**: create/update/delete/list as serialized read-modify-write
//! - **List view**: in-memory list refreshed on focus, gesture handling
//!
//! # Quick Start
//!
//! ```text
//! let journal = Journal::open(&Config::load()?);
//!
//! let entry = journal.create(EntryDraft::new("Paris").description("Trip")).await?;
//! let entries = journal.list().await?;
//! ```
//!
//! # Modules
//!
//! - `journal`: repository operations (main entry point)
//! - `models`: entries, drafts and patches
//! - `store`: the entry collection on top of a key-value store
//! - `storage`: key-value backends and the persisted layout
//! - `view`: list surface state
//! - `form`: create/edit surface state
//! - `device`: photo, location and notification contracts
//! - `config`: application configuration

pub mod config;
pub mod device;
pub mod error;
pub mod form;
pub mod journal;
pub mod models;
pub mod storage;
pub mod store;
pub mod view;

pub use config::Config;
pub use device::{
    Coordinates, ImagePicker, LocationProvider, Notice, NoticeLevel, Notifier, Permission,
};
pub use error::{JournalError, JournalResult};
pub use form::{EntryForm, FormMode};
pub use journal::{Journal, JournalStats};
pub use models::{Entry, EntryDraft, EntryPatch};
pub use storage::{FileKv, KeyValueStore, MemoryKv, StorageError};
pub use store::{EntryStore, Snapshot};
pub use view::{Confirmation, EntryListView, EMPTY_PLACEHOLDER};
