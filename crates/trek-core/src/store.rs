//! Entry store
//!
//! Maps the fixed `entries` key of a [`KeyValueStore`] to an ordered
//! `Vec<Entry>`. `save` always rewrites the whole collection, so no entry
//! is ever partially written.
//!
//! A plain `save` is last-writer-wins: two overlapping load/modify/save
//! cycles lose one of the changes. [`Journal`](crate::Journal) serializes
//! its own cycles and uses [`EntryStore::save_checked`] to notice writers
//! outside the process.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{JournalError, JournalResult};
use crate::models::Entry;
use crate::storage::schema::{self, SchemaCheck};
use crate::storage::{KeyValueStore, ENTRIES_KEY, SCHEMA_KEY, SCHEMA_VERSION};

/// Entries together with the exact text they were parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    /// `None` when the key was absent
    pub raw: Option<String>,
}

/// Persistence of the entry collection
#[derive(Clone)]
pub struct EntryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl EntryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the collection; an absent key is an empty journal
    pub async fn load(&self) -> JournalResult<Vec<Entry>> {
        Ok(self.load_snapshot().await?.entries)
    }

    /// Load the collection and keep the raw text for a later checked save
    pub async fn load_snapshot(&self) -> JournalResult<Snapshot> {
        self.check_schema().await?;

        let raw = self.kv.get_item(ENTRIES_KEY).await?;
        let entries = match raw.as_deref() {
            Some(text) => parse_entries(text)?,
            None => Vec::new(),
        };

        debug!(
            entries = entries.len(),
            bytes = raw.as_ref().map_or(0, |r| r.len()),
            "Loaded journal"
        );

        Ok(Snapshot { entries, raw })
    }

    /// Replace the stored collection
    pub async fn save(&self, entries: &[Entry]) -> JournalResult<()> {
        let json = serde_json::to_string(entries)?;

        if self.kv.get_item(SCHEMA_KEY).await?.is_none() {
            self.kv
                .set_item(SCHEMA_KEY, &SCHEMA_VERSION.to_string())
                .await?;
        }

        self.kv.set_item(ENTRIES_KEY, &json).await?;

        debug!(entries = entries.len(), bytes = json.len(), "Saved journal");
        Ok(())
    }

    /// Save only if the stored text still matches `snapshot`
    pub async fn save_checked(&self, snapshot: &Snapshot, entries: &[Entry]) -> JournalResult<()> {
        let current = self.kv.get_item(ENTRIES_KEY).await?;

        if current != snapshot.raw {
            warn!(
                expected_bytes = snapshot.raw.as_ref().map_or(0, |r| r.len()),
                found_bytes = current.as_ref().map_or(0, |r| r.len()),
                "Journal changed between load and save; refusing to overwrite"
            );
            return Err(JournalError::Conflict);
        }

        self.save(entries).await
    }

    /// Raw stored text, without parsing
    pub async fn load_raw(&self) -> JournalResult<Option<String>> {
        Ok(self.kv.get_item(ENTRIES_KEY).await?)
    }

    /// Copy `raw` under `key` so a reset never destroys data
    pub async fn write_backup(&self, key: &str, raw: &str) -> JournalResult<()> {
        self.kv.set_item(key, raw).await?;
        Ok(())
    }

    async fn check_schema(&self) -> JournalResult<()> {
        let marker = self.kv.get_item(SCHEMA_KEY).await?;

        match schema::check_schema(marker.as_deref()) {
            SchemaCheck::Unmarked | SchemaCheck::Supported(_) => Ok(()),
            SchemaCheck::TooNew(found) => Err(JournalError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            }),
            SchemaCheck::Malformed => {
                warn!(marker = ?marker, "Unreadable schema marker");
                Err(JournalError::CorruptStore {
                    details: format!("schema marker {:?} is not a version number", marker),
                })
            }
        }
    }
}

/// Parse stored text into entries, enforcing unique ids
fn parse_entries(text: &str) -> JournalResult<Vec<Entry>> {
    let entries: Vec<Entry> = serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, "Stored journal is not a valid entry array");
        JournalError::CorruptStore {
            details: e.to_string(),
        }
    })?;

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if !seen.insert(entry.id.as_str()) {
            return Err(JournalError::CorruptStore {
                details: format!("duplicate entry id '{}'", entry.id),
            });
        }
        if entry.title.trim().is_empty() {
            return Err(JournalError::CorruptStore {
                details: format!("entry '{}' has an empty title", entry.id),
            });
        }
    }

    Ok(entries)
}
