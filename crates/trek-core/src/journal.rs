//! Journal repository
//!
//! Every mutation is a read-modify-write over the whole collection:
//! lock, load a snapshot, transform in memory, checked save. The lock is
//! scoped to the `Journal`, so share one instance (for example behind an
//! `Arc`) between every surface that writes.
//!
//! ## Usage
//!
//! ```ignore
//! let journal = Journal::open(&config)?;
//!
//! let entry = journal.create(EntryDraft::new("Paris").description("Trip")).await?;
//! journal.update(&entry.id, EntryPatch::new().title("Paris, again")).await?;
//! journal.delete(&entry.id).await?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{JournalError, JournalResult};
use crate::models::{Entry, EntryDraft, EntryPatch};
use crate::storage::schema::backup_key;
use crate::storage::{FileKv, KeyValueStore, MemoryKv};
use crate::store::EntryStore;

/// Shortest prefix that resolves to a generated id
///
/// Matches the short id printed by listings.
pub const MIN_ID_PREFIX: usize = 8;

/// Summary of the journal contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalStats {
    pub entries: usize,
    pub with_image: usize,
    pub with_location: usize,
    pub newest: Option<DateTime<Utc>>,
    pub oldest: Option<DateTime<Utc>>,
}

/// Entry repository
pub struct Journal {
    store: EntryStore,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl Journal {
    /// Create a journal over any key-value backend
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: EntryStore::new(kv),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the file-backed journal in the configured data directory
    pub fn open(config: &Config) -> Self {
        Self::new(Arc::new(FileKv::new(config.store_dir())))
    }

    /// A journal that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()))
    }

    /// The underlying entry store
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Create an entry from a draft and put it first in the journal
    pub async fn create(&self, draft: EntryDraft) -> JournalResult<Entry> {
        draft.validate()?;

        let _guard = self.write_lock.lock().await;
        let snapshot = self.store.load_snapshot().await?;

        let id = unique_id(&snapshot.entries);
        let entry = Entry::from_draft(id, draft, Utc::now());

        let mut entries = Vec::with_capacity(snapshot.entries.len() + 1);
        entries.push(entry.clone());
        entries.extend(snapshot.entries.iter().cloned());

        self.store.save_checked(&snapshot, &entries).await?;

        info!(id = %entry.id, title = %entry.title, "Created entry");
        Ok(entry)
    }

    /// Apply a patch to an existing entry
    pub async fn update(&self, id: &str, patch: EntryPatch) -> JournalResult<Entry> {
        self.apply_patch(id, None, patch).await
    }

    /// Apply a patch only if the stored entry still equals `base`
    ///
    /// `base` is the entry the caller's edit started from. Any change made
    /// since then fails with [`JournalError::Conflict`] and nothing is
    /// written.
    pub async fn update_from(&self, base: &Entry, patch: EntryPatch) -> JournalResult<Entry> {
        self.apply_patch(&base.id, Some(base), patch).await
    }

    async fn apply_patch(
        &self,
        id: &str,
        base: Option<&Entry>,
        patch: EntryPatch,
    ) -> JournalResult<Entry> {
        patch.validate()?;

        let _guard = self.write_lock.lock().await;
        let snapshot = self.store.load_snapshot().await?;

        let mut entries = snapshot.entries.clone();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| JournalError::NotFound { id: id.to_string() })?;

        if let Some(base) = base {
            if *entry != *base {
                warn!(id, "Entry changed since the edit began; refusing to overwrite");
                return Err(JournalError::Conflict);
            }
        }

        entry.apply(patch);
        let updated = entry.clone();

        self.store.save_checked(&snapshot, &entries).await?;

        info!(id = %updated.id, "Updated entry");
        Ok(updated)
    }

    /// Remove an entry; deleting an unknown id is a no-op
    pub async fn delete(&self, id: &str) -> JournalResult<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.store.load_snapshot().await?;

        let entries: Vec<Entry> = snapshot
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();

        if entries.len() == snapshot.entries.len() {
            debug!(id, "Delete of unknown entry ignored");
            return Ok(());
        }

        self.store.save_checked(&snapshot, &entries).await?;

        info!(id, "Deleted entry");
        Ok(())
    }

    /// All entries, newest first
    pub async fn list(&self) -> JournalResult<Vec<Entry>> {
        self.store.load().await
    }

    /// Look up a single entry
    pub async fn get(&self, id: &str) -> JournalResult<Option<Entry>> {
        Ok(self.list().await?.into_iter().find(|e| e.id == id))
    }

    /// Resolve a full id or a unique id prefix
    ///
    /// Prefixes only match generated (UUID) ids and must be at least
    /// [`MIN_ID_PREFIX`] characters, so an id that no longer exists never
    /// resolves to a different entry that merely starts with it.
    pub async fn resolve_id(&self, prefix: &str) -> JournalResult<String> {
        let entries = self.list().await?;

        if entries.iter().any(|e| e.id == prefix) {
            return Ok(prefix.to_string());
        }

        let mut matches: Vec<String> = entries
            .into_iter()
            .filter(|e| {
                prefix.chars().count() >= MIN_ID_PREFIX
                    && e.id.starts_with(prefix)
                    && Uuid::parse_str(&e.id).is_ok()
            })
            .map(|e| e.id)
            .collect();

        match matches.len() {
            0 => Err(JournalError::NotFound {
                id: prefix.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(JournalError::AmbiguousId {
                prefix: prefix.to_string(),
                candidates: matches,
            }),
        }
    }

    /// Set the stored collection aside and start empty
    ///
    /// Works on corrupted stores too: the raw value is copied to a backup
    /// key before anything is written. Returns that key, or `None` when
    /// there was nothing to back up.
    pub async fn reset(&self) -> JournalResult<Option<String>> {
        let _guard = self.write_lock.lock().await;

        let backup = match self.store.load_raw().await? {
            Some(raw) => {
                let key = backup_key(Utc::now().timestamp());
                self.store.write_backup(&key, &raw).await?;
                Some(key)
            }
            None => None,
        };

        self.store.save(&[]).await?;

        info!(backup = ?backup, "Reset journal");
        Ok(backup)
    }

    /// Counts and date range of the journal
    pub async fn stats(&self) -> JournalResult<JournalStats> {
        let entries = self.list().await?;

        Ok(JournalStats {
            entries: entries.len(),
            with_image: entries.iter().filter(|e| e.image.is_some()).count(),
            with_location: entries.iter().filter(|e| e.location.is_some()).count(),
            newest: entries.iter().map(|e| e.date).max(),
            oldest: entries.iter().map(|e| e.date).min(),
        })
    }
}

/// Fresh UUID that no existing entry uses
fn unique_id(existing: &[Entry]) -> String {
    let taken: HashSet<&str> = existing.iter().map(|e| e.id.as_str()).collect();
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ENTRIES_KEY, SCHEMA_KEY};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn memory_journal() -> (Journal, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (Journal::new(kv.clone()), kv)
    }

    fn fixed(id: &str, title: &str) -> Entry {
        Entry {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            image: None,
            location: None,
            date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    /// The stored value must always parse as an array of entries
    async fn assert_store_is_entry_array(kv: &MemoryKv) {
        let raw = kv.get_item(ENTRIES_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let items = value.as_array().expect("stored value is a JSON array");
        for item in items {
            serde_json::from_value::<Entry>(item.clone()).unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_on_empty_store() {
        let (journal, kv) = memory_journal();

        let created = journal
            .create(EntryDraft::new("Paris").description("Trip"))
            .await
            .unwrap();

        let entries = journal.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], created);
        assert_eq!(entries[0].title, "Paris");
        assert_eq!(entries[0].description, "Trip");
        assert!(!entries[0].id.is_empty());
        assert!(entries[0].image.is_none());

        // Stored date is ISO-8601 text
        let raw = kv.get_item(ENTRIES_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let date = value[0]["date"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(date).is_ok());
    }

    #[tokio::test]
    async fn test_create_prepends_with_fresh_id() {
        let (journal, _) = memory_journal();

        let first = journal.create(EntryDraft::new("Lisbon")).await.unwrap();
        let second = journal
            .create(
                EntryDraft::new("Porto")
                    .image("file:///photos/porto.jpg")
                    .location("41.15794, -8.62910"),
            )
            .await
            .unwrap();

        let entries = journal.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
        assert_ne!(first.id, second.id);
        assert_eq!(entries[0].image.as_deref(), Some("file:///photos/porto.jpg"));
        assert_eq!(entries[0].location.as_deref(), Some("41.15794, -8.62910"));
    }

    #[tokio::test]
    async fn test_create_with_empty_title_changes_nothing() {
        let (journal, kv) = memory_journal();
        journal.create(EntryDraft::new("Keep")).await.unwrap();
        let before = journal.list().await.unwrap();
        let raw_before = kv.get_item(ENTRIES_KEY).await.unwrap();

        let err = journal.create(EntryDraft::new("")).await.unwrap_err();
        assert!(matches!(err, JournalError::Validation { field: "title", .. }));

        let err = journal
            .create(EntryDraft::new("  \t").description("no title"))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::Validation { .. }));

        assert_eq!(journal.list().await.unwrap(), before);
        assert_eq!(kv.get_item(ENTRIES_KEY).await.unwrap(), raw_before);
    }

    #[tokio::test]
    async fn test_create_skips_existing_timestamp_ids() {
        let (journal, _) = memory_journal();
        journal
            .store()
            .save(&[fixed("1716550000000", "Old")])
            .await
            .unwrap();

        let created = journal.create(EntryDraft::new("New")).await.unwrap();
        assert_ne!(created.id, "1716550000000");
        assert!(Uuid::parse_str(&created.id).is_ok());
    }

    #[tokio::test]
    async fn test_update_patches_and_keeps_date() {
        let (journal, kv) = memory_journal();
        journal
            .store()
            .save(&[fixed("1", "Rome"), fixed("2", "Milan")])
            .await
            .unwrap();

        let updated = journal
            .update(
                "2",
                EntryPatch::new()
                    .title("Milano")
                    .location(Some("45.46420, 9.19000".to_string())),
            )
            .await
            .unwrap();

        let entries = journal.list().await.unwrap();
        assert_eq!(entries[1], updated);
        assert_eq!(updated.id, "2");
        assert_eq!(updated.title, "Milano");
        assert_eq!(updated.description, "Milan description");
        assert_eq!(updated.location.as_deref(), Some("45.46420, 9.19000"));
        assert_eq!(updated.date, fixed("2", "Milan").date);

        // Untouched entry and order are preserved
        assert_eq!(entries[0], fixed("1", "Rome"));
        assert_store_is_entry_array(&kv).await;
    }

    #[tokio::test]
    async fn test_update_can_clear_optionals() {
        let (journal, _) = memory_journal();
        let created = journal
            .create(
                EntryDraft::new("Bergen")
                    .image("file:///b.jpg")
                    .location("60.39130, 5.32210"),
            )
            .await
            .unwrap();

        let updated = journal
            .update(&created.id, EntryPatch::new().image(None).location(None))
            .await
            .unwrap();

        assert!(updated.image.is_none());
        assert!(updated.location.is_none());
        assert_eq!(updated.title, "Bergen");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (journal, kv) = memory_journal();
        journal.store().save(&[fixed("1", "Rome")]).await.unwrap();
        let raw_before = kv.get_item(ENTRIES_KEY).await.unwrap();

        let err = journal
            .update("missing", EntryPatch::new().title("Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::NotFound { ref id } if id == "missing"));

        // No record was invented
        assert_eq!(journal.list().await.unwrap().len(), 1);
        assert_eq!(kv.get_item(ENTRIES_KEY).await.unwrap(), raw_before);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        let (journal, _) = memory_journal();
        journal.store().save(&[fixed("1", "Rome")]).await.unwrap();

        let err = journal
            .update("1", EntryPatch::new().title(""))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::Validation { .. }));
        assert_eq!(journal.list().await.unwrap()[0].title, "Rome");
    }

    #[tokio::test]
    async fn test_delete_scenario() {
        let (journal, _) = memory_journal();
        let a = fixed("1", "A");
        let b = fixed("2", "B");
        journal.store().save(&[a, b.clone()]).await.unwrap();

        journal.delete("1").await.unwrap();
        assert_eq!(journal.list().await.unwrap(), vec![b.clone()]);

        // Second delete of the same id is a no-op
        journal.delete("1").await.unwrap();
        assert_eq!(journal.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_delete_on_empty_store_writes_nothing() {
        let (journal, kv) = memory_journal();

        journal.delete("anything").await.unwrap();
        assert!(kv.get_item(ENTRIES_KEY).await.unwrap().is_none());
        assert!(journal.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_stays_valid_through_mixed_operations() {
        let (journal, kv) = memory_journal();

        let a = journal.create(EntryDraft::new("A")).await.unwrap();
        assert_store_is_entry_array(&kv).await;
        let b = journal
            .create(EntryDraft::new("B").description("second"))
            .await
            .unwrap();
        assert_store_is_entry_array(&kv).await;
        journal
            .update(&a.id, EntryPatch::new().description("first"))
            .await
            .unwrap();
        assert_store_is_entry_array(&kv).await;
        journal.delete(&b.id).await.unwrap();
        assert_store_is_entry_array(&kv).await;
        journal.delete(&a.id).await.unwrap();
        assert_store_is_entry_array(&kv).await;

        assert!(journal.list().await.unwrap().is_empty());
        assert_eq!(kv.get_item(SCHEMA_KEY).await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_do_not_lose_updates() {
        let journal = Arc::new(Journal::in_memory());

        let mut handles = Vec::new();
        for i in 0..20 {
            let journal = Arc::clone(&journal);
            handles.push(tokio::spawn(async move {
                journal
                    .create(EntryDraft::new(format!("Stop {}", i)))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = journal.list().await.unwrap();
        assert_eq!(entries.len(), 20);
        let ids: HashSet<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_delete_and_update() {
        let journal = Arc::new(Journal::in_memory());
        journal
            .store()
            .save(&[fixed("1", "A"), fixed("2", "B")])
            .await
            .unwrap();

        let deleter = {
            let journal = Arc::clone(&journal);
            tokio::spawn(async move { journal.delete("1").await })
        };
        let updater = {
            let journal = Arc::clone(&journal);
            tokio::spawn(async move { journal.update("2", EntryPatch::new().title("B2")).await })
        };
        deleter.await.unwrap().unwrap();
        updater.await.unwrap().unwrap();

        let entries = journal.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "2");
        assert_eq!(entries[0].title, "B2");
    }

    #[tokio::test]
    async fn test_corrupt_store_surfaces_and_reset_backs_up() {
        let (journal, kv) = memory_journal();
        kv.set_item(ENTRIES_KEY, "not json at all").await.unwrap();

        assert!(matches!(
            journal.list().await.unwrap_err(),
            JournalError::CorruptStore { .. }
        ));
        assert!(matches!(
            journal.create(EntryDraft::new("X")).await.unwrap_err(),
            JournalError::CorruptStore { .. }
        ));

        let backup = journal.reset().await.unwrap().unwrap();
        assert!(backup.starts_with("entries.backup-"));
        assert_eq!(
            kv.get_item(&backup).await.unwrap().as_deref(),
            Some("not json at all")
        );

        assert!(journal.list().await.unwrap().is_empty());
        journal.create(EntryDraft::new("Fresh")).await.unwrap();
        assert_eq!(journal.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_on_empty_store() {
        let (journal, _) = memory_journal();
        assert!(journal.reset().await.unwrap().is_none());
        assert!(journal.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_resolve_id() {
        let (journal, _) = memory_journal();
        let a = "0b9f2c1e-6a57-4e1d-9d3c-2f8a1b7c9e00";
        let b = "0b9f2c1e-77aa-4e1d-9d3c-2f8a1b7c9e01";
        let c = "5d1e7f20-1111-4222-8333-444455556666";
        journal
            .store()
            .save(&[fixed(a, "A"), fixed(b, "B"), fixed(c, "C"), fixed("xyz", "D")])
            .await
            .unwrap();

        assert_eq!(journal.get("xyz").await.unwrap().unwrap().title, "D");
        assert!(journal.get("nope").await.unwrap().is_none());

        // Exact ids of any shape
        assert_eq!(journal.resolve_id("xyz").await.unwrap(), "xyz");
        assert_eq!(journal.resolve_id(a).await.unwrap(), a);

        assert_eq!(journal.resolve_id("5d1e7f20").await.unwrap(), c);
        assert!(matches!(
            journal.resolve_id("0b9f2c1e").await.unwrap_err(),
            JournalError::AmbiguousId { ref candidates, .. } if candidates.len() == 2
        ));
        assert_eq!(journal.resolve_id("0b9f2c1e-6a").await.unwrap(), a);

        // Too short to be a prefix
        assert!(matches!(
            journal.resolve_id("5d1e").await.unwrap_err(),
            JournalError::NotFound { .. }
        ));
        assert!(matches!(
            journal.resolve_id("q").await.unwrap_err(),
            JournalError::NotFound { .. }
        ));
        assert!(matches!(
            journal.resolve_id("").await.unwrap_err(),
            JournalError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_stats() {
        let (journal, _) = memory_journal();
        assert_eq!(journal.stats().await.unwrap(), JournalStats::default());

        let mut older = fixed("1", "Old");
        older.image = Some("file:///old.jpg".to_string());
        let mut newer = fixed("2", "New");
        newer.date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        newer.location = Some("0.00000, 0.00000".to_string());
        journal
            .store()
            .save(&[newer.clone(), older.clone()])
            .await
            .unwrap();

        let stats = journal.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.with_image, 1);
        assert_eq!(stats.with_location, 1);
        assert_eq!(stats.newest, Some(newer.date));
        assert_eq!(stats.oldest, Some(older.date));
    }

    #[tokio::test]
    async fn test_file_backed_journal_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
            location_precision: 5,
        };

        let created = {
            let journal = Journal::open(&config);
            journal
                .create(EntryDraft::new("Paris").description("Trip"))
                .await
                .unwrap()
        };

        let reopened = Journal::open(&config);
        assert_eq!(reopened.list().await.unwrap(), vec![created]);
        assert!(config.store_dir().join("entries.json").exists());
    }

    #[tokio::test]
    async fn test_deleted_short_id_never_resolves_to_another() {
        let (journal, _) = memory_journal();
        journal
            .store()
            .save(&[fixed("1", "One"), fixed("12", "Twelve")])
            .await
            .unwrap();

        assert_eq!(journal.resolve_id("1").await.unwrap(), "1");
        journal.delete("1").await.unwrap();

        assert!(matches!(
            journal.resolve_id("1").await.unwrap_err(),
            JournalError::NotFound { .. }
        ));
        let ids: Vec<String> = journal.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["12".to_string()]);
    }

    #[tokio::test]
    async fn test_update_from_detects_stale_base() {
        let (journal, kv) = memory_journal();
        let base = journal
            .create(EntryDraft::new("Paris").description("old"))
            .await
            .unwrap();

        // Someone else edits after `base` was read
        journal
            .update(&base.id, EntryPatch::new().description("external edit"))
            .await
            .unwrap();
        let raw_before = kv.get_item(ENTRIES_KEY).await.unwrap();

        let err = journal
            .update_from(&base, EntryPatch::new().title("Paris, again").description("old"))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::Conflict));
        assert_eq!(kv.get_item(ENTRIES_KEY).await.unwrap(), raw_before);

        let stored = journal.get(&base.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Paris");
        assert_eq!(stored.description, "external edit");

        // A fresh base goes through
        let updated = journal
            .update_from(&stored, EntryPatch::new().title("Paris, again"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Paris, again");
        assert_eq!(updated.description, "external edit");
    }
}
