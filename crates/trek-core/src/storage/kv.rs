//! Key-value string stores
//!
//! The journal persists everything through the small [`KeyValueStore`]
//! contract: string keys, string values, whole-value replacement. Two
//! backends ship with the crate:
//!
//! - [`MemoryKv`]: in-process map, used by tests and throwaway sessions
//! - [`FileKv`]: one file per key, written atomically
//!
//! Neither backend offers transactions across keys. A `set_item` replaces
//! the previous value and the last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::error::{StorageError, StorageResult};

/// Asynchronous string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` if absent
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value for `key`
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key succeeds
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryKv {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

/// File-backed store
///
/// Each key lives in `<dir>/<key>.json`. Writes go to a temp file that is
/// synced and then renamed over the target, so readers never observe a
/// partially written value.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Total size in bytes of all key files
    pub async fn size_on_disk(&self) -> StorageResult<u64> {
        let mut total = 0;
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::from_read(e, self.dir.clone())),
        };

        let scan_error = |e: std::io::Error| StorageError::from_read(e, self.dir.clone());
        while let Some(item) = dir.next_entry().await.map_err(scan_error)? {
            let meta = item.metadata().await.map_err(scan_error)?;
            if meta.is_file() {
                total += meta.len();
            }
        }

        Ok(total)
    }
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes()).await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_write(e, path)),
        }
    }
}

/// Keys become file names, so keep them to a safe alphabet
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let temp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.sync_all()
        .await
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|source| StorageError::Rename {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })?;

    Ok(())
}
