//! Persisted layout of the entry collection
//!
//! The collection is a bare JSON array under [`ENTRIES_KEY`]. Its schema
//! version lives next to it under [`SCHEMA_KEY`] so the array itself stays
//! readable by anything that expects a plain list of entries.

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Key holding the JSON array of entries
pub const ENTRIES_KEY: &str = "entries";

/// Key holding the schema version of [`ENTRIES_KEY`]
pub const SCHEMA_KEY: &str = "entries.schema";

/// Prefix for keys that keep a copy of a collection replaced by reset
pub const BACKUP_KEY_PREFIX: &str = "entries.backup-";

/// Outcome of reading the schema marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCheck {
    /// Marker absent: a collection written before markers existed
    Unmarked,
    /// Marker matches a version this build reads
    Supported(u32),
    /// Marker names a newer version
    TooNew(u32),
    /// Marker is not a version number
    Malformed,
}

/// Interpret the raw marker value
pub fn check_schema(raw: Option<&str>) -> SchemaCheck {
    let Some(raw) = raw else {
        return SchemaCheck::Unmarked;
    };

    match raw.trim().parse::<u32>() {
        Ok(0) => SchemaCheck::Malformed,
        Ok(v) if v <= SCHEMA_VERSION => SchemaCheck::Supported(v),
        Ok(v) => SchemaCheck::TooNew(v),
        Err(_) => SchemaCheck::Malformed,
    }
}

/// Backup key for a reset performed at `unix_secs`
pub fn backup_key(unix_secs: i64) -> String {
    format!("{}{}", BACKUP_KEY_PREFIX, unix_secs)
}
