//! Journal errors
//!
//! Every failure is local to the operation that raised it. Callers get a
//! typed error and can keep the interface running.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors raised by journal operations
#[derive(Error, Debug)]
pub enum JournalError {
    /// A required field is missing or empty
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No entry has the given id
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    /// An id prefix matches more than one entry
    #[error("Ambiguous id '{prefix}' matches {} entries", .candidates.len())]
    AmbiguousId {
        prefix: String,
        candidates: Vec<String>,
    },

    /// Stored collection cannot be read as entries
    #[error("Journal store is corrupted: {details}")]
    CorruptStore { details: String },

    /// Stored collection was written by a newer version
    #[error("Journal store uses schema version {found}, this build supports up to {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// A device capability was refused
    #[error("Permission denied: allow {capability} access and try again")]
    PermissionDenied { capability: &'static str },

    /// Position fix failed after permission was granted
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Collection changed underneath a read-modify-write
    #[error("Journal changed while saving; reload and try again")]
    Conflict,

    /// Entries could not be encoded
    #[error("Failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl JournalError {
    /// Shorthand for a validation failure
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        JournalError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Check if the user can retry or fix this without losing data
    pub fn is_recoverable(&self) -> bool {
        match self {
            JournalError::Validation { .. }
            | JournalError::NotFound { .. }
            | JournalError::AmbiguousId { .. }
            | JournalError::PermissionDenied { .. }
            | JournalError::LocationUnavailable(_)
            | JournalError::Conflict => true,
            JournalError::Storage(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            JournalError::CorruptStore { .. } => Some(
                "Run `trek reset` to back up the damaged collection and start with an empty journal.",
            ),
            JournalError::UnsupportedSchema { .. } => {
                Some("Upgrade trek to a version that understands this journal.")
            }
            JournalError::Conflict => {
                Some("The journal changed since it was read. Reload and try again.")
            }
            JournalError::AmbiguousId { .. } => Some("Provide more characters of the id."),
            JournalError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;
