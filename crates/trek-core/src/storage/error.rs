//! Errors raised by key-value backends

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// ENOSPC on Linux and macOS
const NO_SPACE_OS_ERROR: i32 = 28;

/// Why a backend could not read or write a key
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create journal directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No permission to use '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Ran out of disk space writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Reading '{path}' failed: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Writing '{path}' failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but holds bytes that are not UTF-8
    #[error("'{path}' does not hold text")]
    NotText { path: PathBuf },

    /// The new value was written but could not replace the old one
    #[error("Replacing '{to}' with '{from}' failed: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Store key '{key}' may only use ASCII letters, digits, '-', '_' and '.'")]
    InvalidKey { key: String },
}

impl StorageError {
    /// Classify a failed write, temp file creation or removal
    pub fn from_write(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied {
                path,
                source: error,
            }
        } else if is_out_of_space(&error) {
            StorageError::DiskFull {
                path,
                source: error,
            }
        } else {
            StorageError::Write {
                path,
                source: error,
            }
        }
    }

    /// Classify a failed read or directory scan
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::InvalidData => StorageError::NotText { path },
            _ => StorageError::Read {
                path,
                source: error,
            },
        }
    }

    /// Retrying after the user fixes the environment can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. } | StorageError::PermissionDenied { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free some disk space, then repeat the command."),
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => Some(
                "Make sure you own the trek data directory, or point data_dir somewhere writable.",
            ),
            StorageError::NotText { .. } => Some(
                "Something other than trek wrote this file. Run `trek reset` to set it aside.",
            ),
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    error.raw_os_error() == Some(NO_SPACE_OS_ERROR)
        || error.to_string().to_lowercase().contains("no space left")
}

pub type StorageResult<T> = Result<T, StorageError>;
