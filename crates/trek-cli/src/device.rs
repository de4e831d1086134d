//! Terminal stand-ins for device capabilities
//!
//! A photo is "picked" by naming a file on the command line and a position
//! fix comes from `--lat`/`--lon`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use trek_core::{Coordinates, ImagePicker, JournalError, JournalResult, LocationProvider, Permission};

/// Picks the image at a given path
pub struct PathImagePicker {
    path: PathBuf,
}

impl PathImagePicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImagePicker for PathImagePicker {
    async fn request_permission(&self) -> Permission {
        match tokio::fs::metadata(&self.path).await {
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Permission::Denied,
            _ => Permission::Granted,
        }
    }

    /// `file://` URI of the image; `None` when there is no such file
    async fn pick_image(&self) -> Option<String> {
        let path = tokio::fs::canonicalize(&self.path).await.ok()?;
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }
        Some(format!("file://{}", path.display()))
    }
}

/// A position given up front
pub struct FixedLocation {
    position: Coordinates,
}

impl FixedLocation {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> JournalResult<Coordinates> {
        let Coordinates {
            latitude,
            longitude,
        } = self.position;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(JournalError::LocationUnavailable(format!(
                "latitude {} is outside -90..90",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(JournalError::LocationUnavailable(format!(
                "longitude {} is outside -180..180",
                longitude
            )));
        }

        Ok(self.position)
    }
}
