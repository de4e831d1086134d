//! Device capabilities consumed by the journal
//!
//! Photo picking, position fixes and notifications belong to the host
//! platform. The journal only sees these narrow contracts.

use async_trait::async_trait;

use crate::error::JournalResult;

/// Default number of fractional digits in a location snapshot
pub const DEFAULT_LOCATION_PRECISION: usize = 5;

/// Highest precision worth storing (about a millimetre)
pub const MAX_LOCATION_PRECISION: usize = 8;

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

/// Photo library access
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn request_permission(&self) -> Permission;

    /// URI of the picked image, `None` if the user cancelled
    async fn pick_image(&self) -> Option<String>;
}

/// Position source
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> JournalResult<Coordinates>;
}

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// "lat, lon" with a fixed number of fractional digits
    pub fn format(&self, precision: usize) -> String {
        let precision = precision.min(MAX_LOCATION_PRECISION);
        format!(
            "{:.p$}, {:.p$}",
            self.latitude,
            self.longitude,
            p = precision
        )
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// A short user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            detail: None,
        }
    }

    pub fn failure(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Fire-and-forget notifications; nothing depends on delivery
pub trait Notifier {
    fn notify(&self, notice: Notice);
}
