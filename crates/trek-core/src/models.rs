//! Data models for trek
//!
//! [`Entry`] is the only persisted record. [`EntryDraft`] and [`EntryPatch`]
//! are the inputs of create and update.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{JournalError, JournalResult};

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier (opaque string)
    pub id: String,
    /// Entry title, never empty
    pub title: String,
    /// Free text, possibly empty
    #[serde(default)]
    pub description: String,
    /// Reference to a picked photo; the journal does not own the bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// "latitude, longitude" captured when the entry was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When the entry was created
    pub date: DateTime<Utc>,
}

impl Entry {
    /// Build an entry from a validated draft
    pub(crate) fn from_draft(id: String, draft: EntryDraft, date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            image: draft.image,
            location: draft.location,
            date,
        }
    }

    /// Apply a patch in place; `id` and `date` never change
    pub(crate) fn apply(&mut self, patch: EntryPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
    }

    /// Description cut to `max_chars` characters, with "..." when cut
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.description.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    /// Creation time in the local timezone, for display
    pub fn local_date(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Input for creating an entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
}

impl EntryDraft {
    /// Create a draft with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Reject drafts without a title
    pub fn validate(&self) -> JournalResult<()> {
        validate_title(&self.title)
    }
}

/// Changes to apply to an existing entry
///
/// `None` leaves a field alone. For `image` and `location`, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
    pub location: Option<Option<String>>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image(mut self, image: Option<String>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = Some(location);
        self
    }

    /// True when applying the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.location.is_none()
    }

    /// A present title must not be empty
    pub fn validate(&self) -> JournalResult<()> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> JournalResult<()> {
    if title.trim().is_empty() {
        return Err(JournalError::validation("title", "Enter a title"));
    }
    Ok(())
}
