//! Create/edit surface state
//!
//! An [`EntryForm`] holds what the user has typed or captured so far.
//! Capturing a photo or a location either succeeds completely or leaves
//! the form exactly as it was.

use tracing::debug;

use crate::device::{ImagePicker, LocationProvider, Notice, Notifier};
use crate::error::{JournalError, JournalResult};
use crate::journal::Journal;
use crate::models::{Entry, EntryDraft, EntryPatch};

/// Whether the form creates a new entry or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Fields of the create/edit surface
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    mode: FormMode,
    /// Entry as it was when the edit began
    base: Option<Entry>,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryForm {
    /// Empty form for a new entry
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            base: None,
            title: String::new(),
            description: String::new(),
            image: None,
            location: None,
        }
    }

    /// Form pre-populated with an entry's current fields
    pub fn edit(entry: &Entry) -> Self {
        Self {
            mode: FormMode::Edit {
                id: entry.id.clone(),
            },
            base: Some(entry.clone()),
            title: entry.title.clone(),
            description: entry.description.clone(),
            image: entry.image.clone(),
            location: entry.location.clone(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Id of the entry being edited
    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Create => None,
        }
    }

    /// Ask the picker for a photo
    ///
    /// Returns `Ok(false)` when the user cancels the picker.
    pub async fn attach_image(&mut self, picker: &dyn ImagePicker) -> JournalResult<bool> {
        if !picker.request_permission().await.is_granted() {
            return Err(JournalError::PermissionDenied {
                capability: "photo library",
            });
        }

        match picker.pick_image().await {
            Some(uri) => {
                debug!(uri = %uri, "Attached image");
                self.image = Some(uri);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Capture the current position as a "lat, lon" snapshot
    pub async fn capture_location(
        &mut self,
        provider: &dyn LocationProvider,
        precision: usize,
    ) -> JournalResult<String> {
        if !provider.request_permission().await.is_granted() {
            return Err(JournalError::PermissionDenied {
                capability: "location",
            });
        }

        let position = provider.current_position().await?;
        let formatted = position.format(precision);
        self.location = Some(formatted.clone());
        Ok(formatted)
    }

    /// Create or update the entry, notifying the outcome
    ///
    /// An edit fails with [`JournalError::Conflict`] when the stored entry
    /// changed after the form was opened.
    pub async fn submit(&self, journal: &Journal, notifier: &dyn Notifier) -> JournalResult<Entry> {
        let result = match &self.base {
            Some(base) => journal.update_from(base, self.to_patch()).await,
            None => journal.create(self.to_draft()).await,
        };

        match &result {
            Ok(_) => notifier.notify(Notice::success(match self.mode {
                FormMode::Create => "New entry added",
                FormMode::Edit { .. } => "Entry updated",
            })),
            Err(e) => notifier.notify(Notice::failure("Could not save entry", e.to_string())),
        }

        result
    }

    fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            location: self.location.clone(),
        }
    }

    /// An edit always carries every field of the form
    fn to_patch(&self) -> EntryPatch {
        EntryPatch::new()
            .title(self.title.clone())
            .description(self.description.clone())
            .image(self.image.clone())
            .location(self.location.clone())
    }
}
