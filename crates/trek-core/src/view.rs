//! In-memory list of entries behind a list surface
//!
//! The view is a read-through cache of the journal. [`EntryListView::refresh`]
//! replaces it wholesale whenever the surface becomes active; between
//! refreshes it is only changed by applying exactly what a repository call
//! returned, so the next refresh yields the same list.

use tracing::debug;

use crate::error::JournalResult;
use crate::form::EntryForm;
use crate::journal::Journal;
use crate::models::Entry;

/// Shown instead of the list when there are no entries
pub const EMPTY_PLACEHOLDER: &str = "No entries yet. Add one to start your journal!";

/// Answer to a delete confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirm,
    Cancel,
}

/// List state of a journal surface
#[derive(Debug, Clone, Default)]
pub struct EntryListView {
    entries: Vec<Entry>,
    selected: usize,
    /// Id waiting for a delete confirmation
    pending_delete: Option<String>,
}

impl EntryListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from the journal (surface became active)
    pub async fn refresh(&mut self, journal: &Journal) -> JournalResult<()> {
        self.entries = journal.list().await?;
        self.clamp_selection();
        if let Some(id) = &self.pending_delete {
            if !self.entries.iter().any(|e| &e.id == id) {
                self.pending_delete = None;
            }
        }
        debug!(entries = self.entries.len(), "Refreshed list view");
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Placeholder text, only when the list is empty
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_PLACEHOLDER)
    }

    // ==================== Selection ====================

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected < self.entries.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    /// Move the selection to the entry with `id`, if present
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    // ==================== Gestures ====================

    /// Edit gesture: a form pre-populated with the entry
    pub fn begin_edit(&self, id: &str) -> Option<EntryForm> {
        self.find(id).map(EntryForm::edit)
    }

    /// Optimistically replace an entry after a successful update
    pub fn apply_updated(&mut self, entry: Entry) {
        if let Some(index) = self.position(&entry.id) {
            self.entries[index] = entry;
        }
    }

    /// Optimistically show a created entry where the journal put it
    pub fn apply_created(&mut self, entry: Entry) {
        if self.position(&entry.id).is_none() {
            self.entries.insert(0, entry);
            self.selected = 0;
        }
    }

    /// Delete gesture: ask for confirmation before anything happens
    pub fn request_delete(&mut self, id: &str) -> Option<&Entry> {
        let index = self.position(id)?;
        self.pending_delete = Some(id.to_string());
        self.entries.get(index)
    }

    /// Entry awaiting a delete confirmation
    pub fn pending_delete(&self) -> Option<&Entry> {
        self.pending_delete.as_deref().and_then(|id| self.find(id))
    }

    /// Resolve the pending delete
    ///
    /// `Cancel` does nothing but close the prompt. `Confirm` deletes from
    /// the journal and then removes the entry locally. Returns the removed
    /// entry. On failure the local list is left as it was.
    pub async fn resolve_delete(
        &mut self,
        journal: &Journal,
        answer: Confirmation,
    ) -> JournalResult<Option<Entry>> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };

        if answer == Confirmation::Cancel {
            return Ok(None);
        }

        journal.delete(&id).await?;

        let removed = self
            .position(&id)
            .map(|index| self.entries.remove(index));
        self.clamp_selection();
        Ok(removed)
    }

    fn find(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDraft, EntryPatch};

    async fn seeded(titles: &[&str]) -> Journal {
        let journal = Journal::in_memory();
        // Created oldest first so the list reads in the given order
        for title in titles.iter().rev() {
            journal.create(EntryDraft::new(*title)).await.unwrap();
        }
        journal
    }

    #[tokio::test]
    async fn test_empty_view_shows_placeholder() {
        let journal = Journal::in_memory();
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        assert!(view.is_empty());
        assert_eq!(view.placeholder(), Some(EMPTY_PLACEHOLDER));
        assert!(view.selected().is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_wholesale() {
        let journal = seeded(&["A", "B"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.placeholder().is_none());

        // Change storage behind the view's back
        journal.create(EntryDraft::new("C")).await.unwrap();
        let first = view.entries()[0].id.clone();
        journal.delete(&first).await.unwrap();

        view.refresh(&journal).await.unwrap();
        assert_eq!(view.entries(), journal.list().await.unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_selection_is_clamped() {
        let journal = seeded(&["A", "B", "C"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        view.select_last();
        assert_eq!(view.selected().unwrap().title, "C");
        view.select_next();
        assert_eq!(view.selected_index(), 2);

        let ids: Vec<String> = view.entries().iter().map(|e| e.id.clone()).collect();
        journal.delete(&ids[2]).await.unwrap();
        journal.delete(&ids[1]).await.unwrap();
        view.refresh(&journal).await.unwrap();
        assert_eq!(view.selected_index(), 0);

        view.select_prev();
        assert_eq!(view.selected().unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_edit_gesture_round_trip() {
        let journal = seeded(&["Rome"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        let id = view.entries()[0].id.clone();
        let mut form = view.begin_edit(&id).unwrap();
        assert_eq!(form.title, "Rome");
        assert!(view.begin_edit("missing").is_none());

        form.title = "Roma".to_string();
        let updated = journal
            .update(&id, EntryPatch::new().title(form.title.clone()))
            .await
            .unwrap();
        view.apply_updated(updated);

        let local = view.entries().to_vec();
        view.refresh(&journal).await.unwrap();
        assert_eq!(view.entries(), local.as_slice());
        assert_eq!(view.entries()[0].title, "Roma");
    }

    #[tokio::test]
    async fn test_apply_created_matches_store_order() {
        let journal = seeded(&["Old"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        let created = journal.create(EntryDraft::new("New")).await.unwrap();
        view.apply_created(created.clone());
        // Applying twice does not duplicate
        view.apply_created(created);

        let local = view.entries().to_vec();
        view.refresh(&journal).await.unwrap();
        assert_eq!(view.entries(), local.as_slice());
        assert_eq!(view.selected().unwrap().title, "New");
    }

    #[tokio::test]
    async fn test_delete_cancel_does_nothing() {
        let journal = seeded(&["A", "B"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        let id = view.entries()[0].id.clone();
        assert_eq!(view.request_delete(&id).unwrap().title, "A");
        assert_eq!(view.pending_delete().unwrap().id, id);

        let removed = view
            .resolve_delete(&journal, Confirmation::Cancel)
            .await
            .unwrap();
        assert!(removed.is_none());
        assert!(view.pending_delete().is_none());
        assert_eq!(view.len(), 2);
        assert_eq!(journal.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_confirm_matches_store() {
        let journal = seeded(&["A", "B"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        let id = view.entries()[1].id.clone();
        view.select_last();
        view.request_delete(&id);
        let removed = view
            .resolve_delete(&journal, Confirmation::Confirm)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(view.selected().unwrap().title, "A");

        assert_eq!(view.entries(), journal.list().await.unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_resolve_without_request_is_noop() {
        let journal = seeded(&["A"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        assert!(view.request_delete("missing").is_none());
        let removed = view
            .resolve_delete(&journal, Confirmation::Confirm)
            .await
            .unwrap();
        assert!(removed.is_none());
        assert_eq!(journal.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_select_id() {
        let journal = seeded(&["A", "B"]).await;
        let mut view = EntryListView::new();
        view.refresh(&journal).await.unwrap();

        let id = view.entries()[1].id.clone();
        assert!(view.select_id(&id));
        assert_eq!(view.selected().unwrap().title, "B");
        assert!(!view.select_id("missing"));
        assert_eq!(view.selected_index(), 1);
    }
}
