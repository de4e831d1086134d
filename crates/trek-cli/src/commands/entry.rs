//! Entry command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use trek_core::{
    Config, Confirmation, Coordinates, EntryForm, EntryListView, Journal, JournalError, Notice,
    Notifier,
};

use crate::device::{FixedLocation, PathImagePicker};
use crate::editor::{confirm, edit_description};
use crate::output::{short_id, Output};

/// Field values passed on the command line
#[derive(Debug, Default)]
pub struct FieldArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Write the description in $EDITOR
    pub editor: bool,
    pub image: Option<PathBuf>,
    pub clear_image: bool,
    pub position: Option<Coordinates>,
    pub clear_location: bool,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && !self.editor
            && self.image.is_none()
            && !self.clear_image
            && self.position.is_none()
            && !self.clear_location
    }
}

/// Add a new entry
pub async fn add(journal: &Journal, config: &Config, fields: FieldArgs, output: &Output) -> Result<()> {
    let mut form = EntryForm::new();
    apply_fields(&mut form, fields, config.location_precision, output).await?;

    let entry = form.submit(journal, output).await?;
    output.print_entry(&entry);

    Ok(())
}

/// List all entries, newest first
pub async fn list(journal: &Journal, output: &Output) -> Result<()> {
    let mut view = EntryListView::new();
    view.refresh(journal).await?;
    output.print_entries(view.entries());
    Ok(())
}

/// Show one entry
pub async fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let id = journal.resolve_id(&id).await?;
    let entry = journal
        .get(&id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Entry not found: {}", id))?;

    output.print_entry(&entry);
    Ok(())
}

/// Edit an entry from flags, or interactively when none are given
pub async fn edit(
    journal: &Journal,
    config: &Config,
    id: String,
    fields: FieldArgs,
    output: &Output,
) -> Result<()> {
    let id = journal.resolve_id(&id).await?;

    let mut view = EntryListView::new();
    view.refresh(journal).await?;
    let mut form = view
        .begin_edit(&id)
        .ok_or_else(|| anyhow::anyhow!("Entry not found: {}", id))?;
    let original = form.clone();

    let fields = if fields.is_empty() {
        if !output.should_prompt() {
            bail!("Nothing to change. Pass --title, --description, --image or --lat/--lon.");
        }
        prompt_fields(&form)?
    } else {
        fields
    };

    apply_fields(&mut form, fields, config.location_precision, output).await?;

    if form == original {
        output.message("No changes made.");
        return Ok(());
    }

    let entry = form.submit(journal, output).await?;
    output.print_entry(&entry);

    Ok(())
}

/// Delete an entry after confirmation
pub async fn delete(journal: &Journal, id: String, yes: bool, output: &Output) -> Result<()> {
    let id = match journal.resolve_id(&id).await {
        Ok(id) => id,
        Err(JournalError::NotFound { id }) => {
            output.message(&format!("No entry matches '{}'. Nothing deleted.", id));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut view = EntryListView::new();
    view.refresh(journal).await?;
    let Some(entry) = view.request_delete(&id) else {
        output.message(&format!("No entry matches '{}'. Nothing deleted.", id));
        return Ok(());
    };

    let answer = if output.should_prompt() && !yes {
        println!("Delete entry: {} - {}", short_id(&entry.id), entry.title);
        if confirm("Are you sure?")? {
            Confirmation::Confirm
        } else {
            Confirmation::Cancel
        }
    } else {
        Confirmation::Confirm
    };

    match view
        .resolve_delete(journal, answer)
        .await
        .context("Failed to delete entry")?
    {
        Some(removed) => output.success(&format!("Deleted entry: {}", removed.id)),
        None => output.message("Cancelled."),
    }

    Ok(())
}

/// Back up the stored collection and start with an empty journal
pub async fn reset(journal: &Journal, yes: bool, output: &Output) -> Result<()> {
    if output.should_prompt() && !yes {
        println!("This replaces the journal with an empty one. A backup is kept.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    } else if !yes {
        bail!("Refusing to reset without --yes");
    }

    match journal.reset().await.context("Failed to reset journal")? {
        Some(key) => output.success(&format!("Journal reset. Previous contents saved as '{}'", key)),
        None => output.success("Journal reset"),
    }

    Ok(())
}

async fn apply_fields(
    form: &mut EntryForm,
    fields: FieldArgs,
    precision: usize,
    notifier: &dyn Notifier,
) -> Result<()> {
    if let Some(title) = fields.title {
        form.title = title;
    }

    if let Some(description) = fields.description {
        form.description = description;
    } else if fields.editor {
        form.description = edit_description(&form.title, &form.description)?;
    }

    if fields.clear_image {
        form.image = None;
    }
    if let Some(path) = fields.image {
        if !form.attach_image(&PathImagePicker::new(&path)).await? {
            bail!("No image file at {}", path.display());
        }
    }

    if fields.clear_location {
        form.location = None;
    }
    if let Some(position) = fields.position {
        let location = form
            .capture_location(&FixedLocation::new(position), precision)
            .await?;
        notifier.notify(Notice::success(format!("Location added: {}", location)));
    }

    Ok(())
}

/// Ask for each field, keeping the current value on Enter
fn prompt_fields(form: &EntryForm) -> Result<FieldArgs> {
    println!("Editing entry: {}", form.editing_id().unwrap_or_default());
    println!("Press Enter to keep current value, or type new value.");
    println!("Type '-' to remove a photo or location.\n");

    let mut fields = FieldArgs {
        title: prompt_with_default("Title", &form.title)?,
        description: prompt_with_default("Description", &form.description)?,
        ..FieldArgs::default()
    };

    match prompt_with_default("Photo path", form.image.as_deref().unwrap_or(""))?.as_deref() {
        Some("-") => fields.clear_image = true,
        Some(path) => fields.image = Some(PathBuf::from(path)),
        None => {}
    }

    match prompt_with_default("Location (lat, lon)", form.location.as_deref().unwrap_or(""))?
        .as_deref()
    {
        Some("-") => fields.clear_location = true,
        Some(text) => fields.position = Some(parse_position(text)?),
        None => {}
    }

    Ok(fields)
}

/// Parse "lat, lon" or "lat lon"
fn parse_position(text: &str) -> Result<Coordinates> {
    let parts: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let [lat, lon] = parts.as_slice() else {
        bail!("Expected a location like '48.8566, 2.3522'");
    };

    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("Invalid latitude: {}", lat))?;
    let longitude: f64 = lon
        .parse()
        .with_context(|| format!("Invalid longitude: {}", lon))?;

    Ok(Coordinates::new(latitude, longitude))
}

/// Prompt for input with a default value
fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    use std::io::{self, Write};

    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use chrono::Utc;
    use std::cell::RefCell;
    use tempfile::TempDir;
    use trek_core::{Entry, EntryDraft};

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(
            parse_position("48.8566, 2.3522").unwrap(),
            Coordinates::new(48.8566, 2.3522)
        );
        assert_eq!(
            parse_position("-33.86 151.21").unwrap(),
            Coordinates::new(-33.86, 151.21)
        );
        assert!(parse_position("48.8566").is_err());
        assert!(parse_position("north, east").is_err());
    }

    #[tokio::test]
    async fn test_add_with_photo_and_location() {
        let temp = TempDir::new().unwrap();
        let photo = temp.path().join("colosseum.jpg");
        std::fs::write(&photo, b"jpeg").unwrap();

        let journal = Journal::in_memory();
        let fields = FieldArgs {
            title: Some("Rome".to_string()),
            description: Some("Pasta".to_string()),
            image: Some(photo),
            position: Some(Coordinates::new(41.890251, 12.492373)),
            ..FieldArgs::default()
        };
        add(&journal, &Config::default(), fields, &quiet())
            .await
            .unwrap();

        let entries = journal.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "Pasta");
        assert!(entries[0].image.as_deref().unwrap().ends_with("colosseum.jpg"));
        assert_eq!(entries[0].location.as_deref(), Some("41.89025, 12.49237"));
    }

    #[tokio::test]
    async fn test_add_missing_photo_saves_nothing() {
        let journal = Journal::in_memory();
        let fields = FieldArgs {
            title: Some("Rome".to_string()),
            image: Some(PathBuf::from("/definitely/not/here.jpg")),
            ..FieldArgs::default()
        };

        assert!(add(&journal, &Config::default(), fields, &quiet())
            .await
            .is_err());
        assert!(journal.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_requires_title() {
        let journal = Journal::in_memory();
        let fields = FieldArgs {
            title: Some("   ".to_string()),
            ..FieldArgs::default()
        };

        let err = add(&journal, &Config::default(), fields, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JournalError>(),
            Some(JournalError::Validation { field: "title", .. })
        ));
    }

    #[tokio::test]
    async fn test_edit_by_prefix_and_clear() {
        let journal = Journal::in_memory();
        let created = journal
            .create(
                EntryDraft::new("Paris")
                    .description("Trip")
                    .location("48.85661, 2.35222"),
            )
            .await
            .unwrap();

        let fields = FieldArgs {
            description: Some(String::new()),
            clear_location: true,
            ..FieldArgs::default()
        };
        edit(
            &journal,
            &Config::default(),
            created.id[..8].to_string(),
            fields,
            &quiet(),
        )
        .await
        .unwrap();

        let entry = journal.get(&created.id).await.unwrap().unwrap();
        assert_eq!(entry.title, "Paris");
        assert_eq!(entry.description, "");
        assert!(entry.location.is_none());
        assert_eq!(entry.date, created.date);
    }

    #[tokio::test]
    async fn test_edit_without_fields_is_refused_when_not_interactive() {
        let journal = Journal::in_memory();
        let created = journal.create(EntryDraft::new("Paris")).await.unwrap();

        let result = edit(
            &journal,
            &Config::default(),
            created.id.clone(),
            FieldArgs::default(),
            &quiet(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let journal = Journal::in_memory();
        let created = journal.create(EntryDraft::new("Paris")).await.unwrap();

        delete(&journal, created.id.clone(), true, &quiet())
            .await
            .unwrap();
        assert!(journal.list().await.unwrap().is_empty());

        // Second delete of the same id succeeds and changes nothing
        delete(&journal, created.id, true, &quiet()).await.unwrap();
        assert!(journal.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_requires_yes_when_not_interactive() {
        let journal = Journal::in_memory();
        journal.create(EntryDraft::new("Paris")).await.unwrap();

        assert!(reset(&journal, false, &quiet()).await.is_err());
        assert_eq!(journal.list().await.unwrap().len(), 1);

        reset(&journal, true, &quiet()).await.unwrap();
        assert!(journal.list().await.unwrap().is_empty());
    }

    #[derive(Default)]
    struct RecordingNotifier {
        titles: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.titles.borrow_mut().push(notice.title);
        }
    }

    fn stored(id: &str, title: &str) -> Entry {
        Entry {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            image: None,
            location: None,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_repeated_delete_leaves_similar_ids_alone() {
        let journal = Journal::in_memory();
        journal
            .store()
            .save(&[stored("1", "One"), stored("12", "Twelve")])
            .await
            .unwrap();

        delete(&journal, "1".to_string(), true, &quiet()).await.unwrap();
        delete(&journal, "1".to_string(), true, &quiet()).await.unwrap();

        let ids: Vec<String> = journal.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["12".to_string()]);
    }

    #[tokio::test]
    async fn test_captured_location_is_announced() {
        let mut form = EntryForm::new();
        let notifier = RecordingNotifier::default();
        let fields = FieldArgs {
            position: Some(Coordinates::new(59.9139, 10.7522)),
            ..FieldArgs::default()
        };

        apply_fields(&mut form, fields, 5, &notifier).await.unwrap();

        assert_eq!(form.location.as_deref(), Some("59.91390, 10.75220"));
        assert_eq!(
            notifier.titles.borrow().as_slice(),
            ["Location added: 59.91390, 10.75220".to_string()]
        );
    }
}
