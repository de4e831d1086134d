//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use trek_core::{Entry, JournalStats, Notice, NoticeLevel, Notifier, EMPTY_PLACEHOLDER};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", entry.id);
                println!("Title:       {}", entry.title);
                if !entry.description.is_empty() {
                    println!("Description: {}", entry.description);
                }
                if let Some(ref image) = entry.image {
                    println!("Image:       {}", image);
                }
                if let Some(ref location) = entry.location {
                    println!("Location:    {}", location);
                }
                println!("Date:        {}", entry.local_date());
            }
            OutputFormat::Json => {
                print_json(entry);
            }
            OutputFormat::Quiet => {
                println!("{}", entry.id);
            }
        }
    }

    /// Print a list of entries, or the placeholder when there are none
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("{}", EMPTY_PLACEHOLDER);
                    return;
                }
                for entry in entries {
                    let marker = match (&entry.image, &entry.location) {
                        (Some(_), Some(_)) => " [photo, location]",
                        (Some(_), None) => " [photo]",
                        (None, Some(_)) => " [location]",
                        (None, None) => "",
                    };
                    println!(
                        "{} | {}{} | {} | {}",
                        short_id(&entry.id),
                        truncate(&entry.title, 30),
                        marker,
                        entry.preview(40).replace('\n', " "),
                        entry.local_date()
                    );
                }
                println!("\n{} entry(s)", entries.len());
            }
            OutputFormat::Json => {
                print_json(&entries);
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print journal statistics
    pub fn print_stats(&self, stats: &JournalStats) {
        let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
            d.map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
        };

        match self.format {
            OutputFormat::Human => {
                println!("  Entries:        {}", stats.entries);
                println!("  With photo:     {}", stats.with_image);
                println!("  With location:  {}", stats.with_location);
                if let (Some(oldest), Some(newest)) = (date(stats.oldest), date(stats.newest)) {
                    println!("  Span:           {} .. {}", oldest, newest);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "entries": stats.entries,
                        "with_image": stats.with_image,
                        "with_location": stats.with_location,
                        "oldest": stats.oldest,
                        "newest": stats.newest,
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", stats.entries);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

impl Notifier for Output {
    fn notify(&self, notice: Notice) {
        // Failures reach the user once, through the command's error
        if notice.level == NoticeLevel::Success {
            self.success(&notice.title);
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// First eight characters of an id
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
