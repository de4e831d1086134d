//! Status command handler

use anyhow::Result;

use trek_core::{Config, FileKv, Journal};

use crate::output::{Output, OutputFormat};

/// Show where the journal lives and what is in it
pub async fn show(journal: &Journal, config: &Config, output: &Output) -> Result<()> {
    let stats = journal.stats().await?;
    let size = FileKv::new(config.store_dir())
        .size_on_disk()
        .await
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage": {
                        "location": config.store_dir(),
                        "size": size
                    },
                    "counts": {
                        "entries": stats.entries,
                        "with_image": stats.with_image,
                        "with_location": stats.with_location
                    },
                    "oldest": stats.oldest,
                    "newest": stats.newest
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.entries);
        }
        OutputFormat::Human => {
            println!("trek Status");
            println!("===========");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.store_dir().display());
            println!("  Size:     {}", human_size(size));
            println!();
            println!("Contents:");
            output.print_stats(&stats);
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
