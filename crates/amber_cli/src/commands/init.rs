//! Initialize a new library.

use amber_core::{Library, CATALOG_FILE, SETTINGS_FILE};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Initialize a new library in `dir`.
pub fn run(dir: &Path) -> Result<()> {
    let library = Library::init(dir)
        .with_context(|| format!("Failed to initialize library at {}", dir.display()))?;

    println!(
        "{} Initialized AmberDay library in {}",
        style("✓").green(),
        library.root().display()
    );
    println!();
    println!("Files:");
    println!("  {:<16} - Folders, anchors, tags, backups and log", CATALOG_FILE);
    println!("  {:<16} - Backup directory and startup options", SETTINGS_FILE);
    println!();
    println!("System folders:");
    for folder in library.list_folders(None)? {
        println!("  #{:<4} {}", folder.id, folder.name);
    }
    println!();
    println!(
        "{} Set a backup directory with {}",
        style("Tip:").cyan(),
        style("amber settings backup-path <DIR>").cyan()
    );

    Ok(())
}
