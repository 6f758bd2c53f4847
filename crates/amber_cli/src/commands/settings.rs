//! Settings commands.

use super::open_library;
use amber_core::SETTINGS_FILE;
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn show(dir: &Path) -> Result<()> {
    let library = open_library(dir)?;
    let settings = library.settings();

    println!("{}", style("Settings:").bold());
    println!("  Library:          {}", library.root().display());
    println!(
        "  Backup path:      {}",
        match &settings.backup_path {
            Some(path) => style(path.clone()).cyan(),
            None => style("(not configured)".to_string()).yellow(),
        }
    );
    println!("  Open last folder: {}", settings.open_last_folder);
    println!();
    println!(
        "  {}",
        style(format!("Stored in {}", library.root().join(SETTINGS_FILE).display())).dim()
    );
    Ok(())
}

pub fn backup_path(dir: &Path, path: &str) -> Result<()> {
    let mut library = open_library(dir)?;
    library.set_backup_path(path)?;
    println!("{} Backups will be written to {}", style("✓").green(), path);
    Ok(())
}

pub fn open_last_folder(dir: &Path, enabled: bool) -> Result<()> {
    let mut library = open_library(dir)?;
    library.set_open_last_folder(enabled)?;
    println!(
        "{} Open last folder on startup: {}",
        style("✓").green(),
        enabled
    );
    Ok(())
}
