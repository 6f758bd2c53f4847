//! Backup commands.

use super::open_library;
use super::output::{format_time, print_json};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn create(dir: &Path, anchor: u64) -> Result<()> {
    let library = open_library(dir)?;
    let record = library
        .backup_anchor(anchor)
        .with_context(|| format!("Failed to back up anchor #{}", anchor))?;
    println!(
        "{} Backed up anchor #{} as backup #{}",
        style("✓").green(),
        anchor,
        record.id
    );
    println!("  {}", style(&record.backup_path).dim());
    Ok(())
}

pub fn list(dir: &Path, anchor: Option<u64>, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let backups = match anchor {
        Some(anchor) => library.anchor_backups(anchor)?,
        None => library.backups()?,
    };

    if json {
        return print_json(&backups);
    }
    if backups.is_empty() {
        println!("{}", style("No backups.").dim());
        return Ok(());
    }
    for backup in &backups {
        println!(
            "#{:<5} {}  anchor #{} {:<20} {}",
            backup.id,
            format_time(backup.backup_time),
            backup.anchor_id,
            backup.anchor_name,
            style(&backup.backup_path).dim()
        );
    }
    Ok(())
}

pub fn restore(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;
    let (_, anchor) = library
        .restore_backup(id)
        .with_context(|| format!("Failed to restore backup #{}", id))?;
    println!(
        "{} Restored backup #{} to {}",
        style("✓").green(),
        id,
        anchor.path
    );
    Ok(())
}

pub fn delete(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;
    let record = library.delete_backup(id)?;
    println!(
        "{} Deleted backup #{} of anchor #{}",
        style("✓").green(),
        record.id,
        record.anchor_id
    );
    Ok(())
}
