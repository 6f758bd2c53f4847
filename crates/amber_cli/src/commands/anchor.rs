//! Anchor commands.

use super::open_library;
use super::output::{format_time, print_json};
use amber_core::{AnchorState, AnchorView, BackupView, Library};
use anyhow::Result;
use console::style;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Everything `anchor show` prints.
#[derive(Serialize)]
struct AnchorDetails {
    #[serde(flatten)]
    view: AnchorView,
    state: AnchorState,
    backups: Vec<BackupView>,
}

fn print_changed(action: &str, view: &AnchorView) {
    println!(
        "{} {} anchor #{} {}",
        style("✓").green(),
        action,
        view.anchor.id,
        style(&view.anchor.name).bold()
    );
}

fn names_by_id(pairs: impl IntoIterator<Item = (u64, String)>) -> HashMap<u64, String> {
    pairs.into_iter().collect()
}

pub fn add(
    dir: &Path,
    name: &str,
    path: &str,
    folder: u64,
    description: Option<&str>,
) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.create_anchor(name, path, description, folder)?;
    print_changed("Created", &view);
    Ok(())
}

pub fn show(dir: &Path, id: u64, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let details = AnchorDetails {
        view: library.anchor(id)?,
        state: library.anchor_state(id)?,
        backups: library.anchor_backups(id)?,
    };

    if json {
        return print_json(&details);
    }
    print_details(&library, &details)
}

fn print_details(library: &Library, details: &AnchorDetails) -> Result<()> {
    let anchor = &details.view.anchor;
    let folders = names_by_id(library.list_folders(None)?.into_iter().map(|f| (f.id, f.name)));
    let tags = names_by_id(library.tags()?.into_iter().map(|t| (t.id, t.name)));

    println!("{} #{}", style(&anchor.name).bold(), anchor.id);
    println!("  Path:        {}", anchor.path);
    println!(
        "  Exists:      {}",
        if anchor.is_valid {
            style("yes").green()
        } else {
            style("no").red()
        }
    );
    println!("  State:       {:?}", details.state);
    if let Some(description) = &anchor.description {
        println!("  Description: {}", description);
    }
    println!("  Created:     {}", format_time(anchor.created_at));
    println!("  Updated:     {}", format_time(anchor.updated_at));

    let folder_names: Vec<String> = details
        .view
        .folder_ids
        .iter()
        .map(|id| folders.get(id).cloned().unwrap_or_else(|| format!("#{}", id)))
        .collect();
    println!("  Folders:     {}", folder_names.join(", "));

    if !details.view.tag_ids.is_empty() {
        let tag_names: Vec<String> = details
            .view
            .tag_ids
            .iter()
            .map(|id| match tags.get(id) {
                Some(name) => format!("{} (#{})", name, id),
                None => format!("#{}", id),
            })
            .collect();
        println!("  Tags:        {}", tag_names.join(", "));
    }

    if !details.backups.is_empty() {
        println!("  Backups:");
        for backup in &details.backups {
            println!(
                "    #{:<5} {}  {}",
                backup.id,
                format_time(backup.backup_time),
                style(&backup.backup_path).dim()
            );
        }
    }
    Ok(())
}

pub fn rename(dir: &Path, id: u64, name: &str) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.rename_anchor(id, name)?;
    print_changed("Renamed", &view);
    Ok(())
}

pub fn describe(dir: &Path, id: u64, text: &str) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.describe_anchor(id, text)?;
    print_changed("Updated", &view);
    Ok(())
}

pub fn bind(dir: &Path, id: u64, folders: &[u64]) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.bind_folders(id, folders)?;
    print_changed("Bound", &view);
    Ok(())
}

pub fn tag(dir: &Path, id: u64, names: &[String]) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.add_tags(id, names)?;
    print_changed("Tagged", &view);
    Ok(())
}

pub fn untag(dir: &Path, id: u64, tag: u64) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.remove_tag(id, tag)?;
    print_changed("Untagged", &view);
    Ok(())
}

/// Move an anchor to the recycle bin.
pub fn delete(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.recycle_anchor(id)?;
    print_changed("Recycled", &view);
    println!(
        "  Restore it with {}",
        style(format!("amber anchor restore {} --folder <FOLDER>", id)).cyan()
    );
    Ok(())
}

pub fn restore(dir: &Path, id: u64, folder: u64) -> Result<()> {
    let library = open_library(dir)?;
    let view = library.restore_anchor(id, folder)?;
    print_changed("Restored", &view);
    Ok(())
}
