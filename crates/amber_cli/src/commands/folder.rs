//! Virtual folder commands.

use super::open_library;
use super::output::{print_anchors, print_json};
use amber_core::CheckProgressCallback;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub fn list(dir: &Path, keyword: Option<&str>, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let folders = library.list_folders(keyword)?;

    if json {
        return print_json(&folders);
    }
    if folders.is_empty() {
        println!("{}", style("No folders match.").dim());
        return Ok(());
    }
    for folder in &folders {
        let marker = if folder.is_system {
            style("system").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "#{:<5} {:<24} {:<8} {}",
            folder.id,
            folder.name,
            marker,
            style(folder.description.as_deref().unwrap_or("")).dim()
        );
    }
    Ok(())
}

pub fn create(dir: &Path, name: &str, description: Option<&str>) -> Result<()> {
    let library = open_library(dir)?;
    let folder = library.create_folder(name, description)?;
    println!(
        "{} Created folder #{} {}",
        style("✓").green(),
        folder.id,
        style(&folder.name).bold()
    );
    Ok(())
}

pub fn update(dir: &Path, id: u64, name: Option<&str>, description: Option<&str>) -> Result<()> {
    if name.is_none() && description.is_none() {
        anyhow::bail!("Nothing to update. Pass --name and/or --description.");
    }
    let library = open_library(dir)?;
    let folder = library.update_folder(id, name, description)?;
    println!(
        "{} Updated folder #{} {}",
        style("✓").green(),
        folder.id,
        style(&folder.name).bold()
    );
    Ok(())
}

pub fn delete(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;
    let folder = library.delete_folder(id)?;
    println!(
        "{} Deleted folder #{} {}",
        style("✓").green(),
        folder.id,
        folder.name
    );
    Ok(())
}

/// List the anchors of a folder, optionally narrowed to those carrying every
/// given tag.
pub fn anchors(dir: &Path, id: u64, tags: &[String], json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let views = if tags.is_empty() {
        library.folder_anchors(id)?
    } else {
        library.anchors_with_tags(id, tags)?
    };

    if json {
        return print_json(&views);
    }
    print_anchors(&views, "No anchors in this folder.");
    Ok(())
}

/// Re-check the files of a folder's anchors with a progress bar.
pub fn check(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓▒░  "),
    );

    let pb_clone = pb.clone();
    let on_progress: &CheckProgressCallback = &move |current, total, path| {
        pb_clone.set_length(total as u64);
        pb_clone.set_position(current as u64);
        pb_clone.set_message(path.to_string());
    };
    let checks = library.check_folder(id, Some(on_progress))?;
    pb.finish_and_clear();

    let missing: Vec<_> = checks.iter().filter(|c| !c.is_valid).collect();
    println!(
        "Checked {} anchors: {} ok, {} missing",
        style(checks.len()).cyan(),
        style(checks.len() - missing.len()).green(),
        if missing.is_empty() {
            style(missing.len()).green()
        } else {
            style(missing.len()).red()
        }
    );
    for check in missing {
        println!("  {} #{} {}", style("×").red(), check.anchor_id, check.path);
    }
    Ok(())
}
