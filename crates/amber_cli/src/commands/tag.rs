//! Tag commands.

use super::open_library;
use super::output::{print_anchors, print_json};
use amber_core::Tag;
use anyhow::Result;
use console::style;
use std::path::Path;

fn print_tags(tags: &[Tag]) {
    if tags.is_empty() {
        println!("{}", style("No tags yet.").dim());
        return;
    }
    for tag in tags {
        println!(
            "#{:<5} {:<24} {}",
            tag.id,
            tag.name,
            style(format!("{} uses", tag.use_count)).dim()
        );
    }
}

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let tags = library.tags()?;
    if json {
        return print_json(&tags);
    }
    print_tags(&tags);
    Ok(())
}

pub fn popular(dir: &Path, limit: Option<usize>, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let mut tags = library.popular_tags()?;
    if let Some(limit) = limit {
        tags.truncate(limit);
    }
    if json {
        return print_json(&tags);
    }
    print_tags(&tags);
    Ok(())
}

pub fn delete(dir: &Path, id: u64) -> Result<()> {
    let library = open_library(dir)?;
    let tag = library.delete_tag(id)?;
    println!(
        "{} Deleted tag #{} {}",
        style("✓").green(),
        tag.id,
        style(&tag.name).bold()
    );
    Ok(())
}

/// Anchors in `folder` carrying every tag in `names`. Without a folder the
/// search covers `ALL`.
pub fn find(dir: &Path, folder: Option<u64>, names: &[String], json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let folder = match folder {
        Some(folder) => folder,
        None => library.system_folders()?.all,
    };
    let views = library.anchors_with_tags(folder, names)?;
    if json {
        return print_json(&views);
    }
    print_anchors(&views, "No anchors carry all of these tags.");
    Ok(())
}
