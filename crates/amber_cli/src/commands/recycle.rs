//! Recycle bin commands.

use super::open_library;
use super::output::{print_anchors, print_json};
use anyhow::Result;
use console::style;
use std::io::{self, Write};
use std::path::Path;

pub fn list(dir: &Path, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let views = library.recycled_anchors()?;

    if json {
        return print_json(&views);
    }
    print_anchors(&views, "The recycle bin is empty.");
    Ok(())
}

/// Permanently delete every recycled anchor, asking first unless `yes`.
pub fn empty(dir: &Path, yes: bool) -> Result<()> {
    let library = open_library(dir)?;
    let count = library.recycled_anchors()?.len();
    if count == 0 {
        println!("{}", style("The recycle bin is already empty.").dim());
        return Ok(());
    }

    if !yes {
        println!();
        println!(
            "{} {}",
            style("⚠").yellow().bold(),
            style("WARNING:").yellow().bold()
        );
        println!(
            "  {} anchors and their backup records will be permanently deleted.",
            count
        );
        println!("  Backup files on disk are kept.");
        println!();

        print!("Empty the recycle bin? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{} Cancelled.", style("✓").green());
            return Ok(());
        }
    }

    let purged = library.empty_recycle_bin()?;
    println!(
        "{} Permanently deleted {} anchors",
        style("✓").green(),
        style(purged).cyan()
    );
    Ok(())
}
