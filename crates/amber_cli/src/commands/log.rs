//! Operation log command.

use super::open_library;
use super::output::{format_time, print_json};
use anyhow::Result;
use console::style;
use std::path::Path;

/// Show the operation log, newest first.
pub fn run(dir: &Path, limit: Option<usize>, json: bool) -> Result<()> {
    let library = open_library(dir)?;
    let entries = library.operation_log(limit)?;

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("{}", style("No operations logged yet.").dim());
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{}  {:<10} {}",
            style(format_time(entry.time)).dim(),
            style(&entry.operation_type_name).cyan(),
            entry.result
        );
    }
    Ok(())
}
