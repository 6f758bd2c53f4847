//! Shared terminal output helpers.

use amber_core::AnchorView;
use anyhow::Result;
use chrono::{DateTime, Local};
use console::style;
use serde::Serialize;

/// Formats a Unix timestamp in local time.
pub fn format_time(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line summary of an anchor.
pub fn anchor_line(view: &AnchorView) -> String {
    let anchor = &view.anchor;
    let validity = if anchor.is_valid {
        style("ok").green()
    } else {
        style("missing").red()
    };
    format!(
        "#{:<5} {:<24} {:<8} {}",
        anchor.id,
        anchor.name,
        validity,
        style(&anchor.path).dim()
    )
}

/// Prints a list of anchors, or a placeholder when empty.
pub fn print_anchors(views: &[AnchorView], empty: &str) {
    if views.is_empty() {
        println!("{}", style(empty).dim());
        return;
    }
    for view in views {
        println!("{}", anchor_line(view));
    }
}
