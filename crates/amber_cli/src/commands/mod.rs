//! CLI commands.

use amber_core::Library;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

pub mod anchor;
pub mod backup;
pub mod folder;
pub mod init;
pub mod log;
pub mod output;
pub mod recycle;
pub mod settings;
pub mod tag;

/// Opens the library at `dir`, creating it on first use.
pub(crate) fn open_library(dir: &Path) -> Result<Library> {
    let library = Library::open_or_init(dir)
        .with_context(|| format!("Failed to open library at {}", dir.display()))?;

    let missing = library.startup_report().missing.len();
    if missing > 0 {
        warn!(missing, "some anchored files no longer exist");
    }
    Ok(library)
}
