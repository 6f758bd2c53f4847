//! Path validity checking.
//!
//! `Anchor::is_valid` caches whether the anchor's path existed at the last
//! check. A missing path is a normal outcome, never an error.

use crate::catalog::{Catalog, Reader};
use crate::error::Result;
use crate::types::{Anchor, Folder, PathCheck};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Progress callback for path checks.
/// Called with (current, total, path) after each anchor is checked.
pub type CheckProgressCallback = dyn Fn(usize, usize, &str);

/// Summary of a full startup check.
#[derive(Debug, Default)]
pub struct ValidityReport {
    /// Number of anchors checked.
    pub checked: usize,

    /// Number of anchors whose flag flipped.
    pub changed: usize,

    /// Anchors whose path does not exist.
    pub missing: Vec<PathCheck>,
}

/// Expands a leading `~` to the current user's home directory.
///
/// `~` must stand alone or be followed by a path separator (`/`, and also
/// `\` on Windows). `~user` forms are left as they are.
pub fn resolve_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        let mut chars = rest.chars();
        let tilde_only = match chars.next() {
            None => true,
            Some(c) => std::path::is_separator(c),
        };
        if tilde_only {
            if let Some(home) = dirs::home_dir() {
                let rest = chars.as_str();
                return if rest.is_empty() { home } else { home.join(rest) };
            }
        }
    }
    PathBuf::from(path)
}

fn path_exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

/// Checks each anchor's path and persists flags that changed.
///
/// Filesystem probes run before the write transaction is opened.
pub fn check_paths(
    catalog: &Catalog,
    anchors: &[Anchor],
    progress: Option<&CheckProgressCallback>,
) -> Result<Vec<PathCheck>> {
    let total = anchors.len();
    let mut checks = Vec::with_capacity(total);

    for (i, anchor) in anchors.iter().enumerate() {
        let is_valid = path_exists(&resolve_path(&anchor.path));
        checks.push(PathCheck {
            anchor_id: anchor.id,
            path: anchor.path.clone(),
            is_valid,
        });
        if let Some(cb) = progress {
            cb(i + 1, total, &anchor.path);
        }
    }

    let changed: Vec<&PathCheck> = checks
        .iter()
        .zip(anchors)
        .filter(|(check, anchor)| check.is_valid != anchor.is_valid)
        .map(|(check, _)| check)
        .collect();

    if !changed.is_empty() {
        let txn = catalog.write()?;
        for check in &changed {
            // The anchor may have been purged since it was read
            if let Some(mut anchor) = txn.get::<Anchor>(check.anchor_id)? {
                anchor.is_valid = check.is_valid;
                txn.put(&anchor)?;
            }
        }
        txn.commit()?;
        debug!(changed = changed.len(), "updated path validity flags");
    }

    Ok(checks)
}

/// Checks every anchor. Run at library open.
pub fn check_all(
    catalog: &Catalog,
    progress: Option<&CheckProgressCallback>,
) -> Result<ValidityReport> {
    let anchors = catalog.read()?.all::<Anchor>()?;
    let checks = check_paths(catalog, &anchors, progress)?;

    let changed = checks
        .iter()
        .zip(&anchors)
        .filter(|(check, anchor)| check.is_valid != anchor.is_valid)
        .count();

    Ok(ValidityReport {
        checked: checks.len(),
        changed,
        missing: checks.into_iter().filter(|c| !c.is_valid).collect(),
    })
}

/// Checks the anchors bound to one folder.
pub fn check_folder(
    catalog: &Catalog,
    folder_id: u64,
    progress: Option<&CheckProgressCallback>,
) -> Result<Vec<PathCheck>> {
    let anchors = {
        let txn = catalog.read()?;
        txn.require::<Folder>(folder_id)?;
        txn.folder_anchors(folder_id)?
    };
    check_paths(catalog, &anchors, progress)
}
