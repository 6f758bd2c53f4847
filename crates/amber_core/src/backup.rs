//! Backup and restore of anchor files.
//!
//! Backups are plain copies under the configured backup root, laid out as
//! `{root}/{anchor_id}/{stem}-{timestamp}{suffix}`. The filesystem is always
//! re-checked; `Anchor::is_valid` is never trusted here.

use crate::catalog::{Catalog, Reader, Relation};
use crate::error::{AmberError, Result};
use crate::types::{Anchor, BackupRecord, BackupView};
use crate::validity::resolve_path;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Copies a file, keeping its permissions and modification time.
fn copy_preserving(from: &Path, to: &Path) -> Result<()> {
    let copy = || -> std::io::Result<()> {
        fs::copy(from, to)?;
        let meta = fs::metadata(from)?;
        let atime = FileTime::from_last_access_time(&meta);
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_times(to, atime, mtime)
    };
    copy().map_err(|source| AmberError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Like [`copy_preserving`], but removes whatever reached `to` when the copy
/// fails. `to` must be a fresh path.
fn copy_fresh(from: &Path, to: &Path) -> Result<()> {
    copy_preserving(from, to).map_err(|err| {
        match fs::remove_file(to) {
            Ok(()) => debug!(path = %to.display(), "removed partial copy"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %to.display(), error = %e, "failed to remove partial copy"),
        }
        err
    })
}

/// Destination for a new backup of `source`.
///
/// Two backups of the same file within one second get a numeric suffix
/// instead of overwriting each other.
fn backup_destination(dir: &Path, source: &Path, now: i64) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut dest = dir.join(format!("{stem}-{now}{suffix}"));
    let mut n = 1;
    while dest.exists() {
        dest = dir.join(format!("{stem}-{now}-{n}{suffix}"));
        n += 1;
    }
    dest
}

/// Copies an anchor's file into the backup root and records it.
///
/// # Errors
///
/// - `AnchorNotFound` if the anchor doesn't exist
/// - `SourceFileMissing` if the resolved path is not a regular file
/// - `BackupRootNotConfigured` if `backup_root` is `None`
/// - `CopyFailed` if the copy fails; no record is written
pub fn backup(
    catalog: &Catalog,
    anchor_id: u64,
    backup_root: Option<&Path>,
    now: i64,
) -> Result<BackupRecord> {
    let anchor = catalog.read()?.require::<Anchor>(anchor_id)?;

    let source = resolve_path(&anchor.path);
    if !source.is_file() {
        return Err(AmberError::SourceFileMissing(source));
    }
    let root = backup_root.ok_or(AmberError::BackupRootNotConfigured)?;

    let dir = root.join(anchor_id.to_string());
    fs::create_dir_all(&dir)?;
    let dest = backup_destination(&dir, &source, now);
    copy_fresh(&source, &dest)?;

    let txn = catalog.write()?;
    txn.require::<Anchor>(anchor_id)?;
    let record = BackupRecord {
        id: txn.next_id::<BackupRecord>()?,
        anchor_id,
        backup_path: dest.to_string_lossy().into_owned(),
        backup_time: now,
    };
    txn.put(&record)?;
    txn.relate(Relation::AnchorBackup, anchor_id, record.id)?;
    txn.commit()?;

    debug!(id = record.id, anchor_id, path = %record.backup_path, "created backup");
    Ok(record)
}

/// Copies a backup back to its anchor's path and marks the anchor valid.
///
/// Never overwrites: an existing file at the anchor's path is a conflict.
pub fn restore(catalog: &Catalog, backup_id: u64) -> Result<(BackupRecord, Anchor)> {
    let (record, anchor) = {
        let txn = catalog.read()?;
        let record = txn.require::<BackupRecord>(backup_id)?;
        let anchor = txn.require::<Anchor>(record.anchor_id)?;
        (record, anchor)
    };

    let source = resolve_path(&record.backup_path);
    if !source.is_file() {
        return Err(AmberError::BackupFileMissing(source));
    }
    let target = resolve_path(&anchor.path);
    if target.exists() {
        return Err(AmberError::RestoreWouldOverwrite(target));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    copy_preserving(&source, &target)?;

    let txn = catalog.write()?;
    let mut anchor = txn.require::<Anchor>(anchor.id)?;
    anchor.is_valid = true;
    txn.put(&anchor)?;
    txn.commit()?;

    debug!(id = backup_id, target = %target.display(), "restored backup");
    Ok((record, anchor))
}

/// Deletes a backup record. The file is removed best-effort; the record is
/// removed regardless.
pub fn delete(catalog: &Catalog, backup_id: u64) -> Result<BackupRecord> {
    let txn = catalog.write()?;
    let record = txn.require::<BackupRecord>(backup_id)?;
    txn.remove::<BackupRecord>(backup_id)?;
    txn.unrelate(Relation::AnchorBackup, record.anchor_id, backup_id)?;
    txn.commit()?;

    let path = resolve_path(&record.backup_path);
    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove backup file"),
    }
    Ok(record)
}

fn views(catalog: &Catalog, records: Vec<BackupRecord>) -> Result<Vec<BackupView>> {
    let txn = catalog.read()?;
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let anchor = txn.require::<Anchor>(record.anchor_id)?;
        out.push(BackupView {
            id: record.id,
            anchor_id: anchor.id,
            anchor_name: anchor.name,
            anchor_path: anchor.path,
            backup_path: record.backup_path,
            backup_time: record.backup_time,
        });
    }
    Ok(out)
}

fn newest_first(records: &mut [BackupRecord]) {
    records.sort_by(|a, b| b.backup_time.cmp(&a.backup_time).then(b.id.cmp(&a.id)));
}

/// All backups, newest first.
pub fn list(catalog: &Catalog) -> Result<Vec<BackupView>> {
    let mut records = catalog.read()?.all::<BackupRecord>()?;
    newest_first(&mut records);
    views(catalog, records)
}

/// Backups of one anchor, newest first. Unknown anchors have none.
pub fn list_for_anchor(catalog: &Catalog, anchor_id: u64) -> Result<Vec<BackupView>> {
    let mut records = {
        let txn = catalog.read()?;
        txn.related(Relation::AnchorBackup, anchor_id)?
            .into_iter()
            .map(|id| txn.require::<BackupRecord>(id))
            .collect::<Result<Vec<_>>>()?
    };
    newest_first(&mut records);
    views(catalog, records)
}
