//! Anchor lifecycle engine.
//!
//! An anchor is either *Active* (member of `ALL` plus at least one user
//! folder) or *Recycled* (member of the recycle bin only). Purging removes the
//! row for good. Every transition runs in a single write transaction.

use crate::catalog::{Catalog, Reader, Relation, WriteTxn};
use crate::error::{AmberError, Result};
use crate::folders::normalize_description;
use crate::types::{Anchor, AnchorState, AnchorView, BackupRecord, Folder, SystemFolder, Tag};
use tracing::{debug, info};

/// Loads a folder that may receive anchors.
fn require_user_folder<R: Reader>(txn: &R, folder_id: u64) -> Result<Folder> {
    let folder = txn.require::<Folder>(folder_id)?;
    if folder.is_system {
        return Err(AmberError::SystemFolder(folder.name));
    }
    Ok(folder)
}

fn require_active(txn: &WriteTxn, anchor_id: u64) -> Result<Anchor> {
    let anchor = txn.require::<Anchor>(anchor_id)?;
    if txn.anchor_state(anchor_id)? == AnchorState::Recycled {
        return Err(AmberError::AnchorRecycled(anchor_id));
    }
    Ok(anchor)
}

/// Unbinds every tag of an anchor, decrementing each tag's `use_count`.
fn release_tags(txn: &WriteTxn, anchor_id: u64) -> Result<usize> {
    let tag_ids = txn.unrelate_left(Relation::AnchorTag, anchor_id)?;
    for tag_id in &tag_ids {
        if let Some(mut tag) = txn.get::<Tag>(*tag_id)? {
            tag.use_count = tag.use_count.saturating_sub(1);
            txn.put(&tag)?;
        }
    }
    Ok(tag_ids.len())
}

/// Persists `updated_at` and returns the fresh view.
fn touch(txn: &WriteTxn, mut anchor: Anchor, now: i64) -> Result<AnchorView> {
    anchor.updated_at = now;
    txn.put(&anchor)?;
    txn.anchor_view(anchor)
}

/// Trims names and drops blanks and repeats, keeping first-seen order.
fn normalize_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Creates an anchor bound to `ALL` and `folder_id`.
///
/// The path is stored as given and not checked; `is_valid` starts `true`.
///
/// # Errors
///
/// - `EmptyName` for a blank name or path
/// - `FolderNotFound` / `SystemFolder` for a bad target folder
pub fn create(
    catalog: &Catalog,
    name: &str,
    path: &str,
    description: Option<&str>,
    folder_id: u64,
    now: i64,
) -> Result<AnchorView> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AmberError::EmptyName("anchor name"));
    }
    if path.trim().is_empty() {
        return Err(AmberError::EmptyName("anchor path"));
    }

    let txn = catalog.write()?;
    require_user_folder(&txn, folder_id)?;
    let all = txn.system_folder_id(SystemFolder::All)?;

    let anchor = Anchor {
        id: txn.next_id::<Anchor>()?,
        name: name.to_string(),
        path: path.to_string(),
        description: normalize_description(description),
        created_at: now,
        updated_at: now,
        is_valid: true,
    };
    txn.put(&anchor)?;
    txn.relate(Relation::AnchorFolder, anchor.id, all)?;
    txn.relate(Relation::AnchorFolder, anchor.id, folder_id)?;

    let view = txn.anchor_view(anchor)?;
    txn.commit()?;

    debug!(id = view.anchor.id, folder_id, "created anchor");
    Ok(view)
}

/// Renames an anchor.
pub fn rename(catalog: &Catalog, anchor_id: u64, name: &str, now: i64) -> Result<AnchorView> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AmberError::EmptyName("anchor name"));
    }

    let txn = catalog.write()?;
    let mut anchor = txn.require::<Anchor>(anchor_id)?;
    anchor.name = name.to_string();
    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Replaces an anchor's description. Empty text clears it.
pub fn update_description(
    catalog: &Catalog,
    anchor_id: u64,
    text: &str,
    now: i64,
) -> Result<AnchorView> {
    let txn = catalog.write()?;
    let mut anchor = txn.require::<Anchor>(anchor_id)?;
    anchor.description = normalize_description(Some(text));
    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Adds an active anchor to more user folders. Existing memberships are
/// kept and `ALL` is always present afterwards.
pub fn bind_folders(
    catalog: &Catalog,
    anchor_id: u64,
    folder_ids: &[u64],
    now: i64,
) -> Result<AnchorView> {
    let txn = catalog.write()?;
    let anchor = require_active(&txn, anchor_id)?;
    if folder_ids.is_empty() {
        return Err(AmberError::EmptyName("folder list"));
    }

    let mut targets = folder_ids.to_vec();
    targets.sort_unstable();
    targets.dedup();
    for folder_id in &targets {
        require_user_folder(&txn, *folder_id)?;
    }

    let all = txn.system_folder_id(SystemFolder::All)?;
    txn.relate(Relation::AnchorFolder, anchor_id, all)?;
    for folder_id in &targets {
        txn.relate(Relation::AnchorFolder, anchor_id, *folder_id)?;
    }

    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Tags an active anchor by name, creating tags as needed.
///
/// Only newly bound tags have their `use_count` incremented.
pub fn add_tags<I>(catalog: &Catalog, anchor_id: u64, names: I, now: i64) -> Result<AnchorView>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let names = normalize_names(names);
    if names.is_empty() {
        return Err(AmberError::EmptyName("tag names"));
    }

    let txn = catalog.write()?;
    let anchor = require_active(&txn, anchor_id)?;

    for name in names {
        let mut tag = match txn.find_by_name::<Tag>(&name)? {
            Some(tag) => tag,
            None => {
                let tag = Tag {
                    id: txn.next_id::<Tag>()?,
                    name,
                    use_count: 0,
                    created_at: now,
                };
                txn.insert_named(&tag)?;
                debug!(id = tag.id, name = %tag.name, "created tag");
                tag
            }
        };
        if txn.relate(Relation::AnchorTag, anchor_id, tag.id)? {
            tag.use_count += 1;
            txn.put(&tag)?;
        }
    }

    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Unbinds one tag from an anchor. The tag row is kept even at zero uses.
pub fn remove_tag(catalog: &Catalog, anchor_id: u64, tag_id: u64, now: i64) -> Result<AnchorView> {
    let txn = catalog.write()?;
    let anchor = txn.require::<Anchor>(anchor_id)?;
    let mut tag = txn.require::<Tag>(tag_id)?;

    if !txn.unrelate(Relation::AnchorTag, anchor_id, tag_id)? {
        return Err(AmberError::TagNotBound { anchor_id, tag_id });
    }
    tag.use_count = tag.use_count.saturating_sub(1);
    txn.put(&tag)?;

    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Moves an anchor to the recycle bin, releasing all its folder and tag
/// bindings. Recycling a recycled anchor changes nothing.
pub fn recycle(catalog: &Catalog, anchor_id: u64, now: i64) -> Result<AnchorView> {
    let txn = catalog.write()?;
    let anchor = txn.require::<Anchor>(anchor_id)?;
    if txn.anchor_state(anchor_id)? == AnchorState::Recycled {
        return txn.anchor_view(anchor);
    }

    let recycle = txn.system_folder_id(SystemFolder::Recycle)?;
    let released = release_tags(&txn, anchor_id)?;
    txn.unrelate_left(Relation::AnchorFolder, anchor_id)?;
    txn.relate(Relation::AnchorFolder, anchor_id, recycle)?;

    let view = touch(&txn, anchor, now)?;
    txn.commit()?;

    debug!(id = anchor_id, released_tags = released, "recycled anchor");
    Ok(view)
}

/// Brings a recycled anchor back into `ALL` and `folder_id`. Tags are not
/// restored.
pub fn restore(catalog: &Catalog, anchor_id: u64, folder_id: u64, now: i64) -> Result<AnchorView> {
    let txn = catalog.write()?;
    let anchor = txn.require::<Anchor>(anchor_id)?;
    if txn.anchor_state(anchor_id)? != AnchorState::Recycled {
        return Err(AmberError::AnchorNotRecycled(anchor_id));
    }
    require_user_folder(&txn, folder_id)?;

    let all = txn.system_folder_id(SystemFolder::All)?;
    release_tags(&txn, anchor_id)?;
    txn.unrelate_left(Relation::AnchorFolder, anchor_id)?;
    txn.relate(Relation::AnchorFolder, anchor_id, all)?;
    txn.relate(Relation::AnchorFolder, anchor_id, folder_id)?;

    let view = touch(&txn, anchor, now)?;
    txn.commit()?;
    Ok(view)
}

/// Permanently deletes every recycled anchor along with its memberships and
/// backup records. Backup files on disk are left alone. Returns the purged
/// anchors.
pub fn empty_recycle_bin(catalog: &Catalog) -> Result<Vec<Anchor>> {
    let txn = catalog.write()?;
    let recycle = txn.system_folder_id(SystemFolder::Recycle)?;
    let purged = txn.folder_anchors(recycle)?;

    for anchor in &purged {
        release_tags(&txn, anchor.id)?;
        txn.unrelate_left(Relation::AnchorFolder, anchor.id)?;
        for backup_id in txn.unrelate_left(Relation::AnchorBackup, anchor.id)? {
            txn.remove::<BackupRecord>(backup_id)?;
        }
        txn.remove::<Anchor>(anchor.id)?;
    }
    txn.commit()?;

    if !purged.is_empty() {
        info!(count = purged.len(), "emptied recycle bin");
    }
    Ok(purged)
}

/// Fetches one anchor with its memberships.
pub fn get(catalog: &Catalog, anchor_id: u64) -> Result<AnchorView> {
    let txn = catalog.read()?;
    let anchor = txn.require::<Anchor>(anchor_id)?;
    txn.anchor_view(anchor)
}

/// Current lifecycle state of an anchor.
pub fn state(catalog: &Catalog, anchor_id: u64) -> Result<AnchorState> {
    let txn = catalog.read()?;
    txn.require::<Anchor>(anchor_id)?;
    txn.anchor_state(anchor_id)
}

/// Anchors in the recycle bin, ordered by id.
pub fn list_recycled(catalog: &Catalog) -> Result<Vec<AnchorView>> {
    let txn = catalog.read()?;
    let recycle = txn.system_folder_id(SystemFolder::Recycle)?;
    txn.folder_anchors(recycle)?
        .into_iter()
        .map(|anchor| txn.anchor_view(anchor))
        .collect()
}
