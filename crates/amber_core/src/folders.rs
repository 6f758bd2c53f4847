//! User folder management.

use crate::catalog::{Catalog, Reader, Relation};
use crate::error::{AmberError, Result};
use crate::types::{Anchor, AnchorView, Folder, SystemFolder};
use tracing::debug;

/// Normalizes optional free text; blank means "no description".
pub(crate) fn normalize_description(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Creates a user folder.
///
/// # Errors
///
/// - `EmptyName` if the trimmed name is empty
/// - `DuplicateName` if a folder (system or user) already uses the name
pub fn create(
    catalog: &Catalog,
    name: &str,
    description: Option<&str>,
    now: i64,
) -> Result<Folder> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AmberError::EmptyName("folder name"));
    }

    let txn = catalog.write()?;
    if SystemFolder::from_name(name).is_some() || txn.id_by_name::<Folder>(name)?.is_some() {
        return Err(AmberError::DuplicateName {
            kind: "folder",
            name: name.to_string(),
        });
    }

    let folder = Folder {
        id: txn.next_id::<Folder>()?,
        name: name.to_string(),
        description: normalize_description(description),
        created_at: now,
        is_system: false,
    };
    txn.insert_named(&folder)?;
    txn.commit()?;

    debug!(id = folder.id, name = %folder.name, "created folder");
    Ok(folder)
}

/// Renames and/or re-describes a user folder. Returns the previous and the
/// updated row.
///
/// `None` leaves a field unchanged; an empty description clears it.
pub fn update(
    catalog: &Catalog,
    folder_id: u64,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<(Folder, Folder)> {
    let txn = catalog.write()?;
    let before = txn.require::<Folder>(folder_id)?;
    if before.is_system {
        return Err(AmberError::SystemFolder(before.name));
    }

    let mut after = before.clone();
    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AmberError::EmptyName("folder name"));
        }
        let taken = match txn.id_by_name::<Folder>(name)? {
            Some(owner) => owner != folder_id,
            None => SystemFolder::from_name(name).is_some(),
        };
        if taken {
            return Err(AmberError::DuplicateName {
                kind: "folder",
                name: name.to_string(),
            });
        }
        after.name = name.to_string();
    }
    if description.is_some() {
        after.description = normalize_description(description);
    }

    txn.update_named(&before.name, &after)?;
    txn.commit()?;
    Ok((before, after))
}

/// Deletes a user folder and its memberships. Anchors keep their other
/// memberships. Returns the deleted row.
pub fn delete(catalog: &Catalog, folder_id: u64, now: i64) -> Result<Folder> {
    let txn = catalog.write()?;
    let folder = txn.require::<Folder>(folder_id)?;
    if folder.is_system {
        return Err(AmberError::SystemFolder(folder.name));
    }

    let anchor_ids = txn.unrelate_right(Relation::AnchorFolder, folder_id)?;
    for anchor_id in &anchor_ids {
        let mut anchor = txn.require::<Anchor>(*anchor_id)?;
        anchor.updated_at = now;
        txn.put(&anchor)?;
    }
    txn.remove_named(&folder)?;
    txn.commit()?;

    debug!(id = folder_id, unbound = anchor_ids.len(), "deleted folder");
    Ok(folder)
}

/// Lists folders ordered by id, optionally filtered by a case-insensitive
/// substring of the name.
pub fn list(catalog: &Catalog, keyword: Option<&str>) -> Result<Vec<Folder>> {
    let folders = catalog.read()?.all::<Folder>()?;
    let keyword = keyword
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());

    Ok(match keyword {
        Some(keyword) => folders
            .into_iter()
            .filter(|f| f.name.to_lowercase().contains(&keyword))
            .collect(),
        None => folders,
    })
}

/// Anchors bound to a folder, ordered by anchor id.
pub fn anchors(catalog: &Catalog, folder_id: u64) -> Result<Vec<AnchorView>> {
    let txn = catalog.read()?;
    txn.require::<Folder>(folder_id)?;
    txn.folder_anchors(folder_id)?
        .into_iter()
        .map(|anchor| txn.anchor_view(anchor))
        .collect()
}
