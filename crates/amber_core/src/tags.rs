//! Tag queries and deletion.

use crate::catalog::{Catalog, Reader, Relation};
use crate::error::{AmberError, Result};
use crate::types::{Anchor, AnchorView, Folder, Tag};
use std::collections::BTreeSet;
use tracing::debug;

/// All tags ordered by id.
pub fn list(catalog: &Catalog) -> Result<Vec<Tag>> {
    catalog.read()?.all::<Tag>()
}

/// All tags, most used first. Ties keep id order.
pub fn popular(catalog: &Catalog) -> Result<Vec<Tag>> {
    let mut tags = list(catalog)?;
    tags.sort_by(|a, b| b.use_count.cmp(&a.use_count).then(a.id.cmp(&b.id)));
    Ok(tags)
}

/// Deletes a tag, unbinding it from every anchor. Returns the deleted row.
pub fn delete(catalog: &Catalog, tag_id: u64, now: i64) -> Result<Tag> {
    let txn = catalog.write()?;
    let tag = txn.require::<Tag>(tag_id)?;

    let anchor_ids = txn.unrelate_right(Relation::AnchorTag, tag_id)?;
    for anchor_id in &anchor_ids {
        let mut anchor = txn.require::<Anchor>(*anchor_id)?;
        anchor.updated_at = now;
        txn.put(&anchor)?;
    }
    txn.remove_named(&tag)?;
    txn.commit()?;

    debug!(id = tag_id, unbound = anchor_ids.len(), "deleted tag");
    Ok(tag)
}

/// Anchors in a folder carrying every one of the named tags.
///
/// An unknown tag name yields an empty result.
pub fn anchors_with_tags<I>(catalog: &Catalog, folder_id: u64, names: I) -> Result<Vec<AnchorView>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let names: BTreeSet<String> = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(AmberError::EmptyName("tag names"));
    }

    let txn = catalog.read()?;
    txn.require::<Folder>(folder_id)?;

    let mut matching: Option<BTreeSet<u64>> = None;
    for name in &names {
        let Some(tag_id) = txn.id_by_name::<Tag>(name)? else {
            return Ok(Vec::new());
        };
        let tagged: BTreeSet<u64> = txn
            .related_reverse(Relation::AnchorTag, tag_id)?
            .into_iter()
            .collect();
        matching = Some(match matching {
            Some(acc) => acc.intersection(&tagged).copied().collect(),
            None => tagged,
        });
    }

    let matching = matching.unwrap_or_default();
    txn.folder_anchors(folder_id)?
        .into_iter()
        .filter(|anchor| matching.contains(&anchor.id))
        .map(|anchor| txn.anchor_view(anchor))
        .collect()
}
