//! Idempotent startup bootstrap: system folders and operation types.

use crate::catalog::{Catalog, Reader};
use crate::error::Result;
use crate::oplog::OperationKind;
use crate::types::{Folder, OperationType, SystemFolder};
use tracing::{debug, info};

/// Ids of the two system folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemFolderIds {
    /// The folder every live anchor belongs to.
    pub all: u64,
    /// The recycle bin.
    pub recycle: u64,
}

/// Get-or-create both system folders by name.
///
/// A pre-existing row with a system name but without the system flag is
/// upgraded in place.
pub fn ensure_system_folders(catalog: &Catalog, now: i64) -> Result<SystemFolderIds> {
    let txn = catalog.write()?;

    for kind in SystemFolder::ALL_KINDS {
        match txn.find_by_name::<Folder>(kind.name())? {
            Some(folder) if folder.is_system => {}
            Some(mut folder) => {
                info!(id = folder.id, name = kind.name(), "marking existing folder as system");
                folder.is_system = true;
                txn.put(&folder)?;
            }
            None => {
                let folder = Folder {
                    id: txn.next_id::<Folder>()?,
                    name: kind.name().to_string(),
                    description: None,
                    created_at: now,
                    is_system: true,
                };
                info!(id = folder.id, name = kind.name(), "created system folder");
                txn.insert_named(&folder)?;
            }
        }
    }

    let ids = SystemFolderIds {
        all: txn.system_folder_id(SystemFolder::All)?,
        recycle: txn.system_folder_id(SystemFolder::Recycle)?,
    };
    txn.commit()?;
    Ok(ids)
}

/// Get-or-create every entry of the [`OperationKind`] catalog.
pub fn ensure_operation_types(catalog: &Catalog) -> Result<()> {
    let txn = catalog.write()?;
    let mut created = 0;

    for kind in OperationKind::ALL {
        if txn.id_by_name::<OperationType>(kind.name())?.is_some() {
            continue;
        }
        let op_type = OperationType {
            id: txn.next_id::<OperationType>()?,
            name: kind.name().to_string(),
            description: Some(kind.description().to_string()),
        };
        txn.insert_named(&op_type)?;
        created += 1;
    }

    txn.commit()?;
    if created > 0 {
        debug!(created, "registered operation types");
    }
    Ok(())
}

/// Looks up both system folders without creating them.
pub fn system_folders(catalog: &Catalog) -> Result<SystemFolderIds> {
    let txn = catalog.read()?;
    Ok(SystemFolderIds {
        all: txn.system_folder_id(SystemFolder::All)?,
        recycle: txn.system_folder_id(SystemFolder::Recycle)?,
    })
}
