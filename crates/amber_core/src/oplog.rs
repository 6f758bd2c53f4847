//! Append-only operation log.
//!
//! Writing to the log never fails the operation being logged: errors are
//! reported through `tracing` and dropped.

use crate::catalog::{Catalog, Reader};
use crate::error::Result;
use crate::types::{OperationLogEntry, OperationLogView, OperationType};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The fixed catalog of logged operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateFolder,
    RenameFolder,
    DeleteFolder,
    CreateAnchor,
    RenameAnchor,
    DescribeAnchor,
    BindFolders,
    RecycleAnchor,
    RestoreAnchor,
    EmptyRecycleBin,
    AddTags,
    RemoveTag,
    DeleteTag,
    CreateBackup,
    RestoreBackup,
    DeleteBackup,
}

impl OperationKind {
    /// Every kind, in registration order.
    pub const ALL: [OperationKind; 16] = [
        Self::CreateFolder,
        Self::RenameFolder,
        Self::DeleteFolder,
        Self::CreateAnchor,
        Self::RenameAnchor,
        Self::DescribeAnchor,
        Self::BindFolders,
        Self::RecycleAnchor,
        Self::RestoreAnchor,
        Self::EmptyRecycleBin,
        Self::AddTags,
        Self::RemoveTag,
        Self::DeleteTag,
        Self::CreateBackup,
        Self::RestoreBackup,
        Self::DeleteBackup,
    ];

    /// Unique display name stored in the operation type table.
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateFolder => "创建虚拟文件夹",
            Self::RenameFolder => "重命名虚拟文件夹",
            Self::DeleteFolder => "删除虚拟文件夹",
            Self::CreateAnchor => "创建锚点",
            Self::RenameAnchor => "重命名锚点",
            Self::DescribeAnchor => "修改锚点描述",
            Self::BindFolders => "绑定虚拟文件夹",
            Self::RecycleAnchor => "移入回收站",
            Self::RestoreAnchor => "从回收站恢复",
            Self::EmptyRecycleBin => "清空回收站",
            Self::AddTags => "添加标签",
            Self::RemoveTag => "移除标签",
            Self::DeleteTag => "删除标签",
            Self::CreateBackup => "创建备份",
            Self::RestoreBackup => "恢复备份",
            Self::DeleteBackup => "删除备份",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CreateFolder => "Create a user folder",
            Self::RenameFolder => "Rename or re-describe a user folder",
            Self::DeleteFolder => "Delete a user folder and its memberships",
            Self::CreateAnchor => "Track a new file",
            Self::RenameAnchor => "Rename an anchor",
            Self::DescribeAnchor => "Change an anchor's description",
            Self::BindFolders => "Add an anchor to folders",
            Self::RecycleAnchor => "Move an anchor to the recycle bin",
            Self::RestoreAnchor => "Bring an anchor back from the recycle bin",
            Self::EmptyRecycleBin => "Permanently delete recycled anchors",
            Self::AddTags => "Tag an anchor",
            Self::RemoveTag => "Untag an anchor",
            Self::DeleteTag => "Delete a tag everywhere",
            Self::CreateBackup => "Copy an anchor's file to the backup directory",
            Self::RestoreBackup => "Copy a backup back to the anchor's path",
            Self::DeleteBackup => "Delete a backup record and its file",
        }
    }
}

/// Appends a log entry. Failures are logged and swallowed; an unregistered
/// operation type is skipped.
pub fn record(catalog: &Catalog, kind: OperationKind, result: &str, now: i64) {
    if let Err(e) = try_record(catalog, kind, result, now) {
        warn!(operation = kind.name(), error = %e, "failed to record operation log entry");
    }
}

fn try_record(catalog: &Catalog, kind: OperationKind, result: &str, now: i64) -> Result<()> {
    let txn = catalog.write()?;
    let Some(operation_type_id) = txn.id_by_name::<OperationType>(kind.name())? else {
        debug!(operation = kind.name(), "operation type not registered, skipping log entry");
        return Ok(());
    };

    let entry = OperationLogEntry {
        id: txn.next_id::<OperationLogEntry>()?,
        operation_type_id,
        result: result.to_string(),
        time: now,
    };
    txn.put(&entry)?;
    txn.commit()
}

/// Lists log entries newest first, joined with their operation type.
pub fn list(catalog: &Catalog, limit: Option<usize>) -> Result<Vec<OperationLogView>> {
    let txn = catalog.read()?;
    let types: HashMap<u64, OperationType> = txn
        .all::<OperationType>()?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut entries = txn.all::<OperationLogEntry>()?;
    entries.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    Ok(entries
        .into_iter()
        .map(|entry| {
            let op_type = types.get(&entry.operation_type_id);
            OperationLogView {
                id: entry.id,
                operation_type_id: entry.operation_type_id,
                operation_type_name: op_type.map(|t| t.name.clone()).unwrap_or_default(),
                operation_type_description: op_type.and_then(|t| t.description.clone()),
                result: entry.result,
                time: entry.time,
            }
        })
        .collect())
}
