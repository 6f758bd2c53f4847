//! Core data types for AmberDay.

use serde::{Deserialize, Serialize};

/// Display name of the folder every live anchor belongs to.
pub const ALL_FOLDER_NAME: &str = "全部资料";

/// Display name of the recycle bin folder.
pub const RECYCLE_FOLDER_NAME: &str = "回收站";

/// The two mandatory folders created at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemFolder {
    /// Holds every anchor that is not recycled.
    All,
    /// Holds recycled anchors, exclusively.
    Recycle,
}

impl SystemFolder {
    /// Both system folders, in creation order.
    pub const ALL_KINDS: [SystemFolder; 2] = [SystemFolder::All, SystemFolder::Recycle];

    /// The unique folder name.
    pub fn name(self) -> &'static str {
        match self {
            Self::All => ALL_FOLDER_NAME,
            Self::Recycle => RECYCLE_FOLDER_NAME,
        }
    }

    /// Returns the system folder using this name, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL_KINDS.into_iter().find(|kind| kind.name() == name)
    }
}

/// A virtual folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Row id.
    pub id: u64,
    /// Unique name.
    pub name: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// True for the two immutable system folders.
    pub is_system: bool,
}

/// A tracked reference to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Row id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Path as entered by the user. `~` is expanded at use time.
    pub path: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of the last mutation.
    pub updated_at: i64,
    /// Cached result of the last existence check.
    pub is_valid: bool,
}

/// A label that can be bound to many anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Row id.
    pub id: u64,
    /// Unique name.
    pub name: String,
    /// Number of live anchor bindings.
    pub use_count: u64,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

/// A copy of an anchor's file under the backup root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Row id.
    pub id: u64,
    /// Owning anchor.
    pub anchor_id: u64,
    /// Absolute path of the copy.
    pub backup_path: String,
    /// Unix timestamp of the copy.
    pub backup_time: i64,
}

/// A named kind of logged operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationType {
    /// Row id.
    pub id: u64,
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// One append-only operation log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    /// Row id.
    pub id: u64,
    /// The operation type this entry belongs to.
    pub operation_type_id: u64,
    /// Human-readable outcome.
    pub result: String,
    /// Unix timestamp.
    pub time: i64,
}

/// Operation log entry joined with its type, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationLogView {
    /// Log row id.
    pub id: u64,
    /// Operation type id.
    pub operation_type_id: u64,
    /// Operation type name.
    pub operation_type_name: String,
    /// Operation type description.
    pub operation_type_description: Option<String>,
    /// Outcome text.
    pub result: String,
    /// Unix timestamp.
    pub time: i64,
}

/// Membership state of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnchorState {
    /// Bound to `ALL` and at least one user folder.
    Active,
    /// Bound to the recycle bin only.
    Recycled,
}

/// An anchor together with its folder and tag memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorView {
    /// The anchor row.
    #[serde(flatten)]
    pub anchor: Anchor,
    /// Bound folder ids, ascending.
    pub folder_ids: Vec<u64>,
    /// Bound tag ids, ascending.
    pub tag_ids: Vec<u64>,
}

/// Result of checking one anchor's path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCheck {
    /// Anchor id.
    pub anchor_id: u64,
    /// Path as stored.
    pub path: String,
    /// Whether the path currently exists.
    pub is_valid: bool,
}

/// Backup record joined with its anchor, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupView {
    /// Backup row id.
    pub id: u64,
    /// Owning anchor id.
    pub anchor_id: u64,
    /// Owning anchor name.
    pub anchor_name: String,
    /// Owning anchor path.
    pub anchor_path: String,
    /// Path of the copy.
    pub backup_path: String,
    /// Unix timestamp of the copy.
    pub backup_time: i64,
}
