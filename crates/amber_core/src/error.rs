//! Error types for amber_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Four-way classification handed to the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity or file is absent.
    NotFound,
    /// Input is semantically disallowed.
    InvalidArgument,
    /// Uniqueness violation or an operation that would overwrite data.
    Conflict,
    /// Unexpected storage or I/O failure.
    Internal,
}

/// Core error type for amber_core operations.
#[derive(Error, Debug)]
pub enum AmberError {
    /// Folder with the given id does not exist.
    #[error("folder not found: {0}")]
    FolderNotFound(u64),

    /// Anchor with the given id does not exist.
    #[error("anchor not found: {0}")]
    AnchorNotFound(u64),

    /// Tag with the given id does not exist.
    #[error("tag not found: {0}")]
    TagNotFound(u64),

    /// Tag exists but is not bound to the anchor.
    #[error("tag {tag_id} is not bound to anchor {anchor_id}")]
    TagNotBound {
        /// The anchor that was asked about
        anchor_id: u64,
        /// The tag that is not bound
        tag_id: u64,
    },

    /// Backup record with the given id does not exist.
    #[error("backup record not found: {0}")]
    BackupNotFound(u64),

    /// A bookkeeping row is missing.
    #[error("{table} row not found: {id}")]
    RecordNotFound {
        /// Table name
        table: &'static str,
        /// Row id
        id: u64,
    },

    /// A system folder row is missing (bootstrap did not run).
    #[error("system folder missing: {0}")]
    SystemFolderMissing(&'static str),

    /// The anchor's file is not a regular file on disk.
    #[error("source file not found: {}", .0.display())]
    SourceFileMissing(PathBuf),

    /// The backup copy was removed from disk.
    #[error("backup file not found: {}", .0.display())]
    BackupFileMissing(PathBuf),

    /// A required name was empty after trimming.
    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    /// Attempted to mutate or target a system folder.
    #[error("system folder \"{0}\" cannot be used here")]
    SystemFolder(String),

    /// Anchor is in the recycle bin and must be restored first.
    #[error("anchor {0} is in the recycle bin; restore it first")]
    AnchorRecycled(u64),

    /// Anchor is not in the recycle bin.
    #[error("anchor {0} is not in the recycle bin")]
    AnchorNotRecycled(u64),

    /// No backup directory has been configured.
    #[error("backup path is not configured")]
    BackupRootNotConfigured,

    /// The chosen backup path is not an existing directory.
    #[error("backup path is not a directory: {}", .0.display())]
    BackupRootInvalid(PathBuf),

    /// A folder or tag with this name already exists.
    #[error("{kind} \"{name}\" already exists")]
    DuplicateName {
        /// Entity kind ("folder", "tag")
        kind: &'static str,
        /// The conflicting name
        name: String,
    },

    /// Restoring would overwrite an existing file.
    #[error("target file already exists, refusing to overwrite: {}", .0.display())]
    RestoreWouldOverwrite(PathBuf),

    /// Library directory is already initialized.
    #[error("library already exists at {}", .0.display())]
    LibraryExists(PathBuf),

    /// Library directory does not exist or is not initialized.
    #[error("not an AmberDay library: {}", .0.display())]
    LibraryNotFound(PathBuf),

    /// Library is held by another process.
    #[error("library locked by another process")]
    LibraryLocked,

    /// File copy failed.
    #[error("copy {} -> {} failed: {source}", from.display(), to.display())]
    CopyFailed {
        /// Source path
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Database schema version does not match this build.
    #[error("catalog schema version mismatch: found {found}, expected {expected}")]
    SchemaMismatch {
        /// Version stored in the database
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// Underlying redb failure.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Row encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AmberError {
    /// Classifies the error for the request layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FolderNotFound(_)
            | Self::AnchorNotFound(_)
            | Self::TagNotFound(_)
            | Self::TagNotBound { .. }
            | Self::BackupNotFound(_)
            | Self::RecordNotFound { .. }
            | Self::SystemFolderMissing(_)
            | Self::SourceFileMissing(_)
            | Self::BackupFileMissing(_)
            | Self::LibraryNotFound(_) => ErrorKind::NotFound,
            Self::EmptyName(_)
            | Self::SystemFolder(_)
            | Self::AnchorRecycled(_)
            | Self::AnchorNotRecycled(_)
            | Self::BackupRootNotConfigured
            | Self::BackupRootInvalid(_)
            | Self::ConfigError(_) => ErrorKind::InvalidArgument,
            Self::DuplicateName { .. }
            | Self::RestoreWouldOverwrite(_)
            | Self::LibraryExists(_)
            | Self::LibraryLocked => ErrorKind::Conflict,
            Self::CopyFailed { .. }
            | Self::SchemaMismatch { .. }
            | Self::Storage(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::BackupRootNotConfigured | Self::BackupRootInvalid(_) => {
                Some("Set an existing directory with 'amber settings backup-path <DIR>'.")
            }
            Self::AnchorRecycled(_) => {
                Some("Restore the anchor with 'amber anchor restore <ID> --folder <FOLDER>' first.")
            }
            Self::RestoreWouldOverwrite(_) => {
                Some("Move or rename the existing file, then restore the backup again.")
            }
            Self::LibraryNotFound(_) => Some("Create a library with 'amber init'."),
            Self::LibraryLocked => {
                Some("Another amber process is using this library. Wait for it to finish.")
            }
            Self::SystemFolderMissing(_) => {
                Some("Reopen the library so the system folders are recreated.")
            }
            Self::SchemaMismatch { .. } => {
                Some("This library was written by a different version of amber.")
            }
            _ => None,
        }
    }
}

macro_rules! storage_from {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for AmberError {
                fn from(e: $err) -> Self {
                    Self::Storage(e.into())
                }
            }
        )*
    };
}

storage_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl From<postcard::Error> for AmberError {
    fn from(e: postcard::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience Result type for amber_core operations.
pub type Result<T> = std::result::Result<T, AmberError>;
