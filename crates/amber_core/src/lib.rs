//! AmberDay Core Library
//!
//! A personal file-reference manager, providing:
//! - Anchors: tracked pointers to files that live elsewhere on disk
//! - Virtual folders and tags to organize them
//! - A recycle bin with restore and permanent purge
//! - Path validity tracking
//! - Copy-based backup and restore
//!
//! # Quick Start
//!
//! ```
//! use amber_core::Library;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let library = Library::init(tmp.path().join("library")).unwrap();
//!
//! let folder = library.create_folder("homework", None).unwrap();
//! let anchor = library
//!     .create_anchor("essay", "~/Documents/essay.docx", None, folder.id)
//!     .unwrap();
//! library.add_tags(anchor.anchor.id, ["draft", "english"]).unwrap();
//!
//! let found = library.anchors_with_tags(folder.id, ["draft"]).unwrap();
//! assert_eq!(found.len(), 1);
//! ```
//!
//! # Recycle Bin
//!
//! Recycling releases an anchor's folders and tags; restoring puts it back
//! into `ALL` plus one chosen folder:
//!
//! ```
//! use amber_core::{AnchorState, Library};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let library = Library::init(tmp.path().join("library")).unwrap();
//! let folder = library.create_folder("reports", None).unwrap();
//! let id = library
//!     .create_anchor("q3", "/srv/q3.xlsx", None, folder.id)
//!     .unwrap()
//!     .anchor
//!     .id;
//!
//! library.recycle_anchor(id).unwrap();
//! assert_eq!(library.anchor_state(id).unwrap(), AnchorState::Recycled);
//!
//! library.restore_anchor(id, folder.id).unwrap();
//! assert_eq!(library.anchor_state(id).unwrap(), AnchorState::Active);
//! ```

pub mod anchors;
pub mod backup;
pub mod bootstrap;
mod catalog;
mod error;
pub mod folders;
mod library;
pub mod oplog;
mod settings;
pub mod tags;
mod types;
pub mod validity;

pub use bootstrap::SystemFolderIds;
pub use catalog::{Catalog, CATALOG_SCHEMA_VERSION};
pub use error::{AmberError, ErrorKind, Result};
pub use library::{
    default_library_dir, Library, CATALOG_FILE, LIBRARY_DIR_NAME, LIBRARY_ENV, LOCK_FILE,
};
pub use oplog::OperationKind;
pub use settings::{Settings, SETTINGS_FILE};
pub use types::*;
pub use validity::{resolve_path, CheckProgressCallback, ValidityReport};
