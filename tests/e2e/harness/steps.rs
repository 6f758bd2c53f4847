use amber_core::ErrorKind;
use std::time::Duration;

use super::assertions::Assertion;

/// All possible actions in a test scenario.
///
/// Anchors and backups are referred to by scenario-local labels since their
/// ids are only known at run time. Folders and tags are referred to by name.
#[derive(Debug)]
pub enum ScenarioStep {
    // Files on disk
    WriteFile {
        path: String,
        content: Vec<u8>,
    },
    RemoveFile {
        path: String,
    },

    // Folders
    CreateFolder {
        name: String,
    },
    RenameFolder {
        from: String,
        to: String,
    },
    DeleteFolder {
        name: String,
    },

    // Anchors
    CreateAnchor {
        label: String,
        file: String,
        folder: String,
    },
    BindFolders {
        anchor: String,
        folders: Vec<String>,
    },
    AddTags {
        anchor: String,
        tags: Vec<String>,
    },
    RemoveTag {
        anchor: String,
        tag: String,
    },
    DeleteTag {
        tag: String,
    },
    Recycle {
        anchor: String,
    },
    Restore {
        anchor: String,
        folder: String,
    },
    EmptyRecycleBin,
    CheckAll,

    // Backups
    ConfigureBackupDir,
    Backup {
        anchor: String,
        label: String,
    },
    RestoreBackup {
        label: String,
    },
    DeleteBackup {
        label: String,
    },

    /// Runs the inner step and requires it to fail with `kind`.
    ExpectFailure {
        step: Box<ScenarioStep>,
        kind: ErrorKind,
    },

    // Time control
    Wait {
        duration: Duration,
    },

    // Process lifecycle
    Crash,
    Restart,

    Assert {
        assertion: Assertion,
    },
}
