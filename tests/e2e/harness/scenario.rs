use super::assertions::Assertion;
use super::runner::ScenarioRunner;
use super::steps::ScenarioStep;
use amber_core::{AnchorState, ErrorKind, OperationKind};
use std::collections::HashMap;
use std::time::Duration;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    initial_files: HashMap<String, Vec<u8>>,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            initial_files: HashMap::new(),
            steps: Vec::new(),
        }
    }

    fn push(mut self, step: ScenarioStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Replaces the last pushed step with one that must fail with `kind`.
    fn fail_last(mut self, kind: ErrorKind) -> Self {
        if let Some(step) = self.steps.pop() {
            self.steps.push(ScenarioStep::ExpectFailure {
                step: Box::new(step),
                kind,
            });
        }
        self
    }

    // ===== Initial setup =====

    /// Add a user file that exists before the library is created
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.initial_files
            .insert(path.to_string(), content.to_vec());
        self
    }

    // ===== Files =====

    pub fn user_writes(self, path: &str, content: &[u8]) -> Self {
        self.push(ScenarioStep::WriteFile {
            path: path.to_string(),
            content: content.to_vec(),
        })
    }

    pub fn user_deletes_file(self, path: &str) -> Self {
        self.push(ScenarioStep::RemoveFile {
            path: path.to_string(),
        })
    }

    // ===== Folders =====

    pub fn create_folder(self, name: &str) -> Self {
        self.push(ScenarioStep::CreateFolder {
            name: name.to_string(),
        })
    }

    pub fn rename_folder(self, from: &str, to: &str) -> Self {
        self.push(ScenarioStep::RenameFolder {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn delete_folder(self, name: &str) -> Self {
        self.push(ScenarioStep::DeleteFolder {
            name: name.to_string(),
        })
    }

    // ===== Anchors =====

    /// Anchor `file` under `folder`, remembering it as `label`
    pub fn create_anchor(self, label: &str, file: &str, folder: &str) -> Self {
        self.push(ScenarioStep::CreateAnchor {
            label: label.to_string(),
            file: file.to_string(),
            folder: folder.to_string(),
        })
    }

    pub fn bind_folders(self, anchor: &str, folders: &[&str]) -> Self {
        self.push(ScenarioStep::BindFolders {
            anchor: anchor.to_string(),
            folders: folders.iter().map(|f| f.to_string()).collect(),
        })
    }

    pub fn add_tags(self, anchor: &str, tags: &[&str]) -> Self {
        self.push(ScenarioStep::AddTags {
            anchor: anchor.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    pub fn remove_tag(self, anchor: &str, tag: &str) -> Self {
        self.push(ScenarioStep::RemoveTag {
            anchor: anchor.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn delete_tag(self, tag: &str) -> Self {
        self.push(ScenarioStep::DeleteTag {
            tag: tag.to_string(),
        })
    }

    pub fn recycle(self, anchor: &str) -> Self {
        self.push(ScenarioStep::Recycle {
            anchor: anchor.to_string(),
        })
    }

    pub fn restore(self, anchor: &str, folder: &str) -> Self {
        self.push(ScenarioStep::Restore {
            anchor: anchor.to_string(),
            folder: folder.to_string(),
        })
    }

    pub fn empty_recycle_bin(self) -> Self {
        self.push(ScenarioStep::EmptyRecycleBin)
    }

    pub fn check_all(self) -> Self {
        self.push(ScenarioStep::CheckAll)
    }

    // ===== Backups =====

    /// Point the backup root at the workspace's backup directory
    pub fn configure_backup_dir(self) -> Self {
        self.push(ScenarioStep::ConfigureBackupDir)
    }

    pub fn backup(self, anchor: &str, label: &str) -> Self {
        self.push(ScenarioStep::Backup {
            anchor: anchor.to_string(),
            label: label.to_string(),
        })
    }

    pub fn restore_backup(self, label: &str) -> Self {
        self.push(ScenarioStep::RestoreBackup {
            label: label.to_string(),
        })
    }

    pub fn delete_backup(self, label: &str) -> Self {
        self.push(ScenarioStep::DeleteBackup {
            label: label.to_string(),
        })
    }

    // ===== Failures =====

    pub fn fails_not_found(self) -> Self {
        self.fail_last(ErrorKind::NotFound)
    }

    pub fn fails_invalid(self) -> Self {
        self.fail_last(ErrorKind::InvalidArgument)
    }

    pub fn fails_conflict(self) -> Self {
        self.fail_last(ErrorKind::Conflict)
    }

    // ===== Time control =====

    pub fn wait(self, duration: Duration) -> Self {
        self.push(ScenarioStep::Wait { duration })
    }

    pub fn wait_hours(self, hours: u64) -> Self {
        self.wait(Duration::from_secs(hours * 3600))
    }

    pub fn wait_days(self, days: u64) -> Self {
        self.wait(Duration::from_secs(days * 86400))
    }

    // ===== Process lifecycle =====

    /// Drop the library without any cleanup
    pub fn crash(self) -> Self {
        self.push(ScenarioStep::Crash)
    }

    /// Reopen the library after a crash
    pub fn restart(self) -> Self {
        self.push(ScenarioStep::Restart)
    }

    // ===== Assertions =====

    pub fn assert(self, assertion: Assertion) -> Self {
        self.push(ScenarioStep::Assert { assertion })
    }

    pub fn assert_active(self, anchor: &str) -> Self {
        self.assert(Assertion::AnchorState {
            anchor: anchor.to_string(),
            state: AnchorState::Active,
        })
    }

    pub fn assert_recycled(self, anchor: &str) -> Self {
        self.assert(Assertion::AnchorState {
            anchor: anchor.to_string(),
            state: AnchorState::Recycled,
        })
    }

    pub fn assert_in_folder(self, anchor: &str, folder: &str) -> Self {
        self.assert(Assertion::AnchorInFolder {
            anchor: anchor.to_string(),
            folder: folder.to_string(),
        })
    }

    pub fn assert_not_in_folder(self, anchor: &str, folder: &str) -> Self {
        self.assert(Assertion::AnchorNotInFolder {
            anchor: anchor.to_string(),
            folder: folder.to_string(),
        })
    }

    pub fn assert_valid(self, anchor: &str, valid: bool) -> Self {
        self.assert(Assertion::AnchorValid {
            anchor: anchor.to_string(),
            valid,
        })
    }

    pub fn assert_use_count(self, tag: &str, count: u64) -> Self {
        self.assert(Assertion::TagUseCount {
            tag: tag.to_string(),
            count,
        })
    }

    pub fn assert_recycle_bin_count(self, count: usize) -> Self {
        self.assert(Assertion::RecycleBinCount(count))
    }

    pub fn assert_backup_count(self, anchor: &str, count: usize) -> Self {
        self.assert(Assertion::BackupCount {
            anchor: anchor.to_string(),
            count,
        })
    }

    pub fn assert_file_content(self, path: &str, content: &[u8]) -> Self {
        self.assert(Assertion::FileContent {
            path: path.to_string(),
            content: content.to_vec(),
        })
    }

    pub fn assert_logged(self, kind: OperationKind) -> Self {
        self.assert(Assertion::OperationLogged(kind))
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner = match ScenarioRunner::new(self.initial_files.clone()) {
            Ok(r) => r,
            Err(e) => {
                return ScenarioResult {
                    name: self.name.clone(),
                    success: false,
                    steps_executed: 0,
                    failure_step: Some(0),
                    error: Some(format!("Failed to create runner: {}", e)),
                }
            }
        };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Panics with the failing step if the scenario did not pass
    pub fn unwrap(self) {
        self.expect("scenario failed");
    }

    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
