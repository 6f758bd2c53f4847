//! Library handle providing the main AmberDay API.

use crate::anchors;
use crate::backup;
use crate::bootstrap::{self, SystemFolderIds};
use crate::catalog::Catalog;
use crate::error::{AmberError, Result};
use crate::folders;
use crate::oplog::{self, OperationKind};
use crate::settings::Settings;
use crate::tags;
use crate::types::{
    Anchor, AnchorState, AnchorView, BackupRecord, BackupView, Folder, OperationLogView,
    PathCheck, Tag,
};
use crate::validity::{self, CheckProgressCallback, ValidityReport};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Database file name inside the library directory.
pub const CATALOG_FILE: &str = "amber.redb";

/// Lock file name inside the library directory.
pub const LOCK_FILE: &str = "LOCK";

/// Directory name used under the platform data directory.
pub const LIBRARY_DIR_NAME: &str = "AmberDay_Data";

/// Environment variable overriding the library location.
pub const LIBRARY_ENV: &str = "AMBER_HOME";

/// Resolves the default library directory: `$AMBER_HOME`, else
/// `AmberDay_Data` under the platform's local data directory.
pub fn default_library_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(LIBRARY_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LIBRARY_DIR_NAME)
}

/// AmberDay library handle.
///
/// Owns the catalog and settings of one library directory and holds its
/// process lock for as long as it lives.
pub struct Library {
    /// Library directory.
    root: PathBuf,
    /// Entity store.
    catalog: Catalog,
    /// Loaded settings.
    settings: Settings,
    /// Result of the path check run at open.
    startup_report: ValidityReport,
    /// Held for the lifetime of the handle.
    _lock: LockGuard,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn Fn() -> i64 + Send + Sync>>,
}

impl Library {
    /// Opens an existing library.
    ///
    /// Takes the library lock, ensures the system folders and operation
    /// types exist, and refreshes every anchor's validity flag.
    ///
    /// # Errors
    ///
    /// - `LibraryNotFound` if the directory holds no catalog
    /// - `LibraryLocked` if another process has it open
    /// - `SchemaMismatch` if the catalog was written by another version
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use amber_core::Library;
    ///
    /// let library = Library::open("/home/me/AmberDay_Data").unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let catalog_path = root.join(CATALOG_FILE);
        if !catalog_path.exists() {
            return Err(AmberError::LibraryNotFound(root));
        }

        let lock = LockGuard::acquire(&root.join(LOCK_FILE))?;
        let catalog =
            Catalog::open(&catalog_path)?.ok_or_else(|| AmberError::LibraryNotFound(root.clone()))?;
        let settings = Settings::load(&root)?;

        let now = system_now();
        bootstrap::ensure_system_folders(&catalog, now)?;
        bootstrap::ensure_operation_types(&catalog)?;
        let startup_report = validity::check_all(&catalog, None)?;
        info!(
            checked = startup_report.checked,
            changed = startup_report.changed,
            missing = startup_report.missing.len(),
            catalog = %catalog.path().display(),
            "opened library"
        );

        Ok(Self {
            root,
            catalog,
            settings,
            startup_report,
            _lock: lock,
            time_provider: None,
        })
    }

    /// Initializes a new library directory and opens it.
    ///
    /// # Errors
    ///
    /// Returns `LibraryExists` if the directory already holds a catalog.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let catalog_path = root.join(CATALOG_FILE);
        if catalog_path.exists() {
            return Err(AmberError::LibraryExists(root));
        }

        fs::create_dir_all(&root)?;
        {
            let _lock = LockGuard::acquire(&root.join(LOCK_FILE))?;
            Catalog::create(&catalog_path)?;
            if !root.join(crate::settings::SETTINGS_FILE).exists() {
                Settings::default().save(&root)?;
            }
        }
        debug!(path = %root.display(), "initialized library");

        Self::open(root)
    }

    /// Opens the library, creating it first if needed.
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        if root.join(CATALOG_FILE).exists() {
            Self::open(root)
        } else {
            Self::init(root)
        }
    }

    /// Sets a custom time provider for testing.
    ///
    /// Every timestamp written after this call comes from `provider`.
    pub fn with_time_provider(
        mut self,
        provider: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    /// Current Unix timestamp in seconds.
    pub fn now(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider(),
            None => system_now(),
        }
    }

    /// Library directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The underlying entity store.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Path check performed when the library was opened.
    pub fn startup_report(&self) -> &ValidityReport {
        &self.startup_report
    }

    fn log(&self, kind: OperationKind, result: impl AsRef<str>) {
        oplog::record(&self.catalog, kind, result.as_ref(), self.now());
    }

    // Folders

    pub fn create_folder(&self, name: &str, description: Option<&str>) -> Result<Folder> {
        let folder = folders::create(&self.catalog, name, description, self.now())?;
        self.log(
            OperationKind::CreateFolder,
            format!("created folder \"{}\"", folder.name),
        );
        Ok(folder)
    }

    /// Renames and/or re-describes a user folder.
    pub fn update_folder(
        &self,
        folder_id: u64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Folder> {
        let (before, after) = folders::update(&self.catalog, folder_id, name, description)?;
        let result = if before.name != after.name {
            format!("renamed folder \"{}\" to \"{}\"", before.name, after.name)
        } else {
            format!("updated folder \"{}\"", after.name)
        };
        self.log(OperationKind::RenameFolder, result);
        Ok(after)
    }

    pub fn delete_folder(&self, folder_id: u64) -> Result<Folder> {
        let folder = folders::delete(&self.catalog, folder_id, self.now())?;
        self.log(
            OperationKind::DeleteFolder,
            format!("deleted folder \"{}\"", folder.name),
        );
        Ok(folder)
    }

    /// Ids of `ALL` and `RECYCLE`.
    pub fn system_folders(&self) -> Result<SystemFolderIds> {
        bootstrap::system_folders(&self.catalog)
    }

    pub fn list_folders(&self, keyword: Option<&str>) -> Result<Vec<Folder>> {
        folders::list(&self.catalog, keyword)
    }

    pub fn folder_anchors(&self, folder_id: u64) -> Result<Vec<AnchorView>> {
        folders::anchors(&self.catalog, folder_id)
    }

    /// Re-checks the paths of the anchors in one folder.
    pub fn check_folder(
        &self,
        folder_id: u64,
        progress: Option<&CheckProgressCallback>,
    ) -> Result<Vec<PathCheck>> {
        validity::check_folder(&self.catalog, folder_id, progress)
    }

    /// Re-checks every anchor's path.
    pub fn check_all(&self, progress: Option<&CheckProgressCallback>) -> Result<ValidityReport> {
        validity::check_all(&self.catalog, progress)
    }

    // Anchors

    pub fn create_anchor(
        &self,
        name: &str,
        path: &str,
        description: Option<&str>,
        folder_id: u64,
    ) -> Result<AnchorView> {
        let view = anchors::create(&self.catalog, name, path, description, folder_id, self.now())?;
        self.log(
            OperationKind::CreateAnchor,
            format!("created anchor #{} \"{}\"", view.anchor.id, view.anchor.path),
        );
        Ok(view)
    }

    pub fn anchor(&self, anchor_id: u64) -> Result<AnchorView> {
        anchors::get(&self.catalog, anchor_id)
    }

    pub fn anchor_state(&self, anchor_id: u64) -> Result<AnchorState> {
        anchors::state(&self.catalog, anchor_id)
    }

    pub fn rename_anchor(&self, anchor_id: u64, name: &str) -> Result<AnchorView> {
        let view = anchors::rename(&self.catalog, anchor_id, name, self.now())?;
        self.log(
            OperationKind::RenameAnchor,
            format!("renamed anchor #{} to \"{}\"", anchor_id, view.anchor.name),
        );
        Ok(view)
    }

    pub fn describe_anchor(&self, anchor_id: u64, text: &str) -> Result<AnchorView> {
        let view = anchors::update_description(&self.catalog, anchor_id, text, self.now())?;
        self.log(
            OperationKind::DescribeAnchor,
            format!("updated description of anchor #{}", anchor_id),
        );
        Ok(view)
    }

    pub fn bind_folders(&self, anchor_id: u64, folder_ids: &[u64]) -> Result<AnchorView> {
        let view = anchors::bind_folders(&self.catalog, anchor_id, folder_ids, self.now())?;
        self.log(
            OperationKind::BindFolders,
            format!("bound anchor #{} to folders {:?}", anchor_id, folder_ids),
        );
        Ok(view)
    }

    pub fn add_tags<I>(&self, anchor_id: u64, names: I) -> Result<AnchorView>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        let view = anchors::add_tags(&self.catalog, anchor_id, &names, self.now())?;
        self.log(
            OperationKind::AddTags,
            format!("tagged anchor #{} with {}", anchor_id, names.join(", ")),
        );
        Ok(view)
    }

    pub fn remove_tag(&self, anchor_id: u64, tag_id: u64) -> Result<AnchorView> {
        let view = anchors::remove_tag(&self.catalog, anchor_id, tag_id, self.now())?;
        self.log(
            OperationKind::RemoveTag,
            format!("removed tag #{} from anchor #{}", tag_id, anchor_id),
        );
        Ok(view)
    }

    /// Moves an anchor to the recycle bin. A no-op for recycled anchors.
    pub fn recycle_anchor(&self, anchor_id: u64) -> Result<AnchorView> {
        let was = anchors::state(&self.catalog, anchor_id)?;
        let view = anchors::recycle(&self.catalog, anchor_id, self.now())?;
        if was == AnchorState::Active {
            self.log(
                OperationKind::RecycleAnchor,
                format!("moved anchor #{} to the recycle bin", anchor_id),
            );
        }
        Ok(view)
    }

    pub fn restore_anchor(&self, anchor_id: u64, folder_id: u64) -> Result<AnchorView> {
        let view = anchors::restore(&self.catalog, anchor_id, folder_id, self.now())?;
        self.log(
            OperationKind::RestoreAnchor,
            format!("restored anchor #{} into folder #{}", anchor_id, folder_id),
        );
        Ok(view)
    }

    pub fn recycled_anchors(&self) -> Result<Vec<AnchorView>> {
        anchors::list_recycled(&self.catalog)
    }

    /// Permanently deletes every recycled anchor. Returns how many were purged.
    pub fn empty_recycle_bin(&self) -> Result<usize> {
        let purged: Vec<Anchor> = anchors::empty_recycle_bin(&self.catalog)?;
        self.log(
            OperationKind::EmptyRecycleBin,
            format!("emptied recycle bin, purged {} anchors", purged.len()),
        );
        Ok(purged.len())
    }

    // Tags

    pub fn tags(&self) -> Result<Vec<Tag>> {
        tags::list(&self.catalog)
    }

    pub fn popular_tags(&self) -> Result<Vec<Tag>> {
        tags::popular(&self.catalog)
    }

    pub fn delete_tag(&self, tag_id: u64) -> Result<Tag> {
        let tag = tags::delete(&self.catalog, tag_id, self.now())?;
        self.log(
            OperationKind::DeleteTag,
            format!("deleted tag \"{}\"", tag.name),
        );
        Ok(tag)
    }

    pub fn anchors_with_tags<I>(&self, folder_id: u64, names: I) -> Result<Vec<AnchorView>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        tags::anchors_with_tags(&self.catalog, folder_id, names)
    }

    // Backups

    /// Copies an anchor's file into the configured backup directory.
    pub fn backup_anchor(&self, anchor_id: u64) -> Result<BackupRecord> {
        let root = self.settings.backup_root();
        let record = backup::backup(&self.catalog, anchor_id, root.as_deref(), self.now())?;
        self.log(
            OperationKind::CreateBackup,
            format!("backed up anchor #{} to {}", anchor_id, record.backup_path),
        );
        Ok(record)
    }

    pub fn restore_backup(&self, backup_id: u64) -> Result<(BackupRecord, Anchor)> {
        let (record, anchor) = backup::restore(&self.catalog, backup_id)?;
        self.log(
            OperationKind::RestoreBackup,
            format!("restored backup #{} to {}", backup_id, anchor.path),
        );
        Ok((record, anchor))
    }

    pub fn delete_backup(&self, backup_id: u64) -> Result<BackupRecord> {
        let record = backup::delete(&self.catalog, backup_id)?;
        self.log(
            OperationKind::DeleteBackup,
            format!("deleted backup #{}", backup_id),
        );
        Ok(record)
    }

    pub fn backups(&self) -> Result<Vec<BackupView>> {
        backup::list(&self.catalog)
    }

    pub fn anchor_backups(&self, anchor_id: u64) -> Result<Vec<BackupView>> {
        backup::list_for_anchor(&self.catalog, anchor_id)
    }

    // Settings & log

    /// Points backups at an existing directory and saves the settings.
    pub fn set_backup_path(&mut self, path: &str) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.set_backup_path(path)?;
        settings.save(&self.root)?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_open_last_folder(&mut self, enabled: bool) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.open_last_folder = enabled;
        settings.save(&self.root)?;
        self.settings = settings;
        Ok(())
    }

    /// Operation log, newest first.
    pub fn operation_log(&self, limit: Option<usize>) -> Result<Vec<OperationLogView>> {
        oplog::list(&self.catalog, limit)
    }
}

fn system_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// RAII guard for the library lock.
///
/// Holds an exclusive advisory lock on the library's LOCK file. The OS
/// releases it when the file is closed, including when the process dies.
struct LockGuard {
    /// The open lock file.
    file: File,
}

impl LockGuard {
    fn acquire(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| AmberError::LibraryLocked)?;

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;
        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
