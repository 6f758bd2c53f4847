//! Persistent entity store.
//!
//! Every record lives in a single redb database. Rows are postcard-encoded and
//! keyed by a per-kind sequence number. Unique names are kept in separate
//! name → id tables. Many-to-many relations are stored twice, once per
//! direction, as `(left, right) -> ()` keys so that membership can be scanned
//! from either side with a range query.
//!
//! All access goes through [`ReadTxn`] or [`WriteTxn`]; a mutating operation
//! does all of its work inside one write transaction and commits once.

use crate::error::{AmberError, Result};
use crate::types::{
    Anchor, AnchorState, AnchorView, BackupRecord, Folder, OperationLogEntry, OperationType,
    SystemFolder, Tag,
};
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog schema version for migration support.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

// Table definitions
const METADATA_TABLE: TableDefinition<&str, u32> = TableDefinition::new("metadata");
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence");
const FOLDER_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("folders");
const FOLDER_NAME_TABLE: TableDefinition<&str, u64> = TableDefinition::new("folder_names");
const ANCHOR_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("anchors");
const TAG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("tags");
const TAG_NAME_TABLE: TableDefinition<&str, u64> = TableDefinition::new("tag_names");
const BACKUP_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("backups");
const OPERATION_TYPE_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("operation_types");
const OPERATION_TYPE_NAME_TABLE: TableDefinition<&str, u64> =
    TableDefinition::new("operation_type_names");
const OPERATION_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("operation_log");
const ANCHOR_FOLDER_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("anchor_folder");
const FOLDER_ANCHOR_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("folder_anchor");
const ANCHOR_TAG_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("anchor_tag");
const TAG_ANCHOR_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("tag_anchor");
const ANCHOR_BACKUP_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("anchor_backup");
const BACKUP_ANCHOR_TABLE: TableDefinition<(u64, u64), ()> = TableDefinition::new("backup_anchor");

/// A persisted record kind with its own table and id sequence.
pub(crate) trait Row: Serialize + DeserializeOwned {
    /// Table holding the encoded rows.
    const TABLE: TableDefinition<'static, u64, &'static [u8]>;
    /// Sequence key used to allocate ids.
    const SEQUENCE: &'static str;

    /// Row id.
    fn id(&self) -> u64;

    /// Error returned when a lookup by id misses.
    fn not_found(id: u64) -> AmberError;
}

/// A row kind whose `name` is unique.
pub(crate) trait Named: Row {
    /// Name → id index.
    const NAME_TABLE: TableDefinition<'static, &'static str, u64>;
    /// Entity label used in conflict messages.
    const KIND: &'static str;

    /// The unique name.
    fn name(&self) -> &str;
}

impl Row for Folder {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = FOLDER_TABLE;
    const SEQUENCE: &'static str = "folder";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::FolderNotFound(id)
    }
}

impl Named for Folder {
    const NAME_TABLE: TableDefinition<'static, &'static str, u64> = FOLDER_NAME_TABLE;
    const KIND: &'static str = "folder";

    fn name(&self) -> &str {
        &self.name
    }
}

impl Row for Anchor {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = ANCHOR_TABLE;
    const SEQUENCE: &'static str = "anchor";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::AnchorNotFound(id)
    }
}

impl Row for Tag {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = TAG_TABLE;
    const SEQUENCE: &'static str = "tag";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::TagNotFound(id)
    }
}

impl Named for Tag {
    const NAME_TABLE: TableDefinition<'static, &'static str, u64> = TAG_NAME_TABLE;
    const KIND: &'static str = "tag";

    fn name(&self) -> &str {
        &self.name
    }
}

impl Row for BackupRecord {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = BACKUP_TABLE;
    const SEQUENCE: &'static str = "backup";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::BackupNotFound(id)
    }
}

impl Row for OperationType {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = OPERATION_TYPE_TABLE;
    const SEQUENCE: &'static str = "operation_type";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::RecordNotFound {
            table: "operation_types",
            id,
        }
    }
}

impl Named for OperationType {
    const NAME_TABLE: TableDefinition<'static, &'static str, u64> = OPERATION_TYPE_NAME_TABLE;
    const KIND: &'static str = "operation type";

    fn name(&self) -> &str {
        &self.name
    }
}

impl Row for OperationLogEntry {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = OPERATION_LOG_TABLE;
    const SEQUENCE: &'static str = "operation_log";

    fn id(&self) -> u64 {
        self.id
    }

    fn not_found(id: u64) -> AmberError {
        AmberError::RecordNotFound {
            table: "operation_log",
            id,
        }
    }
}

/// A many-to-many (or one-to-many) membership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    /// Anchor ↔ virtual folder.
    AnchorFolder,
    /// Anchor ↔ tag.
    AnchorTag,
    /// Anchor → its backup records.
    AnchorBackup,
}

impl Relation {
    /// Table keyed `(anchor, other)`.
    fn forward(self) -> TableDefinition<'static, (u64, u64), ()> {
        match self {
            Self::AnchorFolder => ANCHOR_FOLDER_TABLE,
            Self::AnchorTag => ANCHOR_TAG_TABLE,
            Self::AnchorBackup => ANCHOR_BACKUP_TABLE,
        }
    }

    /// Table keyed `(other, anchor)`.
    fn reverse(self) -> TableDefinition<'static, (u64, u64), ()> {
        match self {
            Self::AnchorFolder => FOLDER_ANCHOR_TABLE,
            Self::AnchorTag => TAG_ANCHOR_TABLE,
            Self::AnchorBackup => BACKUP_ANCHOR_TABLE,
        }
    }
}

/// The on-disk entity store.
pub struct Catalog {
    db: Database,
    path: PathBuf,
}

impl Catalog {
    /// Opens an existing catalog database.
    ///
    /// Returns `None` if the database file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database can't be opened or has a schema version mismatch.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(None);
        }

        let db = Database::open(&path)?;

        {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(METADATA_TABLE)?;
            let found = table.get("version")?.map(|v| v.value());
            if let Some(found) = found {
                if found != CATALOG_SCHEMA_VERSION {
                    return Err(AmberError::SchemaMismatch {
                        found,
                        expected: CATALOG_SCHEMA_VERSION,
                    });
                }
            }
        }

        let catalog = Self { db, path };
        catalog.ensure_tables()?;
        Ok(Some(catalog))
    }

    /// Creates a new catalog database and stamps the schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database can't be created or initialized.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path)?;

        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(METADATA_TABLE)?;
            table.insert("version", CATALOG_SCHEMA_VERSION)?;
        }
        write_txn.commit()?;

        let catalog = Self { db, path };
        catalog.ensure_tables()?;
        debug!(path = %catalog.path.display(), "created catalog");
        Ok(catalog)
    }

    /// Returns the path to the database file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Begins a read-only snapshot.
    pub(crate) fn read(&self) -> Result<ReadTxn> {
        Ok(ReadTxn {
            txn: self.db.begin_read()?,
        })
    }

    /// Begins the single write transaction. Dropping it without
    /// [`WriteTxn::commit`] discards every change.
    pub(crate) fn write(&self) -> Result<WriteTxn> {
        Ok(WriteTxn {
            txn: self.db.begin_write()?,
        })
    }

    /// Read transactions fail on tables that were never opened for writing.
    fn ensure_tables(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        txn.open_table(METADATA_TABLE)?;
        txn.open_table(SEQUENCE_TABLE)?;
        for table in [
            FOLDER_TABLE,
            ANCHOR_TABLE,
            TAG_TABLE,
            BACKUP_TABLE,
            OPERATION_TYPE_TABLE,
            OPERATION_LOG_TABLE,
        ] {
            txn.open_table(table)?;
        }
        for table in [FOLDER_NAME_TABLE, TAG_NAME_TABLE, OPERATION_TYPE_NAME_TABLE] {
            txn.open_table(table)?;
        }
        for relation in [
            Relation::AnchorFolder,
            Relation::AnchorTag,
            Relation::AnchorBackup,
        ] {
            txn.open_table(relation.forward())?;
            txn.open_table(relation.reverse())?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// Read-only snapshot of the catalog.
pub(crate) struct ReadTxn {
    txn: ReadTransaction,
}

/// The catalog's write transaction.
pub(crate) struct WriteTxn {
    txn: WriteTransaction,
}

/// Queries shared by read and write transactions.
pub(crate) trait Reader {
    fn get<T: Row>(&self, id: u64) -> Result<Option<T>>;

    /// Every row of a kind, ordered by id.
    fn all<T: Row>(&self) -> Result<Vec<T>>;

    fn id_by_name<T: Named>(&self, name: &str) -> Result<Option<u64>>;

    /// Right-hand ids related to `left`, ascending.
    fn related(&self, relation: Relation, left: u64) -> Result<Vec<u64>>;

    /// Left-hand ids related to `right`, ascending.
    fn related_reverse(&self, relation: Relation, right: u64) -> Result<Vec<u64>>;

    fn is_related(&self, relation: Relation, left: u64, right: u64) -> Result<bool>;

    fn require<T: Row>(&self, id: u64) -> Result<T> {
        self.get(id)?.ok_or_else(|| T::not_found(id))
    }

    fn find_by_name<T: Named>(&self, name: &str) -> Result<Option<T>> {
        match self.id_by_name::<T>(name)? {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// Id of a bootstrapped system folder.
    fn system_folder_id(&self, kind: SystemFolder) -> Result<u64> {
        self.id_by_name::<Folder>(kind.name())?
            .ok_or(AmberError::SystemFolderMissing(kind.name()))
    }

    /// An anchor is recycled iff it is a member of the recycle bin.
    fn anchor_state(&self, anchor_id: u64) -> Result<AnchorState> {
        let recycle = self.system_folder_id(SystemFolder::Recycle)?;
        if self.is_related(Relation::AnchorFolder, anchor_id, recycle)? {
            Ok(AnchorState::Recycled)
        } else {
            Ok(AnchorState::Active)
        }
    }

    fn anchor_view(&self, anchor: Anchor) -> Result<AnchorView> {
        let folder_ids = self.related(Relation::AnchorFolder, anchor.id)?;
        let tag_ids = self.related(Relation::AnchorTag, anchor.id)?;
        Ok(AnchorView {
            anchor,
            folder_ids,
            tag_ids,
        })
    }

    /// Anchors bound to a folder, ordered by anchor id.
    fn folder_anchors(&self, folder_id: u64) -> Result<Vec<Anchor>> {
        self.related_reverse(Relation::AnchorFolder, folder_id)?
            .into_iter()
            .map(|id| self.require::<Anchor>(id))
            .collect()
    }
}

macro_rules! impl_reader {
    ($txn:ty) => {
        impl Reader for $txn {
            fn get<T: Row>(&self, id: u64) -> Result<Option<T>> {
                let table = self.txn.open_table(T::TABLE)?;
                let row = match table.get(id)? {
                    Some(bytes) => Some(postcard::from_bytes(bytes.value())?),
                    None => None,
                };
                Ok(row)
            }

            fn all<T: Row>(&self) -> Result<Vec<T>> {
                let table = self.txn.open_table(T::TABLE)?;
                let mut rows = Vec::new();
                for entry in table.iter()? {
                    let (_, bytes) = entry?;
                    rows.push(postcard::from_bytes(bytes.value())?);
                }
                Ok(rows)
            }

            fn id_by_name<T: Named>(&self, name: &str) -> Result<Option<u64>> {
                let table = self.txn.open_table(T::NAME_TABLE)?;
                let id = table.get(name)?.map(|v| v.value());
                Ok(id)
            }

            fn related(&self, relation: Relation, left: u64) -> Result<Vec<u64>> {
                let table = self.txn.open_table(relation.forward())?;
                let mut ids = Vec::new();
                for entry in table.range((left, 0)..=(left, u64::MAX))? {
                    let (key, _) = entry?;
                    ids.push(key.value().1);
                }
                Ok(ids)
            }

            fn related_reverse(&self, relation: Relation, right: u64) -> Result<Vec<u64>> {
                let table = self.txn.open_table(relation.reverse())?;
                let mut ids = Vec::new();
                for entry in table.range((right, 0)..=(right, u64::MAX))? {
                    let (key, _) = entry?;
                    ids.push(key.value().1);
                }
                Ok(ids)
            }

            fn is_related(&self, relation: Relation, left: u64, right: u64) -> Result<bool> {
                let table = self.txn.open_table(relation.forward())?;
                let found = table.get((left, right))?.is_some();
                Ok(found)
            }
        }
    };
}

impl_reader!(ReadTxn);
impl_reader!(WriteTxn);

impl WriteTxn {
    /// Allocates the next id for a row kind. Ids start at 1 and are never reused.
    pub(crate) fn next_id<T: Row>(&self) -> Result<u64> {
        let mut table = self.txn.open_table(SEQUENCE_TABLE)?;
        let next = table.get(T::SEQUENCE)?.map(|v| v.value()).unwrap_or(0) + 1;
        table.insert(T::SEQUENCE, next)?;
        Ok(next)
    }

    /// Inserts or replaces a row.
    pub(crate) fn put<T: Row>(&self, row: &T) -> Result<()> {
        let bytes = postcard::to_allocvec(row)?;
        let mut table = self.txn.open_table(T::TABLE)?;
        table.insert(row.id(), bytes.as_slice())?;
        Ok(())
    }

    /// Removes a row. Returns whether it existed.
    pub(crate) fn remove<T: Row>(&self, id: u64) -> Result<bool> {
        let mut table = self.txn.open_table(T::TABLE)?;
        let existed = table.remove(id)?.is_some();
        Ok(existed)
    }

    /// Inserts a named row, claiming its name.
    ///
    /// Callers check for duplicates first; the name index check here is the
    /// last line against a duplicate slipping through.
    pub(crate) fn insert_named<T: Named>(&self, row: &T) -> Result<()> {
        self.claim_name::<T>(row.name(), row.id())?;
        self.put(row)
    }

    /// Replaces a named row, moving its name index entry if the name changed.
    pub(crate) fn update_named<T: Named>(&self, old_name: &str, row: &T) -> Result<()> {
        if old_name != row.name() {
            self.claim_name::<T>(row.name(), row.id())?;
            self.release_name::<T>(old_name)?;
        }
        self.put(row)
    }

    /// Removes a named row and its name index entry.
    pub(crate) fn remove_named<T: Named>(&self, row: &T) -> Result<()> {
        self.release_name::<T>(row.name())?;
        self.remove::<T>(row.id())?;
        Ok(())
    }

    fn claim_name<T: Named>(&self, name: &str, id: u64) -> Result<()> {
        let mut table = self.txn.open_table(T::NAME_TABLE)?;
        let owner = table.get(name)?.map(|v| v.value());
        match owner {
            Some(owner) if owner != id => Err(AmberError::DuplicateName {
                kind: T::KIND,
                name: name.to_string(),
            }),
            _ => {
                table.insert(name, id)?;
                Ok(())
            }
        }
    }

    fn release_name<T: Named>(&self, name: &str) -> Result<()> {
        let mut table = self.txn.open_table(T::NAME_TABLE)?;
        table.remove(name)?;
        Ok(())
    }

    /// Records a membership. Returns `true` if it was not already present.
    pub(crate) fn relate(&self, relation: Relation, left: u64, right: u64) -> Result<bool> {
        let mut forward = self.txn.open_table(relation.forward())?;
        let mut reverse = self.txn.open_table(relation.reverse())?;
        let existed = forward.insert((left, right), ())?.is_some();
        reverse.insert((right, left), ())?;
        Ok(!existed)
    }

    /// Removes a membership. Returns `true` if it was present.
    pub(crate) fn unrelate(&self, relation: Relation, left: u64, right: u64) -> Result<bool> {
        let mut forward = self.txn.open_table(relation.forward())?;
        let mut reverse = self.txn.open_table(relation.reverse())?;
        let existed = forward.remove((left, right))?.is_some();
        reverse.remove((right, left))?;
        Ok(existed)
    }

    /// Removes every membership of `left`. Returns the right-hand ids removed.
    pub(crate) fn unrelate_left(&self, relation: Relation, left: u64) -> Result<Vec<u64>> {
        let rights = self.related(relation, left)?;
        for right in &rights {
            self.unrelate(relation, left, *right)?;
        }
        Ok(rights)
    }

    /// Removes every membership of `right`. Returns the left-hand ids removed.
    pub(crate) fn unrelate_right(&self, relation: Relation, right: u64) -> Result<Vec<u64>> {
        let lefts = self.related_reverse(relation, right)?;
        for left in &lefts {
            self.unrelate(relation, *left, right)?;
        }
        Ok(lefts)
    }

    /// Commits every change made in this transaction.
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit()?;
        Ok(())
    }
}
