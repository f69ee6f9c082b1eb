//! Record store backed by redb.
//!
//! One table per record type, named by the type mnemonic. Every operation
//! runs in its own short transaction: reads see a consistent snapshot, and
//! all keys of one record are written or removed in a single commit.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kvdns_core::keys::{self, storage_keys};
use kvdns_core::{normalize_name, FieldSet, RecordType, RecordValue};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info};

use crate::Result;

type Partition = TableDefinition<'static, &'static [u8], &'static [u8]>;

const fn partition(rtype: RecordType) -> Partition {
    TableDefinition::new(rtype.as_str())
}

/// Persistent record store.
pub struct Store {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

impl Store {
    /// Open or create the database at `path` and make sure every record
    /// partition exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(&path)?;

        let write_txn = db.begin_write()?;
        for rtype in RecordType::ALL {
            write_txn.open_table(partition(rtype))?;
        }
        write_txn.commit()?;

        info!(path = %path.display(), "opened record store");
        Ok(Self { db, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch the record of `rtype` owned by `name`.
    ///
    /// Returns `Ok(None)` when the record, or any one of its field keys,
    /// is missing. Stored bytes that fail to decode are an error.
    pub fn get(&self, rtype: RecordType, name: &str) -> Result<Option<RecordValue>> {
        let name = normalize_name(name);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(partition(rtype))?;

        let mut fields = FieldSet::new();
        for (slot, key) in storage_keys(rtype, &name) {
            match table.get(key.as_slice())? {
                Some(value) => fields.insert(slot, value.value().to_vec()),
                None => {
                    if !fields.is_empty() {
                        debug!(%rtype, %name, field = %slot, "record is missing a field");
                    }
                    return Ok(None);
                }
            }
        }

        Ok(Some(RecordValue::decode(rtype, &fields)?))
    }

    /// Create or overwrite the record owned by `name`.
    ///
    /// The name and value are validated first; nothing is written if
    /// either is rejected.
    pub fn set(&self, name: &str, value: &RecordValue) -> Result<()> {
        let name = normalize_name(name);
        keys::validate_owner_name(&name)?;
        value.validate()?;

        let rtype = value.record_type();
        let encoded = value.encode()?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(partition(rtype))?;
            for (slot, bytes) in encoded {
                let key = keys::slot_key(&name, slot);
                table.insert(key.as_slice(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;

        debug!(%rtype, %name, "record stored");
        Ok(())
    }

    /// Remove every key of the record of `rtype` owned by `name`.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&self, rtype: RecordType, name: &str) -> Result<bool> {
        let name = normalize_name(name);
        let write_txn = self.db.begin_write()?;
        let mut removed = false;
        {
            let mut table = write_txn.open_table(partition(rtype))?;
            for (_, key) in storage_keys(rtype, &name) {
                removed |= table.remove(key.as_slice())?.is_some();
            }
        }
        write_txn.commit()?;

        debug!(%rtype, %name, removed, "record deleted");
        Ok(removed)
    }

    /// Distinct owner names with at least one key in the `rtype` partition.
    pub fn list_names(&self, rtype: RecordType) -> Result<BTreeSet<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(partition(rtype))?;

        let mut names = BTreeSet::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            let owner = keys::owner_name(key.value());
            names.insert(String::from_utf8_lossy(owner).into_owned());
        }
        Ok(names)
    }

    /// Owner names of every record type.
    pub fn list_all(&self) -> Result<BTreeMap<RecordType, BTreeSet<String>>> {
        RecordType::ALL
            .into_iter()
            .map(|rtype| Ok((rtype, self.list_names(rtype)?)))
            .collect()
    }
}
