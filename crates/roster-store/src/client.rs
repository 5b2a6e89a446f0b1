//! Versioned row storage over redb.
//!
//! The table client is the storage boundary for the whole system. Rows
//! implement [`TableRow`] and are JSON-serialized into a single redb table
//! under `{partition}/{row_key}` composite keys. The client stamps an opaque
//! [`Version`] token into each row on every successful write; conditional
//! writes ([`TableClient::write_if`]) reject stale tokens.

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult, store_err};

/// Opaque per-row version token; changes on every successful write.
///
/// Callers can carry and compare tokens but never mint or advance them —
/// only the table client assigns versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    pub(crate) fn initial() -> Self {
        Version(1)
    }

    pub(crate) fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A row that can live in the table store.
///
/// The serialized form must expose the version token under a `version`
/// field; the conditional-write path reads it back through a probe.
pub trait TableRow: Serialize + DeserializeOwned {
    fn partition_key(&self) -> &str;
    fn row_key(&self) -> &str;
    fn version(&self) -> Version;
    fn set_version(&mut self, version: Version);
}

/// Reads just the version column of a stored row.
#[derive(Deserialize)]
struct VersionProbe {
    version: Version,
}

/// Thread-safe table client backed by redb.
#[derive(Clone)]
pub struct TableClient {
    db: Arc<Database>,
    table: TableDefinition<'static, &'static str, &'static [u8]>,
}

impl TableClient {
    pub fn new(
        db: Arc<Database>,
        table: TableDefinition<'static, &'static str, &'static [u8]>,
    ) -> Self {
        Self { db, table }
    }

    fn composite_key(partition: &str, row_key: &str) -> String {
        format!("{partition}/{row_key}")
    }

    /// Create the backing table if absent. Idempotent and safe to call
    /// concurrently (redb serializes write transactions).
    pub fn ensure_table(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(store_err!("begin transaction"))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(self.table).map_err(store_err!("open table"))?;
        txn.commit().map_err(store_err!("commit transaction"))?;
        Ok(())
    }

    /// Point read. `Ok(None)` when the row does not exist.
    pub fn get<R: TableRow>(&self, partition: &str, row_key: &str) -> StoreResult<Option<R>> {
        let key = Self::composite_key(partition, row_key);
        let txn = self.db.begin_read().map_err(store_err!("begin transaction"))?;
        let table = txn.open_table(self.table).map_err(store_err!("open table"))?;
        match table.get(key.as_str()).map_err(store_err!("read row"))? {
            Some(guard) => {
                let row = serde_json::from_slice(guard.value())
                    .map_err(store_err!("decode stored row"))?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Insert-if-absent inside a single write transaction.
    ///
    /// Stamps the initial version on success. Returns `false` without
    /// touching anything when the key already exists, so two racing inserts
    /// for the same key resolve to exactly one winner.
    pub fn insert<R: TableRow>(&self, row: &mut R) -> StoreResult<bool> {
        let key = Self::composite_key(row.partition_key(), row.row_key());
        let txn = self.db.begin_write().map_err(store_err!("begin transaction"))?;
        let inserted;
        {
            let mut table = txn.open_table(self.table).map_err(store_err!("open table"))?;
            let exists = table
                .get(key.as_str())
                .map_err(store_err!("read row"))?
                .is_some();
            if exists {
                inserted = false;
            } else {
                row.set_version(Version::initial());
                let value = serde_json::to_vec(row).map_err(store_err!("encode row"))?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(store_err!("write row"))?;
                inserted = true;
            }
        }
        txn.commit().map_err(store_err!("commit transaction"))?;
        debug!(%key, inserted, "insert");
        Ok(inserted)
    }

    /// Conditional write: persists the row under the successor version iff
    /// the stored version still equals `expected`.
    ///
    /// A missing row is also a conflict — either way the caller's snapshot
    /// is stale and the whole read-modify-write cycle must be retried.
    pub fn write_if<R: TableRow>(&self, row: &mut R, expected: Version) -> StoreResult<Version> {
        let key = Self::composite_key(row.partition_key(), row.row_key());
        let txn = self.db.begin_write().map_err(store_err!("begin transaction"))?;
        let matched;
        {
            let mut table = txn.open_table(self.table).map_err(store_err!("open table"))?;
            let current = match table.get(key.as_str()).map_err(store_err!("read row"))? {
                Some(guard) => {
                    let probe: VersionProbe = serde_json::from_slice(guard.value())
                        .map_err(store_err!("decode stored row"))?;
                    Some(probe.version)
                }
                None => None,
            };
            matched = current == Some(expected);
            if matched {
                row.set_version(expected.next());
                let value = serde_json::to_vec(row).map_err(store_err!("encode row"))?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(store_err!("write row"))?;
            }
        }
        if !matched {
            txn.abort().map_err(store_err!("abort transaction"))?;
            return Err(StoreError::Conflict(row.row_key().to_string()));
        }
        txn.commit().map_err(store_err!("commit transaction"))?;
        debug!(%key, version = %row.version(), "conditional write");
        Ok(row.version())
    }

    /// Unconditional delete. `true` iff the row existed.
    pub fn delete(&self, partition: &str, row_key: &str) -> StoreResult<bool> {
        let key = Self::composite_key(partition, row_key);
        let txn = self.db.begin_write().map_err(store_err!("begin transaction"))?;
        let existed;
        {
            let mut table = txn.open_table(self.table).map_err(store_err!("open table"))?;
            existed = table
                .remove(key.as_str())
                .map_err(store_err!("delete row"))?
                .is_some();
        }
        txn.commit().map_err(store_err!("commit transaction"))?;
        debug!(%key, existed, "delete");
        Ok(existed)
    }

    /// Every row in the partition, in store-enumeration order.
    pub fn scan<R: TableRow>(&self, partition: &str) -> StoreResult<Vec<R>> {
        let prefix = format!("{partition}/");
        let txn = self.db.begin_read().map_err(store_err!("begin transaction"))?;
        let table = txn.open_table(self.table).map_err(store_err!("open table"))?;
        let mut rows = Vec::new();
        for entry in table.iter().map_err(store_err!("scan partition"))? {
            let (key, value) = entry.map_err(store_err!("scan partition"))?;
            if key.value().starts_with(&prefix) {
                let row = serde_json::from_slice(value.value())
                    .map_err(store_err!("decode stored row"))?;
                rows.push(row);
            }
        }
        Ok(rows)
    }
}
