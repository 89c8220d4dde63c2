//! Single-record CRUD.

use crate::bridge::bridge;
use crate::error::{AccessError, AccessResult};
use relaydb_codec::{Key, Value};
use relaydb_engine::{Connection, KeyRange, Mode, Transaction};

/// Single-record operations against collections of one connection.
///
/// Every operation runs in its own transaction scoped to the named
/// collection: reads in a read-only transaction, writes in a read-write
/// one. The engine serializes conflicting transactions itself; this layer
/// adds no locking of its own.
pub struct RecordAccessor {
    connection: Connection,
}

impl RecordAccessor {
    /// Creates an accessor over an open connection.
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Looks up a single record by key.
    ///
    /// Resolves with `None` when no record exists at `key`.
    pub async fn get_one(
        &self,
        collection: &str,
        key: impl Into<Key>,
    ) -> AccessResult<Option<Value>> {
        let txn = self.begin(collection, Mode::ReadOnly)?;
        Ok(bridge(txn.store().get(key)).await?)
    }

    /// Inserts a record, resolving with the key it was stored under.
    ///
    /// # Errors
    ///
    /// Fails with [`AccessError::Constraint`] if the derived or assigned
    /// key already exists in the collection.
    pub async fn add_one(&self, collection: &str, record: Value) -> AccessResult<Key> {
        let txn = self.begin(collection, Mode::ReadWrite)?;
        let key = bridge(txn.store().add(record, None)).await?;
        bridge(txn.commit()).await?;
        Ok(key)
    }

    /// Deletes every record whose key matches `key_or_range`.
    ///
    /// Accepts a single key or a [`KeyRange`]. Deleting keys that do not
    /// exist is not an error; the future resolves normally.
    pub async fn delete_some(
        &self,
        collection: &str,
        key_or_range: impl Into<KeyRange>,
    ) -> AccessResult<()> {
        let txn = self.begin(collection, Mode::ReadWrite)?;
        bridge(txn.store().delete(key_or_range)).await?;
        bridge(txn.commit()).await?;
        Ok(())
    }

    /// Merges `changes` onto the record at `key`.
    ///
    /// Every field present in `changes` overwrites the stored field; all
    /// other fields are preserved verbatim. The read, the merge and the
    /// write-back happen within one read-write transaction, so no other
    /// writer can observe an intermediate state.
    ///
    /// # Errors
    ///
    /// Fails fast with [`AccessError::NotFound`] when no record exists at
    /// `key` — there is nothing to merge onto.
    pub async fn update_one(
        &self,
        collection: &str,
        key: impl Into<Key>,
        changes: Value,
    ) -> AccessResult<()> {
        let key = key.into();
        let txn = self.begin(collection, Mode::ReadWrite)?;
        let store = txn.store();

        let Some(record) = bridge(store.get(key.clone())).await? else {
            return Err(AccessError::NotFound { key });
        };
        let merged = record.merge_fields(&changes);

        // Key-path collections derive the key from the merged record;
        // otherwise the original key is supplied explicitly.
        let request = if store.key_path().is_some() {
            store.put(merged, None)
        } else {
            store.put(merged, Some(key))
        };
        bridge(request).await?;
        bridge(txn.commit()).await?;
        Ok(())
    }

    fn begin(&self, collection: &str, mode: Mode) -> AccessResult<Transaction> {
        if !self.connection.is_open() {
            return Err(AccessError::NotConnected);
        }
        Ok(self.connection.transaction(collection, mode)?)
    }
}
