//! Database connection handles.

use crate::collection::CollectionSpec;
use crate::engine::{DatabaseState, StoreState};
use crate::error::ErrorCode;
use crate::transaction::{Mode, Transaction};
use parking_lot::Mutex;
use std::sync::Arc;

/// An open handle to a named, versioned database.
///
/// A connection is obtained from [`crate::MemoryEngine::open`] and is the
/// root of everything else: transactions are begun against it, and during
/// a version-change transaction it is also the handle collections are
/// created through. Clones share the same logical connection; closing is
/// idempotent and every operation on a closed connection fails with
/// [`ErrorCode::Closed`].
pub struct Connection {
    inner: Arc<ConnInner>,
}

struct ConnInner {
    db: Arc<DatabaseState>,
    version: u64,
    open: Mutex<bool>,
    upgrading: Mutex<bool>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Connection {
    pub(crate) fn attach(db: Arc<DatabaseState>, version: u64) -> Self {
        *db.open_connections.lock() += 1;
        Self {
            inner: Arc::new(ConnInner {
                db,
                version,
                open: Mutex::new(true),
                upgrading: Mutex::new(false),
            }),
        }
    }

    /// The database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.db.name
    }

    /// The schema version this connection was opened at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version
    }

    /// Names of the collections the database currently exposes.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.inner.db.stores.lock().keys().cloned().collect()
    }

    /// Whether the database exposes the named collection.
    #[must_use]
    pub fn contains_collection(&self, name: &str) -> bool {
        self.inner.db.stores.lock().contains_key(name)
    }

    /// Whether this connection is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.inner.open.lock()
    }

    /// Closes the connection. Closing twice is a no-op.
    pub fn close(&self) {
        let mut open = self.inner.open.lock();
        if *open {
            *open = false;
            *self.inner.db.open_connections.lock() -= 1;
        }
    }

    /// Begins a transaction scoped to one collection.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorCode::Closed`] on a closed connection and
    /// [`ErrorCode::NotFound`] for an unknown collection.
    pub fn transaction(&self, collection: &str, mode: Mode) -> Result<Transaction, ErrorCode> {
        self.ensure_open()?;
        let store = self
            .inner
            .db
            .stores
            .lock()
            .get(collection)
            .cloned()
            .ok_or(ErrorCode::NotFound)?;
        Ok(Transaction::begin(store, mode))
    }

    /// Creates a collection. Permitted only inside a version-change
    /// transaction (the upgrade hook of an open at a higher version).
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorCode::InvalidState`] outside an upgrade and
    /// [`ErrorCode::Constraint`] if the collection already exists.
    pub fn create_collection(&self, name: &str, spec: CollectionSpec) -> Result<(), ErrorCode> {
        self.ensure_upgrading()?;
        let mut stores = self.inner.db.stores.lock();
        if stores.contains_key(name) {
            return Err(ErrorCode::Constraint);
        }
        stores.insert(name.to_string(), Arc::new(StoreState::new(spec)));
        Ok(())
    }

    /// Renames a collection. Permitted only inside a version-change
    /// transaction.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorCode::InvalidState`] outside an upgrade,
    /// [`ErrorCode::NotFound`] if `from` is unknown, and
    /// [`ErrorCode::Constraint`] if `to` already exists.
    pub fn rename_collection(&self, from: &str, to: &str) -> Result<(), ErrorCode> {
        self.ensure_upgrading()?;
        let mut stores = self.inner.db.stores.lock();
        if stores.contains_key(to) {
            return Err(ErrorCode::Constraint);
        }
        let store = stores.remove(from).ok_or(ErrorCode::NotFound)?;
        stores.insert(to.to_string(), store);
        Ok(())
    }

    /// Deletes a collection and its records. Permitted only inside a
    /// version-change transaction.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorCode::InvalidState`] outside an upgrade and
    /// [`ErrorCode::NotFound`] for an unknown collection.
    pub fn delete_collection(&self, name: &str) -> Result<(), ErrorCode> {
        self.ensure_upgrading()?;
        self.inner
            .db
            .stores
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or(ErrorCode::NotFound)
    }

    pub(crate) fn begin_upgrade(&self) {
        *self.inner.upgrading.lock() = true;
    }

    pub(crate) fn finish_upgrade(&self) {
        *self.inner.upgrading.lock() = false;
    }

    fn ensure_open(&self) -> Result<(), ErrorCode> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ErrorCode::Closed)
        }
    }

    fn ensure_upgrading(&self) -> Result<(), ErrorCode> {
        self.ensure_open()?;
        if *self.inner.upgrading.lock() {
            Ok(())
        } else {
            Err(ErrorCode::InvalidState)
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Drop for ConnInner {
    fn drop(&mut self) {
        // A dropped handle releases its open slot even without an
        // explicit close.
        if *self.open.get_mut() {
            *self.db.open_connections.lock() -= 1;
        }
    }
}
