//! The reference in-memory engine.

use crate::collection::{CollectionSpec, KeyPolicy};
use crate::connection::Connection;
use crate::error::ErrorCode;
use crate::request::Request;
use parking_lot::Mutex;
use relaydb_codec::{Key, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Per-collection storage: committed records plus the key generator.
pub(crate) struct StoreState {
    pub(crate) spec: CollectionSpec,
    /// Committed records as canonical CBOR payloads, in key order.
    pub(crate) records: Mutex<BTreeMap<Key, Vec<u8>>>,
    next_auto_key: Mutex<i64>,
}

impl StoreState {
    pub(crate) fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            records: Mutex::new(BTreeMap::new()),
            next_auto_key: Mutex::new(1),
        }
    }

    /// Resolves the key a write lands under, per the collection's policy.
    pub(crate) fn assign_key(
        &self,
        record: &Value,
        explicit: Option<Key>,
    ) -> Result<Key, ErrorCode> {
        match &self.spec.key_policy {
            KeyPolicy::Path(field) => {
                if explicit.is_some() {
                    // The key is derived; supplying one is a caller error.
                    return Err(ErrorCode::DataError);
                }
                record
                    .get(field)
                    .and_then(Key::from_value)
                    .ok_or(ErrorCode::DataError)
            }
            KeyPolicy::Explicit => explicit.ok_or(ErrorCode::DataError),
            KeyPolicy::AutoIncrement => {
                let mut next = self.next_auto_key.lock();
                match explicit {
                    Some(key) => {
                        if let Key::Integer(n) = &key {
                            *next = (*next).max(n.saturating_add(1));
                        }
                        Ok(key)
                    }
                    None => {
                        let key = Key::Integer(*next);
                        *next += 1;
                        Ok(key)
                    }
                }
            }
        }
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            spec: self.spec.clone(),
            records: self.records.lock().clone(),
            next_auto_key: *self.next_auto_key.lock(),
        }
    }
}

struct StoreSnapshot {
    spec: CollectionSpec,
    records: BTreeMap<Key, Vec<u8>>,
    next_auto_key: i64,
}

impl StoreSnapshot {
    fn into_store(self) -> StoreState {
        StoreState {
            spec: self.spec,
            records: Mutex::new(self.records),
            next_auto_key: Mutex::new(self.next_auto_key),
        }
    }
}

/// One named database in the registry.
pub(crate) struct DatabaseState {
    pub(crate) name: String,
    pub(crate) version: Mutex<u64>,
    pub(crate) stores: Mutex<BTreeMap<String, Arc<StoreState>>>,
    pub(crate) open_connections: Mutex<usize>,
}

impl DatabaseState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Mutex::new(0),
            stores: Mutex::new(BTreeMap::new()),
            open_connections: Mutex::new(0),
        }
    }

    fn snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot {
            version: *self.version.lock(),
            stores: self
                .stores
                .lock()
                .iter()
                .map(|(name, store)| (name.clone(), store.snapshot()))
                .collect(),
        }
    }

    fn restore(&self, snapshot: DatabaseSnapshot) {
        *self.version.lock() = snapshot.version;
        *self.stores.lock() = snapshot
            .stores
            .into_iter()
            .map(|(name, store)| (name, Arc::new(store.into_store())))
            .collect();
    }
}

struct DatabaseSnapshot {
    version: u64,
    stores: Vec<(String, StoreSnapshot)>,
}

/// The reference callback-driven engine.
///
/// `MemoryEngine` is a registry of named, versioned in-memory databases.
/// Every operation settles through a [`Request`] callback, mirroring how a
/// host-provided engine reports completion; nothing is returned directly.
/// Clones share the registry.
///
/// # Example
///
/// ```
/// use relaydb_engine::{CollectionSpec, MemoryEngine};
///
/// let engine = MemoryEngine::new();
/// let request = engine.open("inventory", 1, |conn| {
///     conn.create_collection("vehicles", CollectionSpec::with_key_path("id"))
/// });
/// request.on_complete(|outcome| {
///     let connection = outcome.unwrap();
///     assert!(connection.contains_collection("vehicles"));
/// });
/// ```
pub struct MemoryEngine {
    registry: Arc<Mutex<HashMap<String, Arc<DatabaseState>>>>,
}

impl Clone for MemoryEngine {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens (creating if absent) the database `name` at schema `version`.
    ///
    /// When the requested version is greater than the stored version, the
    /// whole open runs as a version-change transaction: `upgrade` is
    /// invoked exactly once with the connection being upgraded, and it is
    /// the only place collections may be created, renamed or deleted. An
    /// upgrade failure rolls the database back to its pre-open state and
    /// the request fails with the hook's code.
    ///
    /// Versions are positive integers; requesting version 0 or a version
    /// below the stored one fails with [`ErrorCode::VersionMismatch`].
    pub fn open<F>(&self, name: &str, version: u64, upgrade: F) -> Request<Connection>
    where
        F: FnOnce(&Connection) -> Result<(), ErrorCode>,
    {
        if version == 0 {
            return Request::settled(Err(ErrorCode::VersionMismatch));
        }

        let db = {
            let mut registry = self.registry.lock();
            Arc::clone(
                registry
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(DatabaseState::new(name))),
            )
        };

        let stored = *db.version.lock();
        if version < stored {
            return Request::settled(Err(ErrorCode::VersionMismatch));
        }

        let connection = Connection::attach(Arc::clone(&db), version);
        if version > stored {
            let snapshot = db.snapshot();
            connection.begin_upgrade();
            let result = upgrade(&connection);
            connection.finish_upgrade();
            match result {
                Ok(()) => *db.version.lock() = version,
                Err(code) => {
                    db.restore(snapshot);
                    connection.close();
                    return Request::settled(Err(code));
                }
            }
        }

        Request::settled(Ok(connection))
    }

    /// Deletes the whole named database.
    ///
    /// Fails with [`ErrorCode::Blocked`] while any connection to the
    /// database remains open. Deleting a database that does not exist
    /// succeeds (idempotent).
    pub fn delete_database(&self, name: &str) -> Request<()> {
        let mut registry = self.registry.lock();
        let Some(db) = registry.get(name) else {
            return Request::settled(Ok(()));
        };
        if *db.open_connections.lock() > 0 {
            return Request::settled(Err(ErrorCode::Blocked));
        }
        registry.remove(name);
        Request::settled(Ok(()))
    }

    /// Whether a database with this name currently exists.
    #[must_use]
    pub fn contains_database(&self, name: &str) -> bool {
        self.registry.lock().contains_key(name)
    }
}
