//! Database connection lifecycle.

use crate::bridge::bridge;
use crate::error::{AccessError, AccessResult};
use relaydb_engine::{Connection, ErrorCode, MemoryEngine};
use tracing::{debug, error};

/// Owns the lifecycle of a named, versioned database handle.
///
/// A manager opens (creating or upgrading as needed) one database at a
/// time and retains the resulting [`Connection`] as its current handle;
/// opening again replaces the handle wholesale. Accessors are constructed
/// from the connection a successful open returns.
///
/// # Example
///
/// ```
/// use relaydb_core::{CollectionSpec, ConnectionManager, MemoryEngine};
///
/// # async fn example() -> relaydb_core::AccessResult<()> {
/// let mut manager = ConnectionManager::new(MemoryEngine::new());
/// let connection = manager
///     .open_db("inventory", 1, |conn| {
///         conn.create_collection("vehicles", CollectionSpec::with_key_path("id"))
///     })
///     .await?;
/// assert!(connection.contains_collection("vehicles"));
/// manager.delete_db(connection).await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
    engine: MemoryEngine,
    connection: Option<Connection>,
}

impl ConnectionManager {
    /// Creates a manager over the given engine.
    #[must_use]
    pub fn new(engine: MemoryEngine) -> Self {
        Self {
            engine,
            connection: None,
        }
    }

    /// Opens (creating if absent) the database `name` at schema `version`.
    ///
    /// If `version` is greater than the stored version, the engine invokes
    /// `upgrade` synchronously, exactly once, inside its version-change
    /// transaction before the returned future resolves; that hook is the
    /// only place collections may be created, renamed or deleted. If
    /// `version` equals the stored version the hook is not invoked.
    ///
    /// # Errors
    ///
    /// Requesting a version below the stored one fails with
    /// [`AccessError::Version`]; any other open or upgrade failure is
    /// reported as [`AccessError::Connection`]. Failures propagate to the
    /// caller — the manager logs them but never swallows them.
    pub async fn open_db<F>(
        &mut self,
        name: &str,
        version: u64,
        upgrade: F,
    ) -> AccessResult<Connection>
    where
        F: FnOnce(&Connection) -> Result<(), ErrorCode>,
    {
        debug!(db = name, version, "opening database");
        match bridge(self.engine.open(name, version, upgrade)).await {
            Ok(connection) => {
                debug!(db = name, version, "database open");
                self.connection = Some(connection.clone());
                Ok(connection)
            }
            Err(code) => {
                error!(db = name, version, %code, "open failed");
                Err(match code {
                    ErrorCode::VersionMismatch => AccessError::Version,
                    other => AccessError::Connection(other),
                })
            }
        }
    }

    /// Closes `connection`, then deletes its whole named database.
    ///
    /// # Errors
    ///
    /// If other connections to the same database remain open elsewhere the
    /// engine reports the delete blocked and this fails with
    /// [`AccessError::Blocked`] immediately — there is no indefinite wait.
    /// The caller decides whether to retry once the other connections are
    /// closed.
    pub async fn delete_db(&mut self, connection: Connection) -> AccessResult<()> {
        let name = connection.name().to_string();
        connection.close();
        if self
            .connection
            .as_ref()
            .is_some_and(|held| held.name() == name)
        {
            self.connection = None;
        }

        debug!(db = %name, "deleting database");
        bridge(self.engine.delete_database(&name))
            .await
            .map_err(AccessError::from)
    }

    /// The current connection handle, if a database is open.
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaydb_engine::CollectionSpec;

    fn create_vehicles(conn: &Connection) -> Result<(), ErrorCode> {
        conn.create_collection("vehicles", CollectionSpec::with_key_path("id"))
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn open_retains_the_connection() {
        init_tracing();
        let mut manager = ConnectionManager::new(MemoryEngine::new());
        assert!(manager.connection().is_none());

        let connection = manager.open_db("test", 1, create_vehicles).await.unwrap();
        assert_eq!(connection.name(), "test");
        assert_eq!(manager.connection().unwrap().name(), "test");
    }

    #[tokio::test]
    async fn reopening_replaces_the_handle() {
        let mut manager = ConnectionManager::new(MemoryEngine::new());
        manager.open_db("first", 1, create_vehicles).await.unwrap();
        manager.open_db("second", 1, create_vehicles).await.unwrap();

        assert_eq!(manager.connection().unwrap().name(), "second");
    }

    #[tokio::test]
    async fn equal_version_skips_upgrade() {
        let engine = MemoryEngine::new();
        let mut manager = ConnectionManager::new(engine.clone());
        let first = manager.open_db("test", 1, create_vehicles).await.unwrap();
        first.close();

        let conn = manager
            .open_db("test", 1, |_| panic!("upgrade must not run"))
            .await
            .unwrap();
        assert!(conn.contains_collection("vehicles"));
    }

    #[tokio::test]
    async fn greater_version_upgrades_once() {
        let mut manager = ConnectionManager::new(MemoryEngine::new());
        let first = manager.open_db("test", 1, create_vehicles).await.unwrap();
        first.close();

        let conn = manager
            .open_db("test", 2, |conn| {
                conn.create_collection("owners", CollectionSpec::explicit())
            })
            .await
            .unwrap();
        assert!(conn.contains_collection("vehicles"));
        assert!(conn.contains_collection("owners"));
    }

    #[tokio::test]
    async fn downgrade_propagates_version_error() {
        let mut manager = ConnectionManager::new(MemoryEngine::new());
        let first = manager.open_db("test", 2, create_vehicles).await.unwrap();
        first.close();

        let err = manager.open_db("test", 1, |_| Ok(())).await.unwrap_err();
        assert_eq!(err, AccessError::Version);
    }

    #[tokio::test]
    async fn failed_upgrade_propagates_as_connection_error() {
        let mut manager = ConnectionManager::new(MemoryEngine::new());
        let err = manager
            .open_db("test", 1, |_| Err(ErrorCode::DataError))
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::Connection(ErrorCode::DataError));
    }

    #[tokio::test]
    async fn delete_closes_then_removes_the_database() {
        let engine = MemoryEngine::new();
        let mut manager = ConnectionManager::new(engine.clone());
        let connection = manager.open_db("test", 1, create_vehicles).await.unwrap();

        manager.delete_db(connection).await.unwrap();
        assert!(manager.connection().is_none());
        assert!(!engine.contains_database("test"));
    }

    #[tokio::test]
    async fn delete_blocked_by_another_open_connection() {
        let engine = MemoryEngine::new();
        let mut manager = ConnectionManager::new(engine.clone());
        let connection = manager.open_db("test", 1, create_vehicles).await.unwrap();

        let mut other = ConnectionManager::new(engine.clone());
        let held_elsewhere = other.open_db("test", 1, |_| Ok(())).await.unwrap();

        let err = manager.delete_db(connection).await.unwrap_err();
        assert_eq!(err, AccessError::Blocked);

        // Once the other connection closes, the delete goes through.
        held_elsewhere.close();
        drop(other);
        let reopened = manager.open_db("test", 1, |_| Ok(())).await.unwrap();
        manager.delete_db(reopened).await.unwrap();
        assert!(!engine.contains_database("test"));
    }
}
