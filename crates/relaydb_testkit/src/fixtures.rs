//! Test fixtures and database helpers.
//!
//! Provides convenience helpers for setting up seeded test databases
//! and common test records.

use relaydb_codec::Value;
use relaydb_core::{AccessResult, ConnectionManager, CursorBulkMutator, RecordAccessor};
use relaydb_engine::{CollectionSpec, Connection, MemoryEngine, Mode};

/// Name of the fixture collection.
pub const VEHICLES: &str = "vehicles";

/// Converts a JSON value into a record [`Value`].
///
/// Returns `None` for JSON constructs records cannot hold: floats,
/// numbers outside the i64 range. Arrays and objects convert
/// recursively.
#[must_use]
pub fn record_from_json(json: &serde_json::Value) -> Option<Value> {
    match json {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n.as_i64().map(Value::Integer),
        serde_json::Value::String(s) => Some(Value::text(s)),
        serde_json::Value::Array(items) => items
            .iter()
            .map(record_from_json)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        serde_json::Value::Object(fields) => fields
            .iter()
            .map(|(name, item)| record_from_json(item).map(|v| (name.clone(), v)))
            .collect::<Option<Vec<_>>>()
            .map(Value::map),
    }
}

/// Builds one vehicle record.
#[must_use]
pub fn vehicle(id: i64, kind: &str, wheels: i64) -> Value {
    record_from_json(&serde_json::json!({
        "id": id,
        "type": kind,
        "wheels": wheels,
    }))
    .expect("vehicle fixture is a valid record")
}

/// The canonical three-vehicle fixture: a boat, a car and a truck.
#[must_use]
pub fn vehicle_fixture() -> Vec<Value> {
    vec![
        vehicle(1, "boat", 0),
        vehicle(2, "car", 4),
        vehicle(3, "truck", 4),
    ]
}

/// A test database over its own private engine.
pub struct TestDb {
    /// The engine backing this database.
    pub engine: MemoryEngine,
    /// The manager that opened the database.
    pub manager: ConnectionManager,
    /// The open connection.
    pub connection: Connection,
}

impl TestDb {
    /// Opens a fresh database with the seeded vehicles collection.
    ///
    /// # Panics
    ///
    /// Panics if the fixture database cannot be opened.
    pub async fn with_vehicles() -> Self {
        let engine = MemoryEngine::new();
        let mut manager = ConnectionManager::new(engine.clone());
        let connection = manager
            .open_db("fixture", 1, |conn| {
                conn.create_collection(VEHICLES, CollectionSpec::with_key_path("id"))?;
                let txn = conn.transaction(VEHICLES, Mode::ReadWrite)?;
                let store = txn.store();
                for record in vehicle_fixture() {
                    let _ = store.put(record, None);
                }
                let _ = txn.commit();
                Ok(())
            })
            .await
            .expect("fixture database should open");

        Self {
            engine,
            manager,
            connection,
        }
    }

    /// Opens a fresh database with one empty collection of the given spec.
    ///
    /// # Panics
    ///
    /// Panics if the fixture database cannot be opened.
    pub async fn with_collection(name: &str, spec: CollectionSpec) -> Self {
        let engine = MemoryEngine::new();
        let mut manager = ConnectionManager::new(engine.clone());
        let collection = name.to_string();
        let connection = manager
            .open_db("fixture", 1, move |conn| {
                conn.create_collection(&collection, spec)
            })
            .await
            .expect("fixture database should open");

        Self {
            engine,
            manager,
            connection,
        }
    }

    /// A record accessor over the fixture connection.
    #[must_use]
    pub fn accessor(&self) -> RecordAccessor {
        RecordAccessor::new(self.connection.clone())
    }

    /// A bulk mutator over the fixture connection.
    #[must_use]
    pub fn bulk(&self) -> CursorBulkMutator {
        CursorBulkMutator::new(self.connection.clone())
    }

    /// Closes the connection and deletes the fixture database.
    ///
    /// # Errors
    ///
    /// Propagates any delete failure, including [`relaydb_core::AccessError::Blocked`]
    /// when other connections remain open.
    pub async fn teardown(mut self) -> AccessResult<()> {
        self.manager.delete_db(self.connection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaydb_codec::Key;

    #[tokio::test]
    async fn fixture_database_exposes_the_vehicles_collection() {
        let db = TestDb::with_vehicles().await;

        assert_eq!(db.connection.name(), "fixture");
        assert!(db.connection.contains_collection(VEHICLES));
        assert_eq!(db.bulk().get_all(VEHICLES).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn adding_a_collection_at_a_higher_version() {
        let mut db = TestDb::with_vehicles().await;
        db.connection.close();

        let connection = db
            .manager
            .open_db("fixture", 2, |conn| {
                conn.create_collection("owners", CollectionSpec::explicit())
            })
            .await
            .unwrap();

        assert!(connection.contains_collection(VEHICLES));
        assert!(connection.contains_collection("owners"));
    }

    #[tokio::test]
    async fn teardown_deletes_the_database() {
        let db = TestDb::with_vehicles().await;
        let engine = db.engine.clone();

        db.teardown().await.unwrap();
        assert!(!engine.contains_database("fixture"));
    }

    #[tokio::test]
    async fn auto_increment_fixture_assigns_keys() {
        let db = TestDb::with_collection("log", CollectionSpec::auto_increment()).await;
        let accessor = db.accessor();

        let key = accessor
            .add_one("log", Value::text("first entry"))
            .await
            .unwrap();
        assert_eq!(key, Key::Integer(1));
    }

    #[test]
    fn json_floats_do_not_convert() {
        assert!(record_from_json(&serde_json::json!(1.5)).is_none());
        assert!(record_from_json(&serde_json::json!({ "weight": 1.5 })).is_none());
    }
}
