//! Full-collection read and transform-in-place.

use crate::bridge::bridge;
use crate::error::{AccessError, AccessResult};
use relaydb_codec::Value;
use relaydb_engine::{Connection, Mode, Transaction};
use tracing::debug;

/// Whole-collection operations built on the engine's cursor protocol.
///
/// Unlike single-record operations, a cursor step cannot be generalized as
/// one future: the engine reports one position per callback and waits for
/// an explicit advance. [`CursorBulkMutator::update_all`] drives that loop
/// internally and exposes a single future that resolves only once the
/// whole collection has been visited; the raw step protocol never leaks
/// out of this module.
pub struct CursorBulkMutator {
    connection: Connection,
}

impl CursorBulkMutator {
    /// Creates a bulk mutator over an open connection.
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Reads every record in the collection, in the engine's natural key
    /// order.
    ///
    /// This uses the engine's single bulk-read primitive inside one
    /// read-only transaction; no manual cursor is involved.
    pub async fn get_all(&self, collection: &str) -> AccessResult<Vec<Value>> {
        let txn = self.begin(collection, Mode::ReadOnly)?;
        Ok(bridge(txn.store().get_all()).await?)
    }

    /// Applies `transform` to every record in the collection, in place.
    ///
    /// One read-write transaction and one cursor pass: for each position,
    /// in ascending key order, the replacement `transform` returns is
    /// written at that position and the cursor advances; the future
    /// resolves at exhaustion, after the transaction commits.
    ///
    /// # Errors
    ///
    /// A failure on any per-record update — including a failing
    /// `transform` — rejects the overall future and aborts the whole
    /// transaction: no partial application persists. There is no way to
    /// stop the pass early short of `transform` failing.
    pub async fn update_all<F>(&self, collection: &str, mut transform: F) -> AccessResult<()>
    where
        F: FnMut(&Value) -> AccessResult<Value>,
    {
        let txn = self.begin(collection, Mode::ReadWrite)?;
        let store = txn.store();

        let mut visited = 0usize;
        let mut position = bridge(store.open_cursor()).await?;
        while let Some(current) = position {
            let replacement = transform(current.record())?;
            bridge(current.update(replacement)).await?;
            visited += 1;
            position = bridge(current.advance()).await?;
        }

        bridge(txn.commit()).await?;
        debug!(collection, records = visited, "full-collection update committed");
        Ok(())
    }

    fn begin(&self, collection: &str, mode: Mode) -> AccessResult<Transaction> {
        if !self.connection.is_open() {
            return Err(AccessError::NotConnected);
        }
        Ok(self.connection.transaction(collection, mode)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaydb_codec::Key;
    use relaydb_engine::{CollectionSpec, ErrorCode, MemoryEngine};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const VEHICLES: &str = "vehicles";

    fn vehicle(id: i64, kind: &str) -> Value {
        Value::map(vec![
            ("id".into(), Value::Integer(id)),
            ("type".into(), Value::text(kind)),
        ])
    }

    async fn seeded_mutator() -> CursorBulkMutator {
        let engine = MemoryEngine::new();
        let request = engine.open("bulk-test", 1, |conn| {
            conn.create_collection(VEHICLES, CollectionSpec::with_key_path("id"))?;
            let txn = conn.transaction(VEHICLES, Mode::ReadWrite)?;
            let store = txn.store();
            let _ = store.put(vehicle(2, "car"), None);
            let _ = store.put(vehicle(1, "boat"), None);
            let _ = store.put(vehicle(3, "truck"), None);
            let _ = txn.commit();
            Ok(())
        });
        CursorBulkMutator::new(bridge(request).await.unwrap())
    }

    fn with_suffix(record: &Value, suffix: &str) -> Value {
        let Some(Value::Text(kind)) = record.get("type") else {
            panic!("fixture records carry a type field");
        };
        record.merge_fields(&Value::map(vec![(
            "type".into(),
            Value::text(format!("{kind}{suffix}")),
        )]))
    }

    #[tokio::test]
    async fn get_all_returns_every_record_in_key_order() {
        let mutator = seeded_mutator().await;
        let all = mutator.get_all(VEHICLES).await.unwrap();

        assert_eq!(all.len(), 3);
        let kinds: Vec<&Value> = all.iter().filter_map(|r| r.get("type")).collect();
        assert_eq!(
            kinds,
            vec![&Value::text("boat"), &Value::text("car"), &Value::text("truck")]
        );
    }

    #[tokio::test]
    async fn update_all_transforms_every_record_exactly_once() {
        let mutator = seeded_mutator().await;
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&calls);
        mutator
            .update_all(VEHICLES, move |record| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(with_suffix(record, "foo"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let all = mutator.get_all(VEHICLES).await.unwrap();
        for record in &all {
            let Some(Value::Text(kind)) = record.get("type") else {
                panic!("type field survives the transform");
            };
            assert!(kind.ends_with("foo"), "unexpected type {kind:?}");
        }
    }

    #[tokio::test]
    async fn failing_transform_aborts_the_whole_pass() {
        let mutator = seeded_mutator().await;

        let mut seen = 0;
        let err = mutator
            .update_all(VEHICLES, move |record| {
                seen += 1;
                if seen == 2 {
                    return Err(AccessError::Engine(ErrorCode::DataError));
                }
                Ok(with_suffix(record, "foo"))
            })
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::Engine(ErrorCode::DataError));

        // The first record's update must not have persisted either.
        let all = mutator.get_all(VEHICLES).await.unwrap();
        let kinds: Vec<&Value> = all.iter().filter_map(|r| r.get("type")).collect();
        assert_eq!(
            kinds,
            vec![&Value::text("boat"), &Value::text("car"), &Value::text("truck")]
        );
    }

    #[tokio::test]
    async fn rejected_per_record_update_aborts_the_whole_pass() {
        let mutator = seeded_mutator().await;

        // Changing the key-path field makes the positional update fail.
        let err = mutator
            .update_all(VEHICLES, |record| {
                Ok(record.merge_fields(&Value::map(vec![(
                    "id".into(),
                    Value::Integer(99),
                )])))
            })
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::Engine(ErrorCode::DataError));

        let all = mutator.get_all(VEHICLES).await.unwrap();
        assert_eq!(all[0].get("id"), Some(&Value::Integer(1)));
    }

    #[tokio::test]
    async fn update_all_on_an_empty_collection_resolves() {
        let engine = MemoryEngine::new();
        let request = engine.open("empty-test", 1, |conn| {
            conn.create_collection("empty", CollectionSpec::auto_increment())
        });
        let mutator = CursorBulkMutator::new(bridge(request).await.unwrap());

        mutator
            .update_all("empty", |_| panic!("no records to transform"))
            .await
            .unwrap();
        assert!(mutator.get_all("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updates_are_keyed_to_their_positions() {
        let mutator = seeded_mutator().await;
        mutator
            .update_all(VEHICLES, |record| Ok(with_suffix(record, "!")))
            .await
            .unwrap();

        let accessor = crate::RecordAccessor::new(mutator.connection.clone());
        let boat = accessor.get_one(VEHICLES, 1).await.unwrap().unwrap();
        assert_eq!(boat.get("type"), Some(&Value::text("boat!")));
        assert_eq!(boat.get("id"), Some(&Value::Integer(1)));
        assert_eq!(
            accessor.add_one(VEHICLES, vehicle(4, "plane")).await.unwrap(),
            Key::Integer(4)
        );
    }

    #[tokio::test]
    async fn bulk_operations_require_a_live_connection() {
        let mutator = seeded_mutator().await;
        mutator.connection.close();

        let err = mutator.get_all(VEHICLES).await.unwrap_err();
        assert_eq!(err, AccessError::NotConnected);
        let err = mutator
            .update_all(VEHICLES, |record| Ok(record.clone()))
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::NotConnected);
    }
}
