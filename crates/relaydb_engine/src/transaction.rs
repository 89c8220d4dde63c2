//! Single-collection transactions and store handles.

use crate::collection::KeyPolicy;
use crate::cursor::CursorPosition;
use crate::engine::StoreState;
use crate::error::ErrorCode;
use crate::range::KeyRange;
use crate::request::Request;
use parking_lot::Mutex;
use relaydb_codec::{from_cbor, to_canonical_cbor, Key, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Transaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reads only.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Active,
    Committed,
    Aborted,
}

/// A transaction scoped to one collection.
///
/// Writes are staged inside the transaction and applied atomically by
/// [`Transaction::commit`]. Dropping an uncommitted transaction aborts it:
/// nothing staged persists. Conflicting read-write transactions against
/// the same collection are serialized by the engine; callers above this
/// layer must not add locking of their own.
pub struct Transaction {
    inner: Arc<TxnInner>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("mode", &self.inner.mode)
            .finish_non_exhaustive()
    }
}

pub(crate) struct TxnInner {
    pub(crate) store_state: Arc<StoreState>,
    mode: Mode,
    state: Mutex<TxnState>,
}

struct TxnState {
    /// Overlay over the committed records: `Some` stages a put,
    /// `None` stages a delete.
    staged: BTreeMap<Key, Option<Vec<u8>>>,
    status: Status,
}

impl Transaction {
    pub(crate) fn begin(store_state: Arc<StoreState>, mode: Mode) -> Self {
        Self {
            inner: Arc::new(TxnInner {
                store_state,
                mode,
                state: Mutex::new(TxnState {
                    staged: BTreeMap::new(),
                    status: Status::Active,
                }),
            }),
        }
    }

    /// Returns the transaction mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    /// Returns the store handle for the scoped collection.
    #[must_use]
    pub fn store(&self) -> Store {
        Store {
            txn: Arc::clone(&self.inner),
        }
    }

    /// Commits the transaction, applying all staged writes atomically.
    pub fn commit(self) -> Request<()> {
        Request::settled(self.inner.commit())
    }

    /// Aborts the transaction, discarding all staged writes.
    pub fn abort(self) {
        self.inner.abort();
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.inner.abort();
    }
}

impl TxnInner {
    fn commit(&self) -> Result<(), ErrorCode> {
        let mut state = self.state.lock();
        if state.status != Status::Active {
            return Err(ErrorCode::TransactionDone);
        }
        state.status = Status::Committed;

        let mut records = self.store_state.records.lock();
        for (key, staged) in std::mem::take(&mut state.staged) {
            match staged {
                Some(payload) => {
                    records.insert(key, payload);
                }
                None => {
                    records.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn abort(&self) {
        let mut state = self.state.lock();
        if state.status == Status::Active {
            state.status = Status::Aborted;
            state.staged.clear();
        }
    }

    pub(crate) fn ensure_active(&self) -> Result<(), ErrorCode> {
        if self.state.lock().status == Status::Active {
            Ok(())
        } else {
            Err(ErrorCode::TransactionDone)
        }
    }

    pub(crate) fn ensure_writable(&self) -> Result<(), ErrorCode> {
        self.ensure_active()?;
        if self.mode == Mode::ReadWrite {
            Ok(())
        } else {
            Err(ErrorCode::ReadOnly)
        }
    }

    /// Reads one record through the staged overlay.
    pub(crate) fn read(&self, key: &Key) -> Result<Option<Value>, ErrorCode> {
        let state = self.state.lock();
        let payload = match state.staged.get(key) {
            Some(staged) => staged.clone(),
            None => self.store_state.records.lock().get(key).cloned(),
        };
        match payload {
            Some(bytes) => from_cbor(&bytes).map(Some).map_err(|_| ErrorCode::Corrupted),
            None => Ok(None),
        }
    }

    /// All live keys in ascending order, as seen through the overlay.
    pub(crate) fn merged_keys(&self) -> Vec<Key> {
        let state = self.state.lock();
        let records = self.store_state.records.lock();
        let mut keys: Vec<Key> = records
            .keys()
            .filter(|key| !matches!(state.staged.get(key), Some(None)))
            .cloned()
            .collect();
        for (key, staged) in &state.staged {
            if staged.is_some() && !records.contains_key(key) {
                keys.push(key.clone());
            }
        }
        keys.sort();
        keys
    }

    fn contains_key(&self, key: &Key) -> bool {
        match self.state.lock().staged.get(key) {
            Some(staged) => staged.is_some(),
            None => self.store_state.records.lock().contains_key(key),
        }
    }

    pub(crate) fn stage_put(&self, key: Key, record: &Value) {
        self.state
            .lock()
            .staged
            .insert(key, Some(to_canonical_cbor(record)));
    }

    fn stage_delete(&self, range: &KeyRange) {
        let keys = self.merged_keys();
        let mut state = self.state.lock();
        for key in keys {
            if range.contains(&key) {
                state.staged.insert(key, None);
            }
        }
    }

    /// Validates that a replacement written at `key` still derives `key`
    /// under the collection's key policy.
    pub(crate) fn check_replacement_key(
        &self,
        key: &Key,
        replacement: &Value,
    ) -> Result<(), ErrorCode> {
        if let KeyPolicy::Path(field) = &self.store_state.spec.key_policy {
            let derived = replacement.get(field).and_then(Key::from_value);
            if derived.as_ref() != Some(key) {
                return Err(ErrorCode::DataError);
            }
        }
        Ok(())
    }

    fn write(&self, record: &Value, key: Option<Key>, insert_only: bool) -> Result<Key, ErrorCode> {
        self.ensure_writable()?;
        let key = self.store_state.assign_key(record, key)?;
        if insert_only && self.contains_key(&key) {
            return Err(ErrorCode::Constraint);
        }
        self.stage_put(key.clone(), record);
        Ok(key)
    }
}

/// Handle to the collection a transaction is scoped to.
///
/// Every operation hands back a [`Request`] that settles through its
/// callback, never a direct result.
pub struct Store {
    txn: Arc<TxnInner>,
}

impl Store {
    /// Returns the collection's key path, if it has one.
    #[must_use]
    pub fn key_path(&self) -> Option<String> {
        self.txn
            .store_state
            .spec
            .key_path()
            .map(ToString::to_string)
    }

    /// Looks up a single record by key.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Request<Option<Value>> {
        let outcome = self
            .txn
            .ensure_active()
            .and_then(|()| self.txn.read(&key.into()));
        Request::settled(outcome)
    }

    /// Inserts a record; fails with [`ErrorCode::Constraint`] if the
    /// derived or explicit key already exists.
    #[must_use]
    pub fn add(&self, record: Value, key: Option<Key>) -> Request<Key> {
        Request::settled(self.txn.write(&record, key, true))
    }

    /// Inserts or replaces a record.
    #[must_use]
    pub fn put(&self, record: Value, key: Option<Key>) -> Request<Key> {
        Request::settled(self.txn.write(&record, key, false))
    }

    /// Deletes every record whose key falls in `range`.
    ///
    /// Deleting keys that do not exist is not an error.
    #[must_use]
    pub fn delete(&self, range: impl Into<KeyRange>) -> Request<()> {
        let outcome = self.txn.ensure_writable().map(|()| {
            self.txn.stage_delete(&range.into());
        });
        Request::settled(outcome)
    }

    /// Reads every record in ascending key order.
    #[must_use]
    pub fn get_all(&self) -> Request<Vec<Value>> {
        let outcome = self.txn.ensure_active().and_then(|()| {
            self.txn
                .merged_keys()
                .iter()
                .filter_map(|key| self.txn.read(key).transpose())
                .collect()
        });
        Request::settled(outcome)
    }

    /// Opens a cursor over the collection in ascending key order.
    ///
    /// The request settles with the first position, or `None` when the
    /// collection is empty.
    #[must_use]
    pub fn open_cursor(&self) -> Request<Option<CursorPosition>> {
        let outcome = self
            .txn
            .ensure_active()
            .and_then(|()| CursorPosition::first(Arc::clone(&self.txn)));
        Request::settled(outcome)
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use crate::collection::CollectionSpec;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Put(i64),
        Delete(i64, i64),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..20).prop_map(Op::Put),
            ((0i64..20), (0i64..20)).prop_map(|(a, b)| Op::Delete(a.min(b), a.max(b))),
        ]
    }

    proptest! {
        /// A committed transaction leaves exactly the records a plain
        /// ordered-map model predicts, in the same order.
        #[test]
        fn committed_state_matches_model(ops in proptest::collection::vec(arb_op(), 0..24)) {
            let state = Arc::new(StoreState::new(CollectionSpec::explicit()));
            let txn = Transaction::begin(Arc::clone(&state), Mode::ReadWrite);
            let store = txn.store();
            let mut model = BTreeMap::new();

            for op in &ops {
                match op {
                    Op::Put(k) => {
                        let _ = store.put(Value::Integer(*k), Some(Key::Integer(*k)));
                        model.insert(*k, Value::Integer(*k));
                    }
                    Op::Delete(lo, hi) => {
                        let _ = store.delete(KeyRange::bound(*lo, *hi, false, false));
                        model.retain(|k, _| k < lo || k > hi);
                    }
                }
            }
            let _ = txn.commit();

            let check = Transaction::begin(state, Mode::ReadOnly);
            let slot = Arc::new(Mutex::new(None));
            let out = Arc::clone(&slot);
            check.store().get_all().on_complete(move |outcome| {
                *out.lock() = Some(outcome);
            });
            let all = slot.lock().take().unwrap().unwrap();
            let expected: Vec<Value> = model.into_values().collect();
            prop_assert_eq!(all, expected);
        }
    }
}
