//! Stepwise cursor protocol.

use crate::error::ErrorCode;
use crate::request::Request;
use crate::transaction::TxnInner;
use relaydb_codec::{Key, Value};
use std::sync::Arc;

/// One position of a cursor walk.
///
/// A cursor visits records in ascending key order. Each step is itself a
/// request: [`crate::Store::open_cursor`] settles with the first position,
/// and [`CursorPosition::advance`] settles with the next one (or `None` at
/// exhaustion). The raw protocol is one step per callback; callers that
/// want a whole-collection pass must drive the loop themselves.
pub struct CursorPosition {
    txn: Arc<TxnInner>,
    keys: Arc<Vec<Key>>,
    index: usize,
    record: Value,
}

impl CursorPosition {
    pub(crate) fn first(txn: Arc<TxnInner>) -> Result<Option<Self>, ErrorCode> {
        let keys = Arc::new(txn.merged_keys());
        Self::at(txn, keys, 0)
    }

    fn at(txn: Arc<TxnInner>, keys: Arc<Vec<Key>>, mut index: usize) -> Result<Option<Self>, ErrorCode> {
        while index < keys.len() {
            // A key can disappear between the snapshot and this step if the
            // same transaction staged a delete; skip it.
            match txn.read(&keys[index])? {
                Some(record) => {
                    return Ok(Some(Self {
                        txn,
                        keys,
                        index,
                        record,
                    }))
                }
                None => index += 1,
            }
        }
        Ok(None)
    }

    /// The key at this position.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.keys[self.index]
    }

    /// The record at this position.
    #[must_use]
    pub fn record(&self) -> &Value {
        &self.record
    }

    /// Writes `replacement` at the current position.
    ///
    /// The replacement must still derive the position's key under the
    /// collection's key policy; a mismatch fails with
    /// [`ErrorCode::DataError`].
    #[must_use]
    pub fn update(&self, replacement: Value) -> Request<()> {
        let key = self.key().clone();
        let outcome = self
            .txn
            .ensure_writable()
            .and_then(|()| self.txn.check_replacement_key(&key, &replacement))
            .map(|()| self.txn.stage_put(key, &replacement));
        Request::settled(outcome)
    }

    /// Steps to the next position.
    ///
    /// The request settles with `None` once every record has been visited.
    #[must_use]
    pub fn advance(self) -> Request<Option<CursorPosition>> {
        let CursorPosition { txn, keys, index, .. } = self;
        Request::settled(Self::at(txn, keys, index + 1))
    }
}
