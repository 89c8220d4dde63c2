//! Property-based test generators using proptest.
//!
//! Provides strategies for generating keys, records and collection names
//! that maintain the invariants the engine expects.

use proptest::prelude::*;
use relaydb_codec::{Key, Value};

/// Strategy for generating valid record keys.
pub fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        any::<i64>().prop_map(Key::Integer),
        "[a-z0-9]{1,16}".prop_map(Key::Text),
        proptest::collection::vec(any::<u8>(), 1..16).prop_map(Key::Bytes),
    ]
}

/// Strategy for generating scalar field values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Value::Bytes),
    ]
}

/// Strategy for generating field-addressed records.
pub fn record_strategy() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map("[a-z]{1,8}", scalar_strategy(), 0..6)
        .prop_map(|fields| Value::map(fields.into_iter().collect()))
}

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}")
        .expect("collection name pattern is a valid regex")
}
