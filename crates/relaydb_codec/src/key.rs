//! Ordered record keys.

use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;

/// A record key.
///
/// Keys are ordered scalars. The total order ranks by type first
/// (integers, then text, then bytes), and within a type by natural order.
/// This is the order cursors visit records in and the order key ranges
/// are defined over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Integer key (also what auto-increment collections assign).
    Integer(i64),
    /// Text key.
    Text(String),
    /// Binary key.
    Bytes(Vec<u8>),
}

impl Key {
    /// Creates a text key.
    pub fn text(s: impl Into<String>) -> Self {
        Key::Text(s.into())
    }

    /// Extracts a key from a record field value.
    ///
    /// Only scalar values are valid keys; returns `None` for null, bool,
    /// arrays and maps.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Key::Integer(*n)),
            Value::Text(s) => Some(Key::Text(s.clone())),
            Value::Bytes(b) => Some(Key::Bytes(b.clone())),
            _ => None,
        }
    }

    /// Converts this key back into a record value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Key::Integer(n) => Value::Integer(*n),
            Key::Text(s) => Value::Text(s.clone()),
            Key::Bytes(b) => Value::Bytes(b.clone()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Key::Integer(_) => 0,
            Key::Text(_) => 1,
            Key::Bytes(_) => 2,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Integer(a), Key::Integer(b)) => a.cmp(b),
            (Key::Text(a), Key::Text(b)) => a.cmp(b),
            (Key::Bytes(a), Key::Bytes(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(n) => write!(f, "{n}"),
            Key::Text(s) => write!(f, "{s:?}"),
            Key::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Integer(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<Vec<u8>> for Key {
    fn from(b: Vec<u8>) -> Self {
        Key::Bytes(b)
    }
}
