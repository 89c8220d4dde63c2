//! Dynamic record value type.

use std::cmp::Ordering;

/// A dynamic record value.
///
/// This type represents any structured record relaydb supports. Note that
/// floats are intentionally not supported per the canonical CBOR rules.
///
/// Records stored in a collection are usually the [`Value::Map`] variant:
/// field-addressed, with field names sorted canonically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Text string (UTF-8).
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Array of values.
    Array(Vec<Value>),
    /// Field-addressed map. Invariant: field names are unique and sorted
    /// canonically (construct via [`Value::map`] to maintain it).
    Map(Vec<(String, Value)>),
}

/// Canonical ordering for field names: length-first, then bytewise.
///
/// This matches the sort order of the names' canonical CBOR encodings.
pub(crate) fn cmp_field_names(a: &str, b: &str) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.as_bytes().cmp(b.as_bytes()),
        ord => ord,
    }
}

impl Value {
    /// Creates a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Creates a map value with canonically sorted field names.
    ///
    /// When the same field appears more than once, the last entry wins.
    #[must_use]
    pub fn map(pairs: Vec<(String, Value)>) -> Self {
        let mut out: Vec<(String, Value)> = Vec::with_capacity(pairs.len());
        for (name, value) in pairs {
            match out.iter().position(|(n, _)| *n == name) {
                Some(i) => out[i].1 = value,
                None => out.push((name, value)),
            }
        }
        out.sort_by(|a, b| cmp_field_names(&a.0, &b.0));
        Value::Map(out)
    }

    /// Returns the map fields, or `None` for non-map values.
    #[must_use]
    pub fn fields(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Looks up a field by name. Returns `None` for non-map values
    /// and for absent fields.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields()?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Shallow-merges `changes` onto this value.
    ///
    /// Every field present in `changes` overwrites the corresponding field
    /// of this value; all other fields are preserved verbatim. When either
    /// side is not a map, `changes` replaces this value wholesale.
    #[must_use]
    pub fn merge_fields(&self, changes: &Value) -> Value {
        let (Some(base), Some(overlay)) = (self.fields(), changes.fields()) else {
            return changes.clone();
        };

        let mut merged = base.to_vec();
        for (name, value) in overlay {
            match merged.iter().position(|(n, _)| n == name) {
                Some(i) => merged[i].1 = value.clone(),
                None => merged.push((name.clone(), value.clone())),
            }
        }
        merged.sort_by(|a, b| cmp_field_names(&a.0, &b.0));
        Value::Map(merged)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
