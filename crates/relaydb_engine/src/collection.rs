//! Collection specifications.

/// How a collection derives keys for its records.
///
/// The policy is fixed when the collection is created during an upgrade
/// step and does not change without a further upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Callers supply a key explicitly on every insert.
    #[default]
    Explicit,
    /// The key is derived from the named record field (the key path).
    /// The field must be present and hold a scalar value.
    Path(String),
    /// The engine assigns ascending integer keys.
    AutoIncrement,
}

/// Specification of a collection, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionSpec {
    /// Key-extraction policy for records in this collection.
    pub key_policy: KeyPolicy,
}

impl CollectionSpec {
    /// A collection keyed explicitly by the caller.
    #[must_use]
    pub fn explicit() -> Self {
        Self {
            key_policy: KeyPolicy::Explicit,
        }
    }

    /// A collection keyed by a record field.
    #[must_use]
    pub fn with_key_path(field: impl Into<String>) -> Self {
        Self {
            key_policy: KeyPolicy::Path(field.into()),
        }
    }

    /// A collection with engine-assigned integer keys.
    #[must_use]
    pub fn auto_increment() -> Self {
        Self {
            key_policy: KeyPolicy::AutoIncrement,
        }
    }

    /// Returns the key path, if this collection has one.
    #[must_use]
    pub fn key_path(&self) -> Option<&str> {
        match &self.key_policy {
            KeyPolicy::Path(field) => Some(field),
            _ => None,
        }
    }
}
