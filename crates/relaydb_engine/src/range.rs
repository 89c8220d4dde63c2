//! Key ranges.

use relaydb_codec::Key;

/// A contiguous span of keys.
///
/// A range is either a single key or a lower/upper bound pair, each bound
/// independently inclusive or exclusive, with one-sided bounds allowed.
/// Ranges are used uniformly wherever a key is expected for deletion, so
/// one operation covers both single-record and bulk-range deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    lower: Option<Key>,
    upper: Option<Key>,
    lower_open: bool,
    upper_open: bool,
}

impl KeyRange {
    /// A range matching exactly one key.
    #[must_use]
    pub fn only(key: impl Into<Key>) -> Self {
        let key = key.into();
        Self {
            lower: Some(key.clone()),
            upper: Some(key),
            lower_open: false,
            upper_open: false,
        }
    }

    /// All keys at or above `lower` (`open` excludes the bound itself).
    #[must_use]
    pub fn lower_bound(lower: impl Into<Key>, open: bool) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: None,
            lower_open: open,
            upper_open: false,
        }
    }

    /// All keys at or below `upper` (`open` excludes the bound itself).
    #[must_use]
    pub fn upper_bound(upper: impl Into<Key>, open: bool) -> Self {
        Self {
            lower: None,
            upper: Some(upper.into()),
            lower_open: false,
            upper_open: open,
        }
    }

    /// All keys between `lower` and `upper`.
    #[must_use]
    pub fn bound(
        lower: impl Into<Key>,
        upper: impl Into<Key>,
        lower_open: bool,
        upper_open: bool,
    ) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: Some(upper.into()),
            lower_open,
            upper_open,
        }
    }

    /// Whether `key` falls within this range.
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        if let Some(lower) = &self.lower {
            if key < lower || (self.lower_open && key == lower) {
                return false;
            }
        }
        if let Some(upper) = &self.upper {
            if key > upper || (self.upper_open && key == upper) {
                return false;
            }
        }
        true
    }
}

impl From<Key> for KeyRange {
    fn from(key: Key) -> Self {
        KeyRange::only(key)
    }
}

impl From<i64> for KeyRange {
    fn from(key: i64) -> Self {
        KeyRange::only(key)
    }
}

impl From<&str> for KeyRange {
    fn from(key: &str) -> Self {
        KeyRange::only(key)
    }
}

impl From<String> for KeyRange {
    fn from(key: String) -> Self {
        KeyRange::only(key)
    }
}
