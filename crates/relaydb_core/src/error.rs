//! Error types for the access layer.

use relaydb_codec::Key;
use relaydb_engine::ErrorCode;
use thiserror::Error;

/// Result type for access-layer operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors surfaced by the access layer.
///
/// Every operation propagates its error to the caller through its future;
/// nothing is swallowed and nothing retries. Retry policy, if any, belongs
/// to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Opening or upgrading the database failed.
    #[error("failed to open database: {0}")]
    Connection(ErrorCode),

    /// The requested schema version is below the stored version.
    #[error("requested version is below the stored version")]
    Version,

    /// Insert would overwrite an existing key.
    #[error("key already exists")]
    Constraint,

    /// No record exists at the addressed key.
    #[error("no record at key {key}")]
    NotFound {
        /// The key that was addressed.
        key: Key,
    },

    /// The delete is blocked by other open connections.
    #[error("delete blocked by other open connections")]
    Blocked,

    /// No live connection to operate on.
    #[error("not connected")]
    NotConnected,

    /// Any other engine failure, carrying the engine's native code.
    #[error("engine failure: {0}")]
    Engine(ErrorCode),
}

impl From<ErrorCode> for AccessError {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::VersionMismatch => AccessError::Version,
            ErrorCode::Constraint => AccessError::Constraint,
            ErrorCode::Blocked => AccessError::Blocked,
            ErrorCode::Closed => AccessError::NotConnected,
            other => AccessError::Engine(other),
        }
    }
}
