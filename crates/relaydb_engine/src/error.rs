//! Engine failure codes.

use thiserror::Error;

/// Symbolic failure codes the engine delivers through request callbacks.
///
/// The engine never returns results directly; a request either succeeds
/// with its value or fails with one of these codes. The access layer above
/// maps codes onto its own error taxonomy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Insert would overwrite an existing key.
    #[error("key already exists")]
    Constraint,

    /// Requested database version is below the stored version,
    /// or the requested version is not a valid version number.
    #[error("version conflict")]
    VersionMismatch,

    /// The named collection does not exist.
    #[error("collection not found")]
    NotFound,

    /// The operation is blocked by other open connections.
    #[error("blocked by other open connections")]
    Blocked,

    /// The connection has been closed.
    #[error("connection is closed")]
    Closed,

    /// Write attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// Operation on a transaction that already committed or aborted.
    #[error("transaction has finished")]
    TransactionDone,

    /// Operation permitted only inside a version-change transaction.
    #[error("invalid state for this operation")]
    InvalidState,

    /// The key or record is not usable here (no derivable key, key-path
    /// mismatch, unexpected explicit key).
    #[error("invalid key or record")]
    DataError,

    /// A stored payload failed to decode.
    #[error("stored record is corrupted")]
    Corrupted,

    /// The request was dropped without ever settling.
    #[error("request was abandoned")]
    Abandoned,
}
