//! # relaydb Core
//!
//! An awaitable access layer over a callback-driven storage engine.
//!
//! The underlying engine reports completion through asynchronous
//! callbacks and exposes bulk iteration only through a stepwise cursor
//! protocol. This crate bridges that interface into ordinary futures:
//!
//! - [`bridge`] converts every discrete engine request into a one-shot
//!   future
//! - [`ConnectionManager`] owns the open/upgrade/delete lifecycle of a
//!   named, versioned database
//! - [`RecordAccessor`] provides single-record CRUD, including
//!   read-modify-write merge updates
//! - [`CursorBulkMutator`] turns a whole cursor pass into one future that
//!   resolves at exhaustion
//!
//! ## Example
//!
//! ```
//! use relaydb_core::{
//!     CollectionSpec, ConnectionManager, MemoryEngine, RecordAccessor, Value,
//! };
//!
//! # async fn example() -> relaydb_core::AccessResult<()> {
//! let mut manager = ConnectionManager::new(MemoryEngine::new());
//! let connection = manager
//!     .open_db("inventory", 1, |conn| {
//!         conn.create_collection("vehicles", CollectionSpec::with_key_path("id"))
//!     })
//!     .await?;
//!
//! let vehicles = RecordAccessor::new(connection);
//! let record = Value::map(vec![
//!     ("id".into(), Value::Integer(1)),
//!     ("type".into(), Value::text("boat")),
//! ]);
//! vehicles.add_one("vehicles", record).await?;
//! assert!(vehicles.get_one("vehicles", 1).await?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Scheduling is single-threaded and cooperative: every operation
//! suspends at the point it hands a request to the engine and resumes on
//! completion. Conflicting read-write transactions are serialized by the
//! engine's own scheduler; this layer deliberately adds no locking of its
//! own. Futures do not support cancellation — once issued, a request runs
//! to completion or failure.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod bridge;
mod bulk;
mod error;
mod manager;

pub use accessor::RecordAccessor;
pub use bridge::bridge;
pub use bulk::CursorBulkMutator;
pub use error::{AccessError, AccessResult};
pub use manager::ConnectionManager;

pub use relaydb_engine::{
    CollectionSpec, Connection, CursorPosition, ErrorCode, Key, KeyPolicy, KeyRange, MemoryEngine,
    Mode, Request, Value,
};
