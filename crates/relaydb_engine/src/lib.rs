//! # relaydb Engine
//!
//! The callback-driven storage engine contract, plus the reference
//! in-memory engine.
//!
//! The engine's native interface reports completion and failure through
//! asynchronous callbacks, never through awaitable results: every
//! operation hands back a [`Request`] that settles exactly once with a
//! value or an [`ErrorCode`]. Bulk iteration is exposed only through the
//! stepwise [`CursorPosition`] protocol, one step per callback.
//!
//! Databases are named and versioned. Collections are created, renamed
//! and deleted only inside the version-change transaction entered when a
//! database is opened at a higher version than is stored.
//!
//! The awaitable layer over this contract lives in `relaydb_core`; this
//! crate deliberately stays callback-shaped.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod connection;
mod cursor;
mod engine;
mod error;
mod range;
mod request;
mod transaction;

pub use collection::{CollectionSpec, KeyPolicy};
pub use connection::Connection;
pub use cursor::CursorPosition;
pub use engine::MemoryEngine;
pub use error::ErrorCode;
pub use range::KeyRange;
pub use request::{Outcome, Request};
pub use transaction::{Mode, Store, Transaction};

pub use relaydb_codec::{Key, Value};
