//! # relaydb Testkit
//!
//! Shared fixtures and property-test generators for relaydb.
//!
//! The fixtures mirror the canonical vehicles scenario: a `vehicles`
//! collection keyed by the `id` field, seeded with a boat, a car and a
//! truck. The generators provide proptest strategies for keys, records
//! and collection names.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;
pub mod generators;

pub use fixtures::{record_from_json, vehicle, vehicle_fixture, TestDb, VEHICLES};
