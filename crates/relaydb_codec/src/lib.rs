//! # relaydb Codec
//!
//! Record values, keys and canonical CBOR encoding for relaydb.
//!
//! Records are dynamic, field-addressed values ([`Value`]); record keys are
//! ordered scalars ([`Key`]). The reference engine stores records as
//! canonical CBOR bytes, so identical records always produce identical
//! bytes:
//!
//! - Map fields are sorted by name (length-first, then bytewise)
//! - Integers use the shortest encoding
//! - No floats, no indefinite-length items
//!
//! ## Usage
//!
//! ```
//! use relaydb_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let record = Value::map(vec![
//!     ("id".into(), Value::Integer(1)),
//!     ("type".into(), Value::text("boat")),
//! ]);
//! let bytes = to_canonical_cbor(&record);
//! assert_eq!(from_cbor(&bytes).unwrap(), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod interop;
mod key;
mod value;

pub use decoder::from_cbor;
pub use encoder::to_canonical_cbor;
pub use error::{CodecError, CodecResult};
pub use interop::{from_value, to_value};
pub use key::Key;
pub use value::Value;
