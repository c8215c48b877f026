//! Self-describing value trees with CBOR and JSON codecs.
//!
//! A [`Value`] is one of eight variants (null, bool, int, float, string,
//! bytes, array, object). Trees convert to and from:
//! - CBOR, a definite-length subset with 8-byte floats and text map keys
//!   ([`Value::to_cbor`] / [`Value::from_cbor`]);
//! - JSON text ([`Value::to_json`] / [`Value::from_json`]).
//!
//! Decoding never panics on malformed input; every failure is a
//! [`ValueError`] carrying the byte offset where parsing stopped.

pub mod cbor;
pub mod error;
pub mod json;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod value;

pub use cbor::{CborParser, MAX_DEPTH};
pub use error::{Result, ValueError, EINVAL};
pub use json::JsonParser;
pub use value::{Array, Object, Value, ValueKind};
