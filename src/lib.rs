//! Provides encoding (serialization) and decoding (deserialization) in the
//! SimpleSerialize (SSZ) format, driven by type descriptors built at runtime
//! rather than derived at compile time.
//!
//! A [`SszType`] describes the shape of a value; a [`Value`] carries the data.
//! Descriptors are immutable once built and may be shared freely between
//! threads. Serialization validates the value, allocates a single output
//! buffer of the exact final size and fills it in one pass; decoding is the
//! strict inverse and rejects any malformed offset layout.
//!
//! ## Example
//!
//! ```rust
//! use ssz_dynamic::{deserialize, serialize, SszType, Value};
//!
//! let checkpoint = SszType::container(
//!     "Checkpoint",
//!     vec![
//!         ("epoch", SszType::parse("uint64").unwrap()),
//!         ("root", SszType::parse("bytes32").unwrap()),
//!     ],
//! )
//! .unwrap();
//!
//! let value = Value::container([
//!     ("epoch", Value::from(42u64)),
//!     ("root", Value::Bytes(vec![0xaa; 32])),
//! ]);
//!
//! let bytes = serialize(&value, &checkpoint).unwrap();
//! assert_eq!(bytes.len(), 40);
//! assert_eq!(deserialize(&bytes, &checkpoint).unwrap(), value);
//! ```

mod decode;
mod encode;
mod types;
mod validate;
mod value;

pub use decode::{deserialize, DecodeError};
pub use encode::{serialize, serialized_size};
pub use types::{Field, SszType, TypeError};
pub use validate::{validate, ValueError, ValueErrorKind};
pub use value::Value;

/// The number of bytes used to represent an offset.
pub const BYTES_PER_LENGTH_OFFSET: usize = 4;

/// The maximum value that can be represented using `BYTES_PER_LENGTH_OFFSET`.
pub const MAX_LENGTH_VALUE: usize = u32::MAX as usize;

/// Maximum nesting depth a descriptor may have.
///
/// Enforced by the composite constructors, which in turn bounds the
/// recursion of sizing, validation, serialization and decoding.
pub const MAX_TYPE_DEPTH: usize = 64;
