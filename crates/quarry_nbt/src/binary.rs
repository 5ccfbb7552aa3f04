//! Support for decoding Java edition's binary NBT format.
//!
//! # Examples
//!
//! Decode into the dynamic [`Value`](crate::Value) tree:
//!
//! ```
//! use quarry_nbt::binary::from_binary;
//! use quarry_nbt::compound;
//!
//! let some_bytes = [10, 0, 0, 3, 0, 3, 105, 110, 116, 0, 0, 222, 173, 0];
//!
//! let expected_value = compound! {
//!     "int" => 0xdead
//! };
//!
//! let (nbt, root_name) = from_binary(&mut some_bytes.as_slice()).unwrap();
//!
//! assert_eq!(nbt, expected_value);
//! assert_eq!(root_name, "");
//! ```
//!
//! Decode into a struct, binding compound children by wire name:
//!
//! ```
//! use quarry_nbt::binary::from_reader;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Pos {
//!     #[serde(rename = "xPos")]
//!     x: i32,
//! }
//!
//! let some_bytes = [10, 0, 0, 3, 0, 4, 120, 80, 111, 115, 0, 0, 0, 7, 0];
//!
//! let pos: Pos = from_reader(&mut some_bytes.as_slice()).unwrap();
//!
//! assert_eq!(pos.x, 7);
//! ```

mod de;
mod decode;
mod error;

pub use de::{from_reader, Deserializer};
pub use decode::{from_binary, from_binary_with_limits, DecodeLimits};
pub use error::{Error, ErrorKind};

/// Nesting depth of lists and compounds the decoders accept by default.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 512;
