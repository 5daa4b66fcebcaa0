//! All encoding functions write to a `std::io::Write` and return the amount of written bytes. All
//! decoding functions read from a `std::io::Read` and return the value, the one-shot
//! [`Decoder::decode`] also the number of consumed bytes.
//!
//! # A note on sessions
//!
//! AMF3 deduplicates strings and composites through reference tables which live as long as an
//! [`Encoder`] or [`Decoder`] does. Both sides have to agree on where a session starts: values
//! written by one encoder instance must be read by one decoder instance, in the same order.
//! [`Encoder::reset`] and [`Decoder::reset`] start a new session.
//!
//! # A note on integers
//!
//! The wire format only knows 29 bit integers. The encoder writes integers outside of that range
//! as doubles if they fit into 32 bits and as decimal strings otherwise. A decoded
//! `Value::Integer` is always within `u29::MIN_SIGNED..=u29::MAX_SIGNED`.
//!
//! # Unsupported markers
//!
//! Only the dynamic subset of AMF3 is implemented: `undefined` (read as null), `null`, booleans,
//! integers, doubles, strings, dense arrays and anonymous dynamic objects. XML, dates, byte
//! arrays, typed objects and associative array members are rejected.
//!
//! # Examples
//!
//! ```
//! use amf3::*;
//!
//! let mut buf = Vec::new();
//! let value = Value::object(vec![("key", Value::from("value"))]);
//! Encoder::encode(&value, &mut buf).unwrap();
//! assert_eq!(buf, [
//!     0x0a,                               // object
//!     0x0b,                               // anonymous dynamic traits
//!     0x01,                               // empty class name
//!     0x07, b'k', b'e', b'y',             // key of length 3
//!     0x06,                               // string
//!     0x0b, b'v', b'a', b'l', b'u', b'e', // of length 5
//!     0x01,                               // end of keys
//! ]);
//! let decoded = Decoder::decode(&buf[..]).unwrap();
//! assert_eq!(value, decoded.0);
//! assert_eq!(15, decoded.1);
//! ```

mod decoder;
mod encoder;
mod error;
mod marker;
mod refs;
mod value;
#[cfg(feature = "serde")]
mod value_serde;

pub mod u29;

pub use decoder::*;
pub use encoder::*;
pub use error::*;
pub use marker::*;
pub use refs::*;
pub use value::{Array, Object, Value};
