//! Conveniently serialize and deserialize your Rust data structures into AMF3.
//!
//! # Mapping
//!
//! Structs, maps and enum variants carrying data are written as anonymous dynamic objects,
//! sequences, tuples and byte slices as dense arrays. Unit variants travel as their name, every
//! other variant as an object with the variant name as its only key. `None`, `()` and unit structs
//! become null. Integers outside of the 29 bit range are promoted to doubles or, if they exceed 32
//! bits, to decimal strings; deserialization reverses this by parsing strings into numbers where
//! the destination asks for one.
//!
//! # Field names
//!
//! By default the first letter of every field name is lowercased on the wire, so a struct with a
//! field `UserId` produces the key `userId`. When deserializing, a key matches a field if it is
//! equal to the field's name or differs only in the case of the first letter. Keys matching no
//! field are an error unless [`UnknownFields::Ignore`] is configured.
//!
//! serde does not tell whether a name comes from `#[serde(rename)]`. Register renamed fields with
//! `with_literal_field(record, name)` on [`EncoderConfig`] and [`DecoderConfig`]: they are written
//! exactly as named and only bind to that exact key.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub enum Species {
//!     LynxLynx,
//!     FelisCatus,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub struct Cat {
//!     name: String,
//!     species: Species,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     version: u32,
//!     cats: Vec<Cat>,
//! }
//!
//! let msg = Message {
//!     version: 1,
//!     cats: vec![
//!         Cat { name: "Jessica".to_string(), species: Species::LynxLynx },
//!         Cat { name: "Wantan".to_string(), species: Species::LynxLynx },
//!     ],
//! };
//!
//! let bytes = amf3_serde::to_bytes(&msg).unwrap();
//! assert_eq!(bytes.len(), 74);
//! assert_eq!(bytes, [
//!   0x0a, 0x0b, 0x01,                                       // Object with dynamic traits and no class name
//!     0x0f,                                                 // String of length 7 - strings[0]
//!       0x76, 0x65, 0x72, 0x73, 0x69, 0x6f, 0x6e,           // 'version'
//!     0x04, 0x01,                                           // Integer 1
//!     0x09,                                                 // String of length 4 - strings[1]
//!       0x63, 0x61, 0x74, 0x73,                             // 'cats'
//!     0x09, 0x05, 0x01,                                     // Array of length 2 without associative members
//!       0x0a, 0x0b, 0x01,                                   // Object - this is the first cat
//!         0x09,                                             // String of length 4 - strings[2]
//!           0x6e, 0x61, 0x6d, 0x65,                         // 'name'
//!         0x06, 0x0f,                                       // String of length 7 - strings[3]
//!           0x4a, 0x65, 0x73, 0x73, 0x69, 0x63, 0x61,       // 'Jessica'
//!         0x0f,                                             // String of length 7 - strings[4]
//!           0x73, 0x70, 0x65, 0x63, 0x69, 0x65, 0x73,       // 'species'
//!         0x06, 0x11,                                       // String of length 8 - strings[5]
//!           0x4c, 0x79, 0x6e, 0x78, 0x4c, 0x79, 0x6e, 0x78, // 'LynxLynx'
//!       0x01,                                               // End of object
//!       0x0a, 0x0b, 0x01,                                   // Object - this is the second cat
//!         0x04,                                             // Reference to strings[2]: 'name'
//!         0x06, 0x0d,                                       // String of length 6 - strings[6]
//!           0x57, 0x61, 0x6e, 0x74, 0x61, 0x6e,             // 'Wantan'
//!         0x08,                                             // Reference to strings[4]: 'species'
//!         0x06, 0x0a,                                       // Reference to strings[5]: 'LynxLynx'
//!       0x01,                                               // End of object
//!   0x01,                                                   // End of object
//! ]);
//!
//! let deserialized = amf3_serde::from_slice(&bytes).unwrap();
//! assert_eq!(msg, deserialized);
//! ```

mod config;
mod de;
mod error;
mod ser;

pub use config::{DecoderConfig, EncoderConfig, FieldCase, LiteralFields, UnknownFields};
pub use de::{from_reader, from_reader_with_config, from_slice, from_value, from_value_with_config};
pub use error::{DeserializationError, Error, Result};
pub use ser::{to_bytes, to_writer, to_writer_with_config, Serializer};
