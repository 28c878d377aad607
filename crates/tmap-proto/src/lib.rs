//! The tmap protocol: ordered key-value maps stored inside a single object.
//!
//! A map object body is a header blob followed by an ordered string-to-blob
//! mapping. Clients never write that body directly. They build an
//! [`OperationLog`] of [`Operation`]s and submit it in one update call; the
//! store applies the operations in order and rewrites the body.
//!
//! # Wire format
//!
//! ```text
//! object body   := header:blob  count:u32  (key:string value:blob){count}
//! operation log := (opcode:u8 fields)*
//!   'c' Create     name:string header:blob
//!   's' Set        key:string value:blob
//!   'r' Remove     key:string
//!   'h' SetHeader  header:blob
//! ```
//!
//! Strings and blobs are `u32` little-endian length-prefixed (see
//! [`tmap_codec`]).

pub mod error;
pub mod log;
pub mod map;
pub mod op;
pub mod value;

pub use error::{ProtoError, ProtoResult};
pub use log::OperationLog;
pub use map::DecodedMap;
pub use op::{opcodes, Opcode, Operation};
pub use value::{decode_str_value, encode_str_value};
