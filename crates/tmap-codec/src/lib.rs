//! Binary primitives shared by the tmap operation log and object body.
//!
//! Every value on the wire is one of:
//!
//! - a raw `u8` (opcode tags),
//! - a `u32` little-endian integer (length and count prefixes),
//! - a string or blob: `[u32 LE length][length bytes]`,
//! - a mapping: `[u32 LE count]` followed by `count` `(string, blob)` pairs.
//!
//! Encoding goes through [`Encoder`], a growable buffer. Decoding goes
//! through [`Decoder`], a cursor that consumes exactly the bytes of each
//! value it returns. Callers decode fields in the order they were encoded
//! and finish with [`Decoder::finish`], which rejects trailing bytes.

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::{Decoder, MIN_PAIR_LEN};
pub use encoder::Encoder;
pub use error::{CodecError, CodecResult};

/// Width of every length and count prefix, in bytes.
pub const PREFIX_LEN: usize = 4;
