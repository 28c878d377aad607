use bytes::Buf;
use indexmap::IndexMap;

use crate::error::{CodecError, CodecResult};
use crate::PREFIX_LEN;

/// Smallest possible encoding of one mapping entry: an empty key and an
/// empty value, each just a length prefix.
pub const MIN_PAIR_LEN: usize = 2 * PREFIX_LEN;

/// Positional reader over an encoded buffer.
///
/// Each `get_*` call consumes exactly the bytes of one value and advances the
/// cursor. A failed call reports why and leaves the decoder in an unspecified
/// position; callers are expected to abandon the buffer.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    start_len: usize,
}

impl<'a> Decoder<'a> {
    /// Start decoding at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            start_len: buf.len(),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Offset of the cursor from the start of the buffer.
    pub fn position(&self) -> usize {
        self.start_len - self.buf.len()
    }

    /// Read one raw byte.
    pub fn get_u8(&mut self) -> CodecResult<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a little-endian `u32`.
    pub fn get_u32(&mut self) -> CodecResult<u32> {
        self.need(PREFIX_LEN)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a length-prefixed blob, borrowing from the input.
    pub fn get_blob(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.get_u32()? as usize;
        self.need(len)?;
        let (blob, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(blob)
    }

    /// Read a length-prefixed UTF-8 string, borrowing from the input.
    pub fn get_str(&mut self) -> CodecResult<&'a str> {
        let raw = self.get_blob()?;
        std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Read a mapping, preserving the on-wire order of its entries.
    ///
    /// The count is checked against the remaining bytes before anything is
    /// allocated, and a repeated key is rejected.
    pub fn get_map(&mut self) -> CodecResult<IndexMap<String, Vec<u8>>> {
        let count = self.get_u32()?;
        if count as usize > self.remaining() / MIN_PAIR_LEN {
            return Err(CodecError::CountMismatch {
                count,
                remaining: self.remaining(),
            });
        }
        let mut entries = IndexMap::with_capacity(count as usize);
        for _ in 0..count {
            let key = self.get_str()?;
            let value = self.get_blob()?;
            if entries.insert(key.to_owned(), value.to_vec()).is_some() {
                return Err(CodecError::DuplicateKey(key.to_owned()));
            }
        }
        Ok(entries)
    }

    /// End decoding, failing if any bytes are left over.
    pub fn finish(self) -> CodecResult<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(self.buf.len()))
        }
    }

    fn need(&self, needed: usize) -> CodecResult<()> {
        if self.buf.len() < needed {
            return Err(CodecError::Truncated {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }
}
