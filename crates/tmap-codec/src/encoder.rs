use bytes::{BufMut, Bytes, BytesMut};

/// Growable output buffer for tmap primitives.
///
/// Methods return `&mut Self` so fields can be chained in wire order:
///
/// ```
/// use tmap_codec::Encoder;
///
/// let mut enc = Encoder::new();
/// enc.put_u8(b's').put_str("key1").put_blob(b"val1");
/// assert_eq!(enc.len(), 1 + 4 + 4 + 4 + 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a single raw byte.
    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    /// Append a little-endian `u32`.
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    /// Append a length-prefixed blob.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than `u32::MAX` bytes, which the framing
    /// cannot represent.
    pub fn put_blob(&mut self, data: &[u8]) -> &mut Self {
        self.put_u32(prefix(data.len()));
        self.buf.put_slice(data);
        self
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.put_blob(value.as_bytes())
    }

    /// Append a mapping: a count followed by `(key, value)` pairs in
    /// iteration order.
    pub fn put_map<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let entries = entries.into_iter();
        self.put_u32(prefix(entries.len()));
        for (key, value) in entries {
            self.put_str(key.as_ref());
            self.put_blob(value.as_ref());
        }
        self
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze into an immutable, cheaply cloneable buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    /// Take the encoded bytes as a `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

fn prefix(len: usize) -> u32 {
    u32::try_from(len).expect("length exceeds u32 framing")
}
