use indexmap::IndexMap;
use tmap_codec::{Decoder, Encoder, MIN_PAIR_LEN, PREFIX_LEN};

use crate::error::{ProtoError, ProtoResult};
use crate::op::Operation;

/// In-memory view of a map object body: a header plus ordered entries.
///
/// Built fresh from each read; nothing is cached between reads. Entries keep
/// the order they had on the wire. Equality ignores entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedMap {
    header: Vec<u8>,
    entries: IndexMap<String, Vec<u8>>,
}

impl DecodedMap {
    /// An empty map with the given header.
    pub fn new(header: impl Into<Vec<u8>>) -> Self {
        Self {
            header: header.into(),
            entries: IndexMap::new(),
        }
    }

    /// A map holding `entries` in iteration order. A repeated key keeps its
    /// first position and its last value.
    pub fn with_entries<I, K, V>(header: impl Into<Vec<u8>>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            header: header.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decode a full object body.
    ///
    /// Fails with [`ProtoError::EmptyOrMissing`] for a zero-length body and
    /// with [`ProtoError::Corrupt`] for anything that is not exactly one
    /// header followed by one mapping.
    pub fn decode(bytes: &[u8]) -> ProtoResult<Self> {
        if bytes.is_empty() {
            return Err(ProtoError::EmptyOrMissing);
        }
        let mut dec = Decoder::new(bytes);
        let header = dec.get_blob()?.to_vec();
        let entries = dec.get_map()?;
        dec.finish()?;
        Ok(Self { header, entries })
    }

    /// Encode as an object body, entries in their current order.
    pub fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(self.encoded_len());
        enc.put_blob(&self.header).put_map(self.entries.iter());
        enc.into_vec()
    }

    /// Exact size of [`encode`](Self::encode)'s output.
    pub fn encoded_len(&self) -> usize {
        let entries: usize = self
            .entries
            .iter()
            .map(|(k, v)| MIN_PAIR_LEN + k.len() + v.len())
            .sum();
        PREFIX_LEN + self.header.len() + PREFIX_LEN + entries
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Point lookup. `None` means the key is absent.
    pub fn lookup(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries (the header is not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Apply one operation with store semantics.
    pub fn apply(&mut self, op: Operation) {
        match op {
            Operation::Create { header, .. } => {
                self.header = header;
                self.entries.clear();
            }
            Operation::Set { key, value } => {
                self.entries.insert(key, value);
            }
            Operation::Remove { key } => {
                self.entries.shift_remove(&key);
            }
            Operation::SetHeader { header } => {
                self.header = header;
            }
        }
    }

    /// Apply operations in order, each seeing the effect of the previous.
    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = Operation>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Reorder entries by key, the canonical stored order.
    pub fn sort_keys(&mut self) {
        self.entries.sort_keys();
    }

    pub fn into_parts(self) -> (Vec<u8>, IndexMap<String, Vec<u8>>) {
        (self.header, self.entries)
    }
}
