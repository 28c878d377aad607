use tmap_codec::{Decoder, Encoder};

use crate::error::ProtoResult;
use crate::op::Operation;

/// An ordered batch of operations, encoded as they are appended.
///
/// The log is submitted to the store as one unit. Operations are never
/// reordered or merged: `set("k", ..)` followed by `remove("k")` leaves `k`
/// absent. Sizes are not validated here; the store is the authority on what
/// it accepts.
///
/// ```
/// use tmap_proto::OperationLog;
///
/// let mut log = OperationLog::with_create(b"");
/// log.set("key1", b"val1").remove("stale");
/// assert_eq!(log.len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OperationLog {
    enc: Encoder,
    ops: usize,
}

impl OperationLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose first operation creates the map with `header`.
    pub fn with_create(header: impl AsRef<[u8]>) -> Self {
        let mut log = Self::new();
        log.create(header);
        log
    }

    /// Append any operation.
    pub fn push(&mut self, op: &Operation) -> &mut Self {
        op.encode_into(&mut self.enc);
        self.ops += 1;
        self
    }

    /// Append a create: reset the map to `header` and no entries.
    pub fn create(&mut self, header: impl AsRef<[u8]>) -> &mut Self {
        self.push(&Operation::create(header.as_ref()))
    }

    /// Append a create that also carries a map name on the wire.
    pub fn create_named(&mut self, name: &str, header: impl AsRef<[u8]>) -> &mut Self {
        self.push(&Operation::create_named(name, header.as_ref()))
    }

    /// Append a set of `key` to `value`.
    pub fn set(&mut self, key: &str, value: impl AsRef<[u8]>) -> &mut Self {
        self.push(&Operation::set(key, value.as_ref()))
    }

    /// Append a removal of `key`.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.push(&Operation::remove(key))
    }

    /// Append a header replacement.
    pub fn set_header(&mut self, header: impl AsRef<[u8]>) -> &mut Self {
        self.push(&Operation::set_header(header.as_ref()))
    }

    /// Number of operations appended.
    pub fn len(&self) -> usize {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }

    /// The encoded log.
    pub fn as_bytes(&self) -> &[u8] {
        self.enc.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.enc.into_vec()
    }

    /// Decode an encoded log back into its operations, in order.
    ///
    /// An empty buffer is a valid, empty log.
    pub fn parse(bytes: &[u8]) -> ProtoResult<Vec<Operation>> {
        let mut dec = Decoder::new(bytes);
        let mut ops = Vec::new();
        while !dec.is_empty() {
            ops.push(Operation::decode_from(&mut dec)?);
        }
        dec.finish()?;
        Ok(ops)
    }
}

impl<'a> FromIterator<&'a Operation> for OperationLog {
    fn from_iter<I: IntoIterator<Item = &'a Operation>>(iter: I) -> Self {
        let mut log = Self::new();
        for op in iter {
            log.push(op);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtoError;
    use tmap_codec::CodecError;

    #[test]
    fn create_log_matches_wire_layout() {
        let log = OperationLog::with_create(b"");
        assert_eq!(log.as_bytes(), &[b'c', 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn appended_ops_keep_caller_order() {
        let mut log = OperationLog::new();
        log.set("k", b"v1").set("k", b"v2").remove("k");
        let ops = OperationLog::parse(log.as_bytes()).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::set("k", b"v1".to_vec()),
                Operation::set("k", b"v2".to_vec()),
                Operation::remove("k"),
            ]
        );
    }

    #[test]
    fn parse_every_variant() {
        let expected = vec![
            Operation::create_named("my_tmap", b"hdr".to_vec()),
            Operation::set("key1", b"val1".to_vec()),
            Operation::set_header(b"new".to_vec()),
            Operation::remove("key1"),
        ];
        let log: OperationLog = expected.iter().collect();
        assert_eq!(log.len(), 4);
        assert_eq!(OperationLog::parse(&log.into_bytes()).unwrap(), expected);
    }

    #[test]
    fn empty_log_parses_to_nothing() {
        let log = OperationLog::new();
        assert!(log.is_empty());
        assert!(OperationLog::parse(log.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn truncated_field_is_corrupt() {
        let mut log = OperationLog::new();
        log.set("key", b"value");
        let bytes = log.into_bytes();
        let err = OperationLog::parse(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::Corrupt(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn unknown_opcode_in_the_middle_rejects_the_log() {
        let mut log = OperationLog::new();
        log.set("a", b"1");
        let mut bytes = log.into_bytes();
        bytes.push(b'R');
        bytes.extend_from_slice(&[1, 0, 0, 0, b'a']);
        assert_eq!(
            OperationLog::parse(&bytes).unwrap_err(),
            ProtoError::UnknownOpcode(b'R')
        );
    }
}
