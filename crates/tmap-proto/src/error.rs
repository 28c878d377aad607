use tmap_codec::CodecError;

/// Errors from decoding map bodies and operation logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    /// The bytes do not follow the framing rules.
    #[error("corrupt data: {0}")]
    Corrupt(#[from] CodecError),

    /// The object body has zero length: never written, or not readable.
    #[error("object body is empty or missing")]
    EmptyOrMissing,

    /// An operation log carries an opcode this protocol does not define.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
}

impl ProtoError {
    /// Returns `true` for framing violations in otherwise present data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_) | Self::UnknownOpcode(_))
    }
}

/// Result alias for protocol operations.
pub type ProtoResult<T> = Result<T, ProtoError>;
