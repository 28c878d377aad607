/// Framing violations found while decoding.
///
/// Every variant describes corrupt data. None of them is recoverable by
/// decoding the same bytes again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A fixed-width value or length prefix claims more bytes than remain.
    #[error("truncated data: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Bytes were left over after the declared structure was decoded.
    #[error("{0} trailing bytes after end of structure")]
    TrailingBytes(usize),

    /// A string field does not hold valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A mapping count cannot be satisfied by the bytes that remain.
    #[error("mapping declares {count} entries but only {remaining} bytes remain")]
    CountMismatch { count: u32, remaining: usize },

    /// The same key appears twice in one mapping.
    #[error("duplicate key in mapping: {0:?}")]
    DuplicateKey(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
