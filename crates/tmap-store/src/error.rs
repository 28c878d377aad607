use tmap_proto::ProtoError;

/// Errors from tmap store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The submitted operation log could not be decoded.
    #[error("update rejected for {object}: {source}")]
    InvalidUpdate { object: String, source: ProtoError },

    /// The stored body is not a valid map, so the log cannot be applied.
    #[error("object {object} does not hold a valid map: {source}")]
    CorruptObject { object: String, source: ProtoError },

    /// The object name cannot be stored by this backend.
    #[error("invalid object name: {0:?}")]
    InvalidName(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store handle was closed.
    #[error("store is closed")]
    Closed,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
