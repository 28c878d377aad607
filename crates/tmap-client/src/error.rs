use std::path::PathBuf;

use thiserror::Error;
use tmap_proto::ProtoError;
use tmap_store::StoreError;

#[derive(Debug, Error)]
pub enum TmapError {
    /// The object does not exist or its body is empty.
    #[error("object {object} is empty or missing")]
    EmptyOrMissing { object: String },

    /// The object body does not decode as a map, or a value does not decode
    /// as a string.
    #[error("object {object} holds corrupt data: {source}")]
    Corrupt { object: String, source: ProtoError },

    /// The store rejected or failed a call.
    #[error("{op} on {object} failed: {source}")]
    Store {
        object: String,
        op: &'static str,
        source: StoreError,
    },

    #[error("cannot open store at {root}: {source}")]
    Open { root: PathBuf, source: StoreError },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type TmapResult<T> = Result<T, TmapError>;
