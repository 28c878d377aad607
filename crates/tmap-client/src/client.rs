use tmap_proto::{
    decode_str_value, encode_str_value, DecodedMap, Operation, OperationLog, ProtoError,
};
use tmap_store::{StoreError, TmapStore};
use tracing::{debug, warn};

use crate::error::{TmapError, TmapResult};

/// High-level access to tmap objects on a store.
///
/// Every read fetches and decodes the whole object; nothing is cached.
/// Failures are returned as they happen and never retried.
pub struct TmapClient<S> {
    store: S,
}

impl<S: TmapStore> TmapClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Writes ----

    /// Submit a whole log as one atomic update.
    pub fn update(&self, object: &str, log: &OperationLog) -> TmapResult<()> {
        self.submit(object, "update", log)
    }

    /// Create (or reset) the map on `object` with `header` and no entries.
    pub fn create(&self, object: &str, header: &[u8]) -> TmapResult<()> {
        self.submit_one(object, Operation::create(header))
    }

    /// Set `key` to the raw `value` bytes.
    pub fn set(&self, object: &str, key: &str, value: &[u8]) -> TmapResult<()> {
        self.submit_one(object, Operation::set(key, value))
    }

    /// Set `key` to a string value, string-encoded inside the value blob.
    pub fn set_str(&self, object: &str, key: &str, value: &str) -> TmapResult<()> {
        self.submit_one(object, Operation::set(key, encode_str_value(value)))
    }

    /// Remove `key`. Succeeds whether or not the key was present.
    pub fn remove(&self, object: &str, key: &str) -> TmapResult<()> {
        self.submit_one(object, Operation::remove(key))
    }

    /// Replace the header, keeping entries.
    pub fn set_header(&self, object: &str, header: &[u8]) -> TmapResult<()> {
        self.submit_one(object, Operation::set_header(header))
    }

    fn submit_one(&self, object: &str, op: Operation) -> TmapResult<()> {
        let name = op.opcode().name();
        let log: OperationLog = std::iter::once(&op).collect();
        self.submit(object, name, &log)
    }

    fn submit(&self, object: &str, op: &'static str, log: &OperationLog) -> TmapResult<()> {
        debug!(
            object,
            op,
            ops = log.len(),
            bytes = log.as_bytes().len(),
            "submitting update"
        );
        self.store
            .apply_update(object, log.as_bytes())
            .map_err(|source| TmapError::Store {
                object: object.to_owned(),
                op,
                source,
            })
    }

    // ---- Strict reads ----

    /// Read and decode the full map on `object`.
    pub fn read_map(&self, object: &str) -> TmapResult<DecodedMap> {
        let body = match self.store.read(object, 0, None) {
            Ok(body) => body,
            Err(StoreError::NotFound(_)) => {
                return Err(TmapError::EmptyOrMissing {
                    object: object.to_owned(),
                })
            }
            Err(source) => {
                return Err(TmapError::Store {
                    object: object.to_owned(),
                    op: "read",
                    source,
                })
            }
        };
        debug!(object, bytes = body.len(), "read object body");
        DecodedMap::decode(&body).map_err(|source| match source {
            ProtoError::EmptyOrMissing => TmapError::EmptyOrMissing {
                object: object.to_owned(),
            },
            source => TmapError::Corrupt {
                object: object.to_owned(),
                source,
            },
        })
    }

    /// Raw value of `key`. `Ok(None)` means the map exists but lacks the key.
    pub fn try_read_value(&self, object: &str, key: &str) -> TmapResult<Option<Vec<u8>>> {
        let map = self.read_map(object)?;
        Ok(map.lookup(key).map(<[u8]>::to_vec))
    }

    /// String value of `key`, decoded from its string-encoded blob.
    pub fn try_read_str(&self, object: &str, key: &str) -> TmapResult<Option<String>> {
        self.try_read_value(object, key)?
            .map(|blob| {
                decode_str_value(&blob).map_err(|source| TmapError::Corrupt {
                    object: object.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    // ---- Sentinel read ----

    /// String value of `key`, or an empty string if the key is absent or the
    /// read fails for any reason.
    ///
    /// An empty result cannot tell "absent" from "failed"; use
    /// [`try_read_str`](Self::try_read_str) where that matters. Failures
    /// are logged at `warn` level.
    pub fn read_key(&self, object: &str, key: &str) -> String {
        match self.try_read_str(object, key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(object, key, error = %e, "tmap read failed; returning empty value");
                String::new()
            }
        }
    }

    /// Close the underlying store.
    pub fn close(self) -> TmapResult<()> {
        self.store.close().map_err(|source| TmapError::Store {
            object: String::new(),
            op: "close",
            source,
        })
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for TmapClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmapClient")
            .field("store", &self.store)
            .finish()
    }
}
