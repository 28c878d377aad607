use tmap_proto::{DecodedMap, Operation, OperationLog};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Compute the new body of `object` after applying `log` to `current`.
///
/// Returns `Ok(None)` when the log is empty and nothing should be written.
/// A log that starts with a create does not look at the current body, so a
/// damaged object can always be reset.
pub(crate) fn rewrite(
    object: &str,
    current: Option<&[u8]>,
    log: &[u8],
) -> StoreResult<Option<Vec<u8>>> {
    let ops = OperationLog::parse(log).map_err(|source| StoreError::InvalidUpdate {
        object: object.to_owned(),
        source,
    })?;
    if ops.is_empty() {
        return Ok(None);
    }

    let mut map = match (ops.first(), current) {
        (Some(Operation::Create { .. }), _) | (_, None) => DecodedMap::default(),
        (_, Some(body)) if body.is_empty() => DecodedMap::default(),
        (_, Some(body)) => {
            DecodedMap::decode(body).map_err(|source| StoreError::CorruptObject {
                object: object.to_owned(),
                source,
            })?
        }
    };

    debug!(object, ops = ops.len(), existed = current.is_some(), "applying operation log");
    map.apply_all(ops);
    map.sort_keys();
    Ok(Some(map.encode()))
}
