use crate::error::StoreResult;

/// The object store a tmap lives on.
///
/// All implementations must satisfy these invariants:
/// - `apply_update` applies the whole log or nothing.
/// - Operations in one log apply in order, each seeing the previous ones.
/// - A failed call is reported, never retried internally.
pub trait TmapStore: Send + Sync {
    /// Read up to `len` bytes of `object` starting at `offset`.
    ///
    /// `len: None` reads to the end of the object. Reading past the end
    /// returns an empty buffer. Returns [`StoreError::NotFound`] if the
    /// object does not exist.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn read(&self, object: &str, offset: u64, len: Option<usize>) -> StoreResult<Vec<u8>>;

    /// Apply an encoded operation log to `object` as one atomic update.
    fn apply_update(&self, object: &str, log: &[u8]) -> StoreResult<()>;

    /// Release the handle. Later calls fail with `Closed`.
    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Window of `body` selected by `offset` and `len`, clamped to its bounds.
pub(crate) fn window(body: &[u8], offset: u64, len: Option<usize>) -> &[u8] {
    let start = usize::try_from(offset).map_or(body.len(), |o| o.min(body.len()));
    let end = len.map_or(body.len(), |l| start.saturating_add(l).min(body.len()));
    &body[start..end]
}
