use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::{window, TmapStore};
use crate::update::rewrite;

/// In-memory, HashMap-based tmap store.
///
/// Intended for tests and embedding. Object bodies are held behind a
/// `RwLock`; an update holds the write lock for its whole
/// read-apply-replace cycle, so logs apply indivisibly.
pub struct InMemoryTmapStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl InMemoryTmapStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Overwrite an object's raw body, bypassing the map protocol.
    pub fn write_raw(&self, object: &str, body: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(object.to_owned(), body);
    }

    /// Delete an object. Returns `true` if it existed.
    pub fn delete(&self, object: &str) -> bool {
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(object)
            .is_some()
    }

    /// Sorted names of all stored objects.
    pub fn object_names(&self) -> Vec<String> {
        let map = self.objects.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Default for InMemoryTmapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TmapStore for InMemoryTmapStore {
    fn read(&self, object: &str, offset: u64, len: Option<usize>) -> StoreResult<Vec<u8>> {
        self.ensure_open()?;
        let map = self.objects.read().expect("lock poisoned");
        let body = map
            .get(object)
            .ok_or_else(|| StoreError::NotFound(object.to_owned()))?;
        Ok(window(body, offset, len).to_vec())
    }

    fn apply_update(&self, object: &str, log: &[u8]) -> StoreResult<()> {
        self.ensure_open()?;
        let mut map = self.objects.write().expect("lock poisoned");
        let current = map.get(object).map(Vec::as_slice);
        if let Some(body) = rewrite(object, current, log)? {
            map.insert(object.to_owned(), body);
        }
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTmapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTmapStore")
            .field("object_count", &self.len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmap_proto::{DecodedMap, OperationLog};

    fn read_map(store: &InMemoryTmapStore, object: &str) -> DecodedMap {
        DecodedMap::decode(&store.read(object, 0, None).unwrap()).unwrap()
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_read_empty_map() {
        let store = InMemoryTmapStore::new();
        store
            .apply_update("foo", OperationLog::with_create(b"").as_bytes())
            .unwrap();
        let body = store.read("foo", 0, None).unwrap();
        assert_eq!(body.len(), 8);
        assert!(read_map(&store, "foo").is_empty());
    }

    #[test]
    fn named_create_bytes_then_set_read_remove() {
        let store = InMemoryTmapStore::new();
        let create: Vec<u8> =
            [&[b'c', 7, 0, 0, 0][..], &b"my_tmap"[..], &[0u8, 0, 0, 0][..]].concat();
        store.apply_update("foo", &create).unwrap();
        assert_eq!(store.read("foo", 0, None).unwrap(), vec![0; 8]);

        let mut log = OperationLog::new();
        log.set("key1", b"val1").set("key2", b"val2");
        store.apply_update("foo", log.as_bytes()).unwrap();
        assert_eq!(read_map(&store, "foo").lookup("key1"), Some(&b"val1"[..]));

        let mut log = OperationLog::new();
        log.remove("key1");
        store.apply_update("foo", log.as_bytes()).unwrap();
        let map = read_map(&store, "foo");
        assert_eq!(map.lookup("key1"), None);
        assert_eq!(map.lookup("key2"), Some(&b"val2"[..]));
    }

    #[test]
    fn updates_accumulate_across_logs() {
        let store = InMemoryTmapStore::new();
        store
            .apply_update("foo", OperationLog::with_create(b"").as_bytes())
            .unwrap();
        let mut log = OperationLog::new();
        log.set("key1", b"val1");
        store.apply_update("foo", log.as_bytes()).unwrap();
        let mut log = OperationLog::new();
        log.set("key2", b"val2");
        store.apply_update("foo", log.as_bytes()).unwrap();

        let map = read_map(&store, "foo");
        assert_eq!(map.lookup("key1"), Some(&b"val1"[..]));
        assert_eq!(map.lookup("key2"), Some(&b"val2"[..]));
    }

    #[test]
    fn create_overwrites_existing_map() {
        let store = InMemoryTmapStore::new();
        let mut log = OperationLog::with_create(b"one");
        log.set("k", b"v");
        store.apply_update("foo", log.as_bytes()).unwrap();
        store
            .apply_update("foo", OperationLog::with_create(b"two").as_bytes())
            .unwrap();

        let map = read_map(&store, "foo");
        assert_eq!(map.header(), b"two");
        assert!(map.is_empty());
    }

    #[test]
    fn remove_absent_key_succeeds_and_changes_nothing() {
        let store = InMemoryTmapStore::new();
        let mut log = OperationLog::with_create(b"");
        log.set("k", b"v");
        store.apply_update("foo", log.as_bytes()).unwrap();
        let before = store.read("foo", 0, None).unwrap();

        let mut log = OperationLog::new();
        log.remove("missing");
        store.apply_update("foo", log.as_bytes()).unwrap();
        assert_eq!(store.read("foo", 0, None).unwrap(), before);
    }

    #[test]
    fn bad_log_leaves_object_untouched() {
        let store = InMemoryTmapStore::new();
        let mut log = OperationLog::with_create(b"");
        log.set("k", b"v");
        store.apply_update("foo", log.as_bytes()).unwrap();
        let before = store.read("foo", 0, None).unwrap();

        // A valid remove followed by a truncated set.
        let mut log = OperationLog::new();
        log.remove("k").set("x", b"y");
        let bytes = log.into_bytes();
        let err = store
            .apply_update("foo", &bytes[..bytes.len() - 1])
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate { .. }));
        assert_eq!(store.read("foo", 0, None).unwrap(), before);
    }

    #[test]
    fn update_on_corrupt_object_fails() {
        let store = InMemoryTmapStore::new();
        store.write_raw("foo", vec![9, 9, 9]);
        let mut log = OperationLog::new();
        log.set("k", b"v");
        let err = store.apply_update("foo", log.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[test]
    fn read_missing_object_is_not_found() {
        let store = InMemoryTmapStore::new();
        let err = store.read("nope", 0, None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref name) if name == "nope"));
    }

    #[test]
    fn read_respects_offset_and_len() {
        let store = InMemoryTmapStore::new();
        store.write_raw("raw", b"abcdef".to_vec());
        assert_eq!(store.read("raw", 2, Some(2)).unwrap(), b"cd");
        assert_eq!(store.read("raw", 10, None).unwrap(), b"");
    }

    // -----------------------------------------------------------------------
    // Lifecycle and utilities
    // -----------------------------------------------------------------------

    #[test]
    fn closed_store_rejects_calls() {
        let store = InMemoryTmapStore::new();
        store.close().unwrap();
        assert!(matches!(store.read("foo", 0, None), Err(StoreError::Closed)));
        assert!(matches!(
            store.apply_update("foo", &[]),
            Err(StoreError::Closed)
        ));
    }

    #[test]
    fn delete_and_names() {
        let store = InMemoryTmapStore::default();
        assert!(store.is_empty());
        store.write_raw("b", vec![]);
        store.write_raw("a", vec![]);
        assert_eq!(store.object_names(), ["a", "b"]);
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_updates_all_land() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryTmapStore::new());
        store
            .apply_update("foo", OperationLog::with_create(b"").as_bytes())
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut log = OperationLog::new();
                    log.set(&format!("key{i}"), format!("val{i}"));
                    store.apply_update("foo", log.as_bytes()).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(read_map(&store, "foo").len(), 8);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryTmapStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryTmapStore"));
        assert!(debug.contains("object_count"));
    }
}
