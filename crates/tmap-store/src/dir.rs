use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{window, TmapStore};
use crate::update::rewrite;

/// File extension of object bodies inside the root directory.
const OBJECT_EXT: &str = "obj";

/// Longest object name, in bytes, whose hex file name stays within the
/// common 255-byte file name limit.
pub const MAX_OBJECT_NAME_LEN: usize = (255 - OBJECT_EXT.len() - 1) / 2;

/// Directory-backed tmap store: one file per object.
///
/// Object names are hex-encoded into file names, so any name of at most
/// [`MAX_OBJECT_NAME_LEN`] bytes is safe on disk. Updates write the new body
/// to a temporary file in the same directory and rename it over the old one;
/// readers see either the old or the new body, never a mix.
///
/// Updates are serialized per handle only. Two handles on the same root, in
/// one process or several, can interleave their read-modify-rename cycles
/// and lose each other's updates. Share one handle per root.
pub struct DirTmapStore {
    root: PathBuf,
    update_lock: Mutex<()>,
    closed: AtomicBool,
}

impl DirTmapStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened tmap directory store");
        Ok(Self {
            root,
            update_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// The directory holding object files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Delete an object. Returns `true` if it existed.
    pub fn delete(&self, object: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let _guard = self.update_lock.lock().expect("update lock poisoned");
        match fs::remove_file(self.object_path(object)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Sorted names of all stored objects. Files that do not decode to an
    /// object name are skipped.
    pub fn object_names(&self) -> StoreResult<Vec<String>> {
        self.ensure_open()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != OBJECT_EXT) {
                continue;
            }
            let decoded = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| hex::decode(s).ok())
                .and_then(|raw| String::from_utf8(raw).ok());
            if let Some(name) = decoded {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn object_path(&self, object: &str) -> StoreResult<PathBuf> {
        if object.is_empty() || object.len() > MAX_OBJECT_NAME_LEN {
            return Err(StoreError::InvalidName(object.to_owned()));
        }
        Ok(self.root.join(format!("{}.{OBJECT_EXT}", hex::encode(object))))
    }

    fn read_body(path: &Path) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl TmapStore for DirTmapStore {
    fn read(&self, object: &str, offset: u64, len: Option<usize>) -> StoreResult<Vec<u8>> {
        self.ensure_open()?;
        let body = Self::read_body(&self.object_path(object)?)?
            .ok_or_else(|| StoreError::NotFound(object.to_owned()))?;
        Ok(window(&body, offset, len).to_vec())
    }

    fn apply_update(&self, object: &str, log: &[u8]) -> StoreResult<()> {
        self.ensure_open()?;
        let path = self.object_path(object)?;
        let _guard = self.update_lock.lock().expect("update lock poisoned");

        let current = Self::read_body(&path)?;
        let Some(body) = rewrite(object, current.as_deref(), log)? else {
            return Ok(());
        };

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(object, bytes = body.len(), "object body replaced");
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for DirTmapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirTmapStore")
            .field("root", &self.root)
            .finish()
    }
}
