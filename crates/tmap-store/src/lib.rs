//! Object storage behind tmap objects.
//!
//! The map protocol needs three things from a store, captured by the
//! [`TmapStore`] trait:
//!
//! - `read` the raw bytes of an object,
//! - `apply_update` an encoded operation log to an object atomically,
//! - `close` the handle.
//!
//! # Backends
//!
//! - [`InMemoryTmapStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirTmapStore`] -- one file per object under a root directory
//!
//! Both backends apply a log the same way: decode the current body (a
//! missing object is an empty map), apply every operation in order, sort the
//! entries by key, and replace the body in a single step. If any part of the
//! log is invalid, the stored object is left untouched.

pub mod dir;
pub mod error;
pub mod memory;
pub mod traits;
mod update;

pub use dir::{DirTmapStore, MAX_OBJECT_NAME_LEN};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTmapStore;
pub use traits::TmapStore;
