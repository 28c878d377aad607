//! Client side of the tmap protocol.
//!
//! [`TmapClient`] wraps a [`TmapStore`] and offers two ways to read:
//!
//! - strict calls ([`TmapClient::read_map`], [`TmapClient::try_read_value`],
//!   [`TmapClient::try_read_str`]) return a [`TmapError`] that tells an absent
//!   key apart from a missing object, a store failure, and corrupt data;
//! - [`TmapClient::read_key`] returns an empty string for all of those, for
//!   callers written against the older convention.
//!
//! Writes go through [`OperationLog`]s, either built by the caller and sent
//! with [`TmapClient::update`] or through the single-operation helpers.

pub mod client;
pub mod config;
pub mod error;

pub use client::TmapClient;
pub use config::ClientConfig;
pub use error::{TmapError, TmapResult};

// Re-export the types callers need alongside the client.
pub use tmap_proto::{DecodedMap, Operation, OperationLog};
pub use tmap_store::{DirTmapStore, InMemoryTmapStore, TmapStore};
