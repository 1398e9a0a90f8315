//! Persistent stores for token snapshots

use std::{fmt, io};

use async_trait::async_trait;

use crate::TokenSnapshot;

#[cfg(feature = "file")]
pub mod file;
pub mod in_memory;

#[cfg(feature = "file")]
pub use file::FileSnapshotStore;
pub use in_memory::InMemorySnapshotStore;

/// An asynchronous store for a single token snapshot
///
/// A store holds at most one snapshot. Persisting replaces whatever was stored before.
#[async_trait]
pub trait SnapshotStore: fmt::Debug + Send + Sync {
    /// Loads the stored snapshot
    ///
    /// Returns an error of kind [`io::ErrorKind::NotFound`] if nothing has been stored.
    async fn load(&mut self) -> io::Result<TokenSnapshot>;

    /// Replaces the stored snapshot
    async fn persist(&mut self, snapshot: &TokenSnapshot) -> io::Result<()>;

    /// Removes the stored snapshot
    ///
    /// Returns an error of kind [`io::ErrorKind::NotFound`] if nothing was stored.
    async fn clear(&mut self) -> io::Result<()>;
}
