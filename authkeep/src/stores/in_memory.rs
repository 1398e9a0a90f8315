//! An in-memory snapshot store

use std::io;

use async_trait::async_trait;

use super::SnapshotStore;
use crate::TokenSnapshot;

/// A snapshot store that lives only as long as the process
#[derive(Default, Debug)]
pub struct InMemorySnapshotStore {
    snapshot: Option<TokenSnapshot>,
}

impl InMemorySnapshotStore {
    /// Constructs a new, empty in-memory store
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    /// Constructs an in-memory store already holding `snapshot`
    pub fn with_snapshot(snapshot: TokenSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

fn not_found() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "no snapshot stored")
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&mut self) -> io::Result<TokenSnapshot> {
        self.snapshot.clone().ok_or_else(not_found)
    }

    async fn persist(&mut self, snapshot: &TokenSnapshot) -> io::Result<()> {
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&mut self) -> io::Result<()> {
        self.snapshot.take().map(drop).ok_or_else(not_found)
    }
}
