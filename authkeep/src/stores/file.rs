//! A snapshot store backed by a file in a cache directory

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};

use super::SnapshotStore;
use crate::TokenSnapshot;

/// The name of the snapshot file within the cache directory
pub const TOKEN_FILE: &str = "auth-tokens.json";

/// A snapshot store that keeps `auth-tokens.json` in a cache directory
///
/// The directory is created on first write if it does not already exist.
#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Constructs a new file store over `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let dir = cache_dir.into();
        let path = dir.join(TOKEN_FILE);
        Self { dir, path }
    }

    /// The path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(&self) -> io::Result<TokenSnapshot> {
        let data = fs::read_to_string(&self.path).await?;
        let snapshot = serde_json::from_str(&data)?;
        Ok(snapshot)
    }

    async fn write_snapshot(&self, snapshot: &TokenSnapshot) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;

        fs::create_dir_all(&self.dir).await?;

        let mut file_opts = OpenOptions::new();

        file_opts.create(true).truncate(true).write(true);

        #[cfg(unix)]
        file_opts.mode(0o600);

        let mut file = file_opts.open(&self.path).await?;
        let data = serde_json::to_string(snapshot)?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&mut self) -> io::Result<TokenSnapshot> {
        self.read_snapshot().await
    }

    async fn persist(&mut self, snapshot: &TokenSnapshot) -> io::Result<()> {
        tracing::trace!(path = %self.path.display(), "writing token snapshot");
        self.write_snapshot(snapshot).await
    }

    async fn clear(&mut self) -> io::Result<()> {
        tracing::trace!(path = %self.path.display(), "removing token snapshot");
        fs::remove_file(&self.path).await
    }
}
