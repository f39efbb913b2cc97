//! Filesystem capability used for path inputs
//!
//! Path inputs are the only thing in the crate that touches the filesystem.
//! The capability is injected through [`crate::ClientConfig`] so hosts
//! without one (sandboxes, WASM) can leave it out, and tests can substitute it.

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

/// Read access to image files
#[async_trait]
pub trait FileSystem: Debug + Send + Sync {
    /// Read the whole file at `path`
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Host filesystem backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
