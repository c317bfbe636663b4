//! Narrow filesystem capability used to read the PID file.
//!
//! [`OsFileSystem`] reads the real filesystem; [`MemoryFileSystem`] keeps
//! files in memory so collection can be exercised without touching disk.

use async_trait::async_trait;
use dashmap::DashMap;
use std::io;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the whole file at `path` as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

#[async_trait]
impl FileSystem for OsFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: DashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.write(path, contents);
        self
    }

    pub fn write(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: &Path) -> Option<String> {
        self.files.remove(path).map(|(_, contents)| contents)
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )
            })
    }
}
