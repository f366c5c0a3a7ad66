// src/fs/mod.rs

//! File read/write stream collaborator.
//!
//! Pipelines never touch `std::fs`/`tokio::fs` directly; file sources and
//! `to_file` destinations go through a [`FileSystem`] held by the
//! [`ExecContext`](crate::exec::ExecContext). Production uses
//! [`RealFileSystem`]; tests can swap in [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

pub mod mock;

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub type IoFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Open `path` for streaming reads. Fails if it does not exist or is
    /// unreadable.
    fn open_read<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileReader>;

    /// Create (or truncate) `path` for streaming writes.
    fn create_write<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileWriter>;
}

/// Implementation that uses `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem {
    base: Option<PathBuf>,
}

impl RealFileSystem {
    /// Resolve relative paths against `base` instead of the process cwd.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileSystem for RealFileSystem {
    fn open_read<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileReader> {
        let path = self.resolve(path);
        Box::pin(async move {
            let file = tokio::fs::File::open(&path).await?;
            Ok(Box::new(file) as FileReader)
        })
    }

    fn create_write<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileWriter> {
        let path = self.resolve(path);
        Box::pin(async move {
            let file = tokio::fs::File::create(&path).await?;
            Ok(Box::new(file) as FileWriter)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn real_fs_round_trips_through_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem::rooted_at(dir.path());

        let mut w = fs.create_write(Path::new("out.txt")).await.unwrap();
        w.write_all(b"hello").await.unwrap();
        w.shutdown().await.unwrap();
        drop(w);

        let mut r = fs.open_read(Path::new("out.txt")).await.unwrap();
        let mut buf = String::new();
        r.read_to_string(&mut buf).await.unwrap();
        assert_eq!(buf, "hello");
        assert!(dir.path().join("out.txt").is_file());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem::rooted_at(dir.path());

        let err = fs.open_read(Path::new("nope.txt")).await.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
