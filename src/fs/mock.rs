// src/fs/mock.rs

use super::{FileReader, FileSystem, FileWriter, IoFuture};
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, Vec<u8>>,
    failing_writes: HashSet<PathBuf>,
}

/// In-memory filesystem. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap();
        state
            .files
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Current contents of `path`, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.files.get(path.as_ref()).cloned()
    }

    /// Make every write to `path` fail after the file has been created.
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing_writes.insert(path.as_ref().to_path_buf());
    }
}

impl FileSystem for MockFileSystem {
    fn open_read<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileReader> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            match state.files.get(path) {
                Some(content) => Ok(Box::new(Cursor::new(content.clone())) as FileReader),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("File not found: {:?}", path),
                )),
            }
        })
    }

    fn create_write<'a>(&'a self, path: &'a Path) -> IoFuture<'a, FileWriter> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.files.insert(path.to_path_buf(), Vec::new());
            let fail = state.failing_writes.contains(path);
            Ok(Box::new(MockWriter {
                state: Arc::clone(&self.state),
                path: path.to_path_buf(),
                fail,
            }) as FileWriter)
        })
    }
}

/// Writes straight through into the shared map.
struct MockWriter {
    state: Arc<Mutex<MockState>>,
    path: PathBuf,
    fail: bool,
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail {
            return Poll::Ready(Err(io::Error::other(format!(
                "injected write failure for {:?}",
                self.path
            ))));
        }
        let mut state = self.state.lock().unwrap();
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn reads_what_was_added() {
        let fs = MockFileSystem::new();
        fs.add_file("in.txt", "abc");

        let mut r = fs.open_read(Path::new("in.txt")).await.unwrap();
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"abc");
    }

    #[tokio::test]
    async fn injected_failure_surfaces_on_write() {
        let fs = MockFileSystem::new();
        fs.fail_writes_to("out.txt");

        let mut w = fs.create_write(Path::new("out.txt")).await.unwrap();
        let err = w.write_all(b"data").await.unwrap_err();
        assert!(err.to_string().contains("injected write failure"));
        assert_eq!(fs.contents("out.txt"), Some(Vec::new()));
    }
}
