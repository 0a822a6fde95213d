//! Board source backed by saved HTML files.
//!
//! Serves `{dir}/{stop id}.html` as if it were the live page. Useful for
//! development without hitting the operator's site. Files are streamed in
//! small chunks so the extractor sees the same fragmented input a network
//! body would give it.

use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};

use crate::domain::StopId;

use super::error::BoardError;
use super::source::{BoardSource, BoardStream};

/// Default chunk size in bytes.
const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Board source that reads saved pages from a directory.
#[derive(Debug, Clone)]
pub struct FixtureBoardSource {
    dir: PathBuf,
    chunk_size: usize,
}

impl FixtureBoardSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the size of streamed chunks. Zero is treated as one.
    pub fn with_chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    async fn load(&self, stop: &StopId) -> Result<BoardStream, BoardError> {
        // Stop ids name a file directly inside `dir`, nothing else.
        let id = stop.as_str();
        if id.starts_with('.') || id.contains(['/', '\\']) {
            return Err(BoardError::StopNotFound(stop.clone()));
        }

        let path = self.dir.join(format!("{id}.html"));
        let html = match tokio::fs::read(&path).await {
            Ok(html) => Bytes::from(html),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BoardError::StopNotFound(stop.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let chunks: Vec<Result<Bytes, BoardError>> = (0..html.len())
            .step_by(self.chunk_size)
            .map(|start| Ok(html.slice(start..(start + self.chunk_size).min(html.len()))))
            .collect();

        Ok(stream::iter(chunks).boxed())
    }
}

impl BoardSource for FixtureBoardSource {
    fn open<'a>(&'a self, stop: &'a StopId) -> BoxFuture<'a, Result<BoardStream, BoardError>> {
        self.load(stop).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::tempdir;

    fn stop(id: &str) -> StopId {
        StopId::parse(id).unwrap()
    }

    async fn read_all(source: &FixtureBoardSource, id: &str) -> Result<Vec<Bytes>, BoardError> {
        source.open(&stop(id)).await?.try_collect().await
    }

    #[tokio::test]
    async fn streams_file_in_chunks() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("123.html"), "<h1>0123456789</h1>").unwrap();

        let source = FixtureBoardSource::new(dir.path()).with_chunk_size(8);
        let chunks = read_all(&source, "123").await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 8));
        assert_eq!(chunks.concat(), b"<h1>0123456789</h1>");
    }

    #[tokio::test]
    async fn empty_file_is_empty_stream() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("empty.html"), "").unwrap();

        let source = FixtureBoardSource::new(dir.path());
        assert!(read_all(&source, "empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_stop_not_found() {
        let dir = tempdir().unwrap();
        let source = FixtureBoardSource::new(dir.path());

        let err = read_all(&source, "999").await.unwrap_err();
        assert!(matches!(err, BoardError::StopNotFound(s) if s.as_str() == "999"));
    }

    #[tokio::test]
    async fn path_like_ids_are_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("secret.html"), "x").unwrap();
        let nested = dir.path().join("boards");
        std::fs::create_dir(&nested).unwrap();

        let source = FixtureBoardSource::new(&nested);
        for id in ["../secret", "..", "a\\b"] {
            let err = read_all(&source, id).await.unwrap_err();
            assert!(matches!(err, BoardError::StopNotFound(_)), "id {id:?}");
        }
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let source = FixtureBoardSource::new(".").with_chunk_size(0);
        assert_eq!(source.chunk_size, 1);
    }
}
